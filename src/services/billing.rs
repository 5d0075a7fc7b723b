// Billing service
// Billing records, visible across the requester's scope.

use super::RequestContext;
use crate::access;
use crate::db::{DbBillingDetail, NewBillingDetail, StaffDb};
use crate::error::StaffError;

/// Add a billing record for the requester or someone below them.
pub fn add_billing_record(
    db: &StaffDb,
    requester_id: i64,
    new: &NewBillingDetail,
) -> Result<DbBillingDetail, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    ctx.require_manager()?;
    RequestContext::require(
        new.employee_id == requester_id
            || access::can_manage(&ctx.tree, &ctx.requester, new.employee_id),
    )?;
    Ok(db.insert_billing_detail(new)?)
}

/// Billing across the requester's scope, latest period first.
pub fn billing_for(db: &StaffDb, requester_id: i64) -> Result<Vec<DbBillingDetail>, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    ctx.require_manager()?;
    Ok(db.list_billing_for_employees(&ctx.scope_ids())?)
}
