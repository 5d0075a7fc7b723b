// Employees service
// Directory operations gated by the hierarchy access policy.

use super::RequestContext;
use crate::access;
use crate::db::{DbEmployee, EmployeePatch, NewEmployee, StaffDb};
use crate::error::StaffError;
use crate::hierarchy::HierarchyNode;

/// Everyone below the requester, depth-first in name order. Managers only.
pub fn list_employees(db: &StaffDb, requester_id: i64) -> Result<Vec<DbEmployee>, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    ctx.require_manager()?;
    Ok(ctx
        .tree
        .subordinates_of(requester_id)
        .into_iter()
        .cloned()
        .collect())
}

/// Direct reports of the requester, for pickers such as the feedback form.
pub fn direct_reports(db: &StaffDb, requester_id: i64) -> Result<Vec<DbEmployee>, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    Ok(ctx
        .tree
        .direct_reports(requester_id)
        .into_iter()
        .cloned()
        .collect())
}

pub fn get_employee(
    db: &StaffDb,
    requester_id: i64,
    target_id: i64,
) -> Result<DbEmployee, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    let target = db.find_employee(target_id)?;
    RequestContext::require(access::can_view(&ctx.tree, &ctx.requester, target_id))?;
    Ok(target)
}

/// A manager may place a new employee under themselves or anyone below them.
fn check_placement(ctx: &RequestContext, manager_id: i64) -> Result<(), StaffError> {
    RequestContext::require(
        manager_id == ctx.requester.id
            || access::can_manage(&ctx.tree, &ctx.requester, manager_id),
    )
}

/// System ID and email identify one employee each; `owner` is the employee
/// allowed to already hold them.
fn check_unique(
    db: &StaffDb,
    system_id: Option<&str>,
    email: Option<&str>,
    owner: Option<i64>,
) -> Result<(), StaffError> {
    for (label, existing) in [
        ("System ID", match system_id {
            Some(id) => db.find_by_system_id(id)?,
            None => None,
        }),
        ("email", match email {
            Some(email) => db.find_by_email(email)?,
            None => None,
        }),
    ] {
        if existing.is_some_and(|e| Some(e.id) != owner) {
            return Err(StaffError::Validation(format!(
                "An employee with this {label} already exists"
            )));
        }
    }
    Ok(())
}

/// Add an employee by hand. Without an explicit manager the new employee
/// reports to the requester.
pub fn create_employee(
    db: &StaffDb,
    requester_id: i64,
    new: &NewEmployee,
    password_hash: &str,
) -> Result<DbEmployee, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    ctx.require_manager()?;

    let mut new = new.clone();
    let manager_id = *new.manager_id.get_or_insert(requester_id);
    check_placement(&ctx, manager_id)?;

    check_unique(db, new.system_id.as_deref(), new.emailid.as_deref(), None)?;

    let created = db.create_employee(&new, password_hash)?;
    log::info!("Employee {} created by {}", created.id, requester_id);
    Ok(created)
}

/// Edit an employee. Self-service edits cannot change reporting line or
/// the manager flag; those need someone above the target.
pub fn update_employee(
    db: &StaffDb,
    requester_id: i64,
    target_id: i64,
    patch: &EmployeePatch,
) -> Result<DbEmployee, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    db.find_employee(target_id)?;
    RequestContext::require(access::can_edit(&ctx.tree, &ctx.requester, target_id))?;

    let manages = access::can_manage(&ctx.tree, &ctx.requester, target_id);
    if patch.manager_id.is_some() || patch.is_manager.is_some() {
        RequestContext::require(manages)?;
    }
    if let Some(Some(new_manager)) = patch.manager_id {
        check_placement(&ctx, new_manager)?;
    }
    check_unique(
        db,
        patch.system_id.as_deref(),
        patch.emailid.as_deref(),
        Some(target_id),
    )?;
    Ok(db.update_employee(target_id, patch)?)
}

pub fn delete_employee(db: &StaffDb, requester_id: i64, target_id: i64) -> Result<(), StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    db.find_employee(target_id)?;
    RequestContext::require(access::can_delete(&ctx.tree, &ctx.requester, target_id))?;
    db.delete_employee(target_id)?;
    Ok(())
}

/// Org chart as the requester is allowed to see it.
pub fn hierarchy(db: &StaffDb, requester_id: i64) -> Result<Vec<HierarchyNode>, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    Ok(ctx.tree.hierarchy_view(requester_id))
}
