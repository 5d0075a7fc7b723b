// Dashboard service
// Headcount charts over the requester's scope plus their latest reviews.

use serde::Serialize;

use super::RequestContext;
use crate::analytics::{dashboard_analytics, DashboardAnalytics};
use crate::db::{DbFeedback, StaffDb};
use crate::error::StaffError;

const RECENT_FEEDBACK_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub analytics: DashboardAnalytics,
    pub recent_feedback: Vec<DbFeedback>,
}

pub fn analytics(db: &StaffDb, requester_id: i64) -> Result<DashboardAnalytics, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    Ok(dashboard_analytics(ctx.tree.scope_for(requester_id)))
}

/// Analytics for everyone; recent feedback only for managers.
pub fn dashboard(db: &StaffDb, requester_id: i64) -> Result<Dashboard, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    let analytics = dashboard_analytics(ctx.tree.scope_for(requester_id));
    let recent_feedback = if ctx.requester.is_manager {
        db.list_feedback_by_manager(requester_id, Some(RECENT_FEEDBACK_LIMIT))?
    } else {
        Vec::new()
    };
    Ok(Dashboard {
        analytics,
        recent_feedback,
    })
}
