// Feedback service
// Performance reviews written by managers about people below them.

use super::RequestContext;
use crate::access;
use crate::db::{DbFeedback, FeedbackInput, StaffDb};
use crate::error::StaffError;

/// Record feedback. The subject must sit below the requester; the check
/// runs before anything is written.
pub fn give_feedback(
    db: &StaffDb,
    requester_id: i64,
    input: &FeedbackInput,
) -> Result<DbFeedback, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    ctx.require_manager()?;
    RequestContext::require(access::can_give_feedback(
        &ctx.tree,
        &ctx.requester,
        input.employee_id,
    ))?;
    let feedback = db.insert_feedback(requester_id, input)?;
    log::info!(
        "Feedback {} recorded for employee {} by {}",
        feedback.id,
        feedback.employee_id,
        requester_id
    );
    Ok(feedback)
}

/// Rewrite feedback the requester owns. Re-targeting to another employee
/// goes through the same subordinate check as a new record.
pub fn edit_feedback(
    db: &StaffDb,
    requester_id: i64,
    feedback_id: i64,
    input: &FeedbackInput,
) -> Result<DbFeedback, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    let existing = db.find_feedback(feedback_id)?;
    RequestContext::require(access::can_edit_feedback(&ctx.requester, &existing))?;
    if input.employee_id != existing.employee_id {
        RequestContext::require(access::can_give_feedback(
            &ctx.tree,
            &ctx.requester,
            input.employee_id,
        ))?;
    }
    Ok(db.update_feedback(feedback_id, input)?)
}

/// Everything the requester has written, newest first.
pub fn list_feedback(db: &StaffDb, requester_id: i64) -> Result<Vec<DbFeedback>, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    ctx.require_manager()?;
    Ok(db.list_feedback_by_manager(requester_id, None)?)
}

pub fn recent_feedback(
    db: &StaffDb,
    requester_id: i64,
    limit: usize,
) -> Result<Vec<DbFeedback>, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    ctx.require_manager()?;
    Ok(db.list_feedback_by_manager(requester_id, Some(limit))?)
}

/// Feedback an employee has received, newest first. Visible to the
/// employee and to anyone above them.
pub fn feedback_history(
    db: &StaffDb,
    requester_id: i64,
    employee_id: i64,
) -> Result<Vec<DbFeedback>, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    db.find_employee(employee_id)?;
    RequestContext::require(access::can_view(&ctx.tree, &ctx.requester, employee_id))?;
    Ok(db.list_feedback_for_employee(employee_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;
    use crate::db::{FeedbackPeriod, FeedbackType};
    use crate::services::test_org::org;

    fn review(employee_id: i64) -> FeedbackInput {
        FeedbackInput {
            employee_id,
            period: FeedbackPeriod::Quarter {
                year: 2025,
                quarter: 1,
            },
            performance_rating: Some(5),
            goals_achieved: None,
            areas_of_improvement: None,
            strengths: Some("Ownership".into()),
            comments: None,
        }
    }

    #[test]
    fn test_transitive_subordinate_can_receive_feedback() {
        let db = test_db();
        let o = org(&db);
        let fb = give_feedback(&db, o.root.id, &review(o.leaf.id)).unwrap();
        assert_eq!(fb.manager_id, o.root.id);
        assert_eq!(fb.feedback_type, FeedbackType::Quarterly);
    }

    #[test]
    fn test_non_subordinate_rejected_before_insert() {
        let db = test_db();
        let o = org(&db);
        for (requester, target) in [
            (o.other.id, o.leaf.id),
            (o.mid.id, o.mid.id),
            (o.mid.id, o.root.id),
            (o.leaf.id, o.leaf.id),
        ] {
            assert!(matches!(
                give_feedback(&db, requester, &review(target)),
                Err(StaffError::AccessDenied(_))
            ));
        }
        assert!(list_feedback(&db, o.other.id).unwrap().is_empty());
        assert!(list_feedback(&db, o.mid.id).unwrap().is_empty());
    }

    #[test]
    fn test_only_owner_edits() {
        let db = test_db();
        let o = org(&db);
        let fb = give_feedback(&db, o.mid.id, &review(o.leaf.id)).unwrap();

        let mut changed = review(o.leaf.id);
        changed.period = FeedbackPeriod::Month {
            year: 2025,
            month: 2,
        };
        assert!(matches!(
            edit_feedback(&db, o.root.id, fb.id, &changed),
            Err(StaffError::AccessDenied(_))
        ));
        let edited = edit_feedback(&db, o.mid.id, fb.id, &changed).unwrap();
        assert_eq!(edited.period_quarter, None);
        assert_eq!(edited.period_month, Some(2));

        assert!(matches!(
            edit_feedback(&db, o.mid.id, 9999, &changed),
            Err(StaffError::NotFound(_))
        ));
        assert!(matches!(
            edit_feedback(&db, o.mid.id, fb.id, &review(o.root.id)),
            Err(StaffError::AccessDenied(_))
        ));
    }

    #[test]
    fn test_list_and_recent() {
        let db = test_db();
        let o = org(&db);
        for _ in 0..7 {
            give_feedback(&db, o.root.id, &review(o.mid.id)).unwrap();
        }
        assert_eq!(list_feedback(&db, o.root.id).unwrap().len(), 7);
        assert_eq!(recent_feedback(&db, o.root.id, 5).unwrap().len(), 5);
        assert!(matches!(
            list_feedback(&db, o.leaf.id),
            Err(StaffError::AccessDenied(_))
        ));
        assert!(matches!(
            recent_feedback(&db, o.leaf.id, 5),
            Err(StaffError::AccessDenied(_))
        ));
        assert!(matches!(
            recent_feedback(&db, 9999, 5),
            Err(StaffError::AccessDenied(_))
        ));
    }

    #[test]
    fn test_history_follows_view_rules() {
        let db = test_db();
        let o = org(&db);
        give_feedback(&db, o.mid.id, &review(o.leaf.id)).unwrap();
        give_feedback(&db, o.root.id, &review(o.leaf.id)).unwrap();
        give_feedback(&db, o.root.id, &review(o.mid.id)).unwrap();

        let own = feedback_history(&db, o.leaf.id, o.leaf.id).unwrap();
        assert_eq!(own.len(), 2);
        assert!(own.iter().all(|f| f.employee_id == o.leaf.id));
        assert_eq!(feedback_history(&db, o.root.id, o.leaf.id).unwrap().len(), 2);
        assert_eq!(feedback_history(&db, o.root.id, o.mid.id).unwrap().len(), 1);

        for (requester, target) in [(o.other.id, o.leaf.id), (o.leaf.id, o.mid.id)] {
            assert!(matches!(
                feedback_history(&db, requester, target),
                Err(StaffError::AccessDenied(_))
            ));
        }
        assert!(matches!(
            feedback_history(&db, o.root.id, 9999),
            Err(StaffError::NotFound(_))
        ));
    }
}
