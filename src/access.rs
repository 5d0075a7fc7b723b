//! Access decisions over the reporting hierarchy.
//!
//! Every check is a pure function of the requester, the target and an
//! [`OrgTree`] snapshot. Checks never fail: they answer yes or no, and the
//! service layer turns a no into [`StaffError::AccessDenied`] without saying
//! which rule refused.
//!
//! `can_manage` recomputes the subordinate closure on each call (O(n)). The
//! tree is rebuilt per request, so there is nothing to cache.
//!
//! [`StaffError::AccessDenied`]: crate::error::StaffError::AccessDenied

use crate::db::{DbEmployee, DbFeedback};
use crate::hierarchy::OrgTree;

/// Requester is a manager and `target_id` sits somewhere below them.
pub fn can_manage(tree: &OrgTree, requester: &DbEmployee, target_id: i64) -> bool {
    requester.is_manager && tree.is_subordinate(requester.id, target_id)
}

/// Employees may view themselves; managers may view their subordinates.
pub fn can_view(tree: &OrgTree, requester: &DbEmployee, target_id: i64) -> bool {
    requester.id == target_id || can_manage(tree, requester, target_id)
}

pub fn can_edit(tree: &OrgTree, requester: &DbEmployee, target_id: i64) -> bool {
    requester.id == target_id || can_manage(tree, requester, target_id)
}

/// Subordinates may be deleted by anyone above them, and direct reports by
/// their manager even when the manager flag was never set.
pub fn can_delete(tree: &OrgTree, requester: &DbEmployee, target_id: i64) -> bool {
    if requester.id == target_id {
        return false;
    }
    can_manage(tree, requester, target_id)
        || tree
            .get(target_id)
            .is_some_and(|t| t.manager_id == Some(requester.id))
}

pub fn can_give_feedback(tree: &OrgTree, requester: &DbEmployee, target_id: i64) -> bool {
    can_manage(tree, requester, target_id)
}

pub fn can_edit_feedback(requester: &DbEmployee, feedback: &DbFeedback) -> bool {
    feedback.manager_id == requester.id
}

/// Gate for roster-wide operations: listing, import, template, billing.
pub fn is_manager_only(requester: &DbEmployee) -> bool {
    requester.is_manager
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::FeedbackType;
    use crate::hierarchy::fixtures::emp;

    // 1 Root (mgr) ─┬─ 2 Mid (mgr) ── 3 Leaf
    //               └─ 4 Flagless (not flagged) ── 5 Under
    // 6 Other (mgr, separate root)
    fn org() -> OrgTree {
        OrgTree::from_employees(vec![
            emp(1, "Root", None, true),
            emp(2, "Mid", Some(1), true),
            emp(3, "Leaf", Some(2), false),
            emp(4, "Flagless", Some(1), false),
            emp(5, "Under", Some(4), false),
            emp(6, "Other", None, true),
        ])
    }

    fn who(tree: &OrgTree, id: i64) -> DbEmployee {
        tree.get(id).cloned().unwrap()
    }

    #[test]
    fn test_can_manage_matches_subordinate_closure() {
        let tree = org();
        for m in 1..=6 {
            let requester = who(&tree, m);
            let subs = tree.subordinate_ids(m);
            for t in 1..=6 {
                let expected = requester.is_manager && subs.contains(&t);
                assert_eq!(can_manage(&tree, &requester, t), expected, "{m} -> {t}");
            }
            assert!(!can_manage(&tree, &requester, m), "never manages self");
        }
    }

    #[test]
    fn test_view_and_edit_are_self_or_managed() {
        let tree = org();
        let root = who(&tree, 1);
        let leaf = who(&tree, 3);
        let other = who(&tree, 6);

        assert!(can_view(&tree, &root, 3));
        assert!(can_view(&tree, &leaf, 3));
        assert!(!can_view(&tree, &leaf, 2));
        // Being a manager elsewhere grants nothing.
        assert!(!can_view(&tree, &other, 3));
        assert!(can_edit(&tree, &root, 5));
        assert!(!can_edit(&tree, &other, 5));
    }

    #[test]
    fn test_unflagged_manager_can_delete_direct_report_only() {
        let tree = org();
        let flagless = who(&tree, 4);
        assert!(!can_manage(&tree, &flagless, 5));
        assert!(can_delete(&tree, &flagless, 5));
        assert!(!can_delete(&tree, &flagless, 3));
        assert!(!can_delete(&tree, &flagless, 4));

        let root = who(&tree, 1);
        assert!(can_delete(&tree, &root, 3));
    }

    #[test]
    fn test_feedback_rules() {
        let tree = org();
        let mid = who(&tree, 2);
        let root = who(&tree, 1);
        assert!(can_give_feedback(&tree, &mid, 3));
        assert!(!can_give_feedback(&tree, &mid, 5));

        let fb = DbFeedback {
            id: 1,
            employee_id: 3,
            manager_id: 2,
            feedback_type: FeedbackType::Monthly,
            period_year: 2025,
            period_month: Some(1),
            period_quarter: None,
            performance_rating: Some(3),
            goals_achieved: None,
            areas_of_improvement: None,
            strengths: None,
            comments: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert!(can_edit_feedback(&mid, &fb));
        assert!(!can_edit_feedback(&root, &fb));
    }

    #[test]
    fn test_manager_only_gate() {
        let tree = org();
        assert!(is_manager_only(&who(&tree, 6)));
        assert!(!is_manager_only(&who(&tree, 5)));
    }
}
