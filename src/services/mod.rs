//! Boundary operations.
//!
//! Each service loads the requester and a fresh [`OrgTree`] snapshot, asks
//! the access policy, and only then touches the store. A refused check
//! becomes [`StaffError::AccessDenied`] with a generic message.

pub mod billing;
pub mod dashboard;
pub mod employees;
pub mod feedback;
pub mod roster;

use crate::db::{DbEmployee, StaffDb};
use crate::error::StaffError;
use crate::hierarchy::OrgTree;

/// The requester plus the hierarchy snapshot every check in one call reads.
pub struct RequestContext {
    pub requester: DbEmployee,
    pub tree: OrgTree,
}

impl RequestContext {
    /// Unknown requesters are denied rather than reported missing.
    pub fn load(db: &StaffDb, requester_id: i64) -> Result<Self, StaffError> {
        let tree = OrgTree::load(db)?;
        let requester = tree
            .get(requester_id)
            .cloned()
            .ok_or_else(StaffError::access_denied)?;
        Ok(Self { requester, tree })
    }

    pub fn require(allowed: bool) -> Result<(), StaffError> {
        if allowed {
            Ok(())
        } else {
            Err(StaffError::access_denied())
        }
    }

    pub fn require_manager(&self) -> Result<(), StaffError> {
        Self::require(crate::access::is_manager_only(&self.requester))
    }

    /// Ids of everyone the requester may aggregate over.
    pub fn scope_ids(&self) -> Vec<i64> {
        self.tree
            .scope_for(self.requester.id)
            .into_iter()
            .map(|e| e.id)
            .collect()
    }
}
