//! Error types for service operations
//!
//! Errors are classified by who can act on them:
//! - User-visible: not found, access denied, bad input, blocked delete
//! - Internal: storage failures and anything else unexpected

use thiserror::Error;

use crate::db::DbError;
use crate::import::ImportError;

/// Error types returned at the service boundary
#[derive(Debug, Error)]
pub enum StaffError {
    #[error("{0} not found")]
    NotFound(String),

    /// Never says which rule refused.
    #[error("{0}")]
    AccessDenied(String),

    #[error("Unusable import file: {0}")]
    Schema(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Dependency(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl StaffError {
    pub fn access_denied() -> Self {
        StaffError::AccessDenied("Access denied".to_string())
    }

    /// Returns true if the message is safe and useful to show to the requester
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, StaffError::Unexpected(_))
    }

    /// HTTP status an outer web layer would map this to
    pub fn status_hint(&self) -> u16 {
        match self {
            StaffError::NotFound(_) => 404,
            StaffError::AccessDenied(_) => 403,
            StaffError::Schema(_) | StaffError::Validation(_) => 400,
            StaffError::Dependency(_) => 409,
            StaffError::Unexpected(_) => 500,
        }
    }
}

impl From<DbError> for StaffError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => StaffError::NotFound(what),
            DbError::Dependency(msg) => StaffError::Dependency(msg),
            DbError::Validation(msg) => StaffError::Validation(msg),
            other => StaffError::Unexpected(other.to_string()),
        }
    }
}

impl From<ImportError> for StaffError {
    fn from(err: ImportError) -> Self {
        StaffError::Schema(err.to_string())
    }
}

/// Serializable error representation for an outer API layer
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: String,
    pub status: u16,
}

impl From<&StaffError> for ErrorPayload {
    fn from(err: &StaffError) -> Self {
        let message = if err.is_user_visible() {
            err.to_string()
        } else {
            "Something went wrong".to_string()
        };
        ErrorPayload {
            message,
            status: err.status_hint(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_taxonomy() {
        assert!(matches!(
            StaffError::from(DbError::NotFound("Employee 7".into())),
            StaffError::NotFound(_)
        ));
        assert!(matches!(
            StaffError::from(DbError::Dependency("blocked".into())),
            StaffError::Dependency(_)
        ));
        assert!(matches!(
            StaffError::from(DbError::Migration("boom".into())),
            StaffError::Unexpected(_)
        ));
    }

    #[test]
    fn test_not_found_message() {
        let err = StaffError::from(DbError::NotFound("Employee 7".into()));
        assert_eq!(err.to_string(), "Employee 7 not found");
        assert_eq!(err.status_hint(), 404);
    }

    #[test]
    fn test_payload_hides_internal_errors() {
        let payload = ErrorPayload::from(&StaffError::Unexpected("disk I/O error".into()));
        assert_eq!(payload.message, "Something went wrong");
        assert_eq!(payload.status, 500);

        let payload = ErrorPayload::from(&StaffError::access_denied());
        assert_eq!(payload.message, "Access denied");
        assert_eq!(payload.status, 403);
    }

    #[test]
    fn test_import_errors_are_schema_errors() {
        let err = StaffError::from(ImportError::UnsupportedFormat("pdf".into()));
        assert_eq!(err.status_hint(), 400);
        assert!(err.to_string().contains(".pdf"));
    }
}
