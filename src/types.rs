use serde::{Deserialize, Serialize};

use crate::db::NewEmployee;

/// Configuration stored in `~/.staffdesk/config.json`.
///
/// Every field has a default, so a missing or partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Database file. Defaults to `~/.staffdesk/staffdesk.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    /// Credential given to employees created by hand or by import.
    #[serde(default = "default_password")]
    pub default_password: String,
    /// How many import warnings the CLI prints before summarizing the rest.
    #[serde(default = "default_import_error_display_limit")]
    pub import_error_display_limit: usize,
    /// Employee created as the first root manager when the directory is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_root_manager: Option<NewEmployee>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            default_password: default_password(),
            import_error_display_limit: default_import_error_display_limit(),
            seed_root_manager: None,
        }
    }
}

fn default_password() -> String {
    "password123".to_string()
}

fn default_import_error_display_limit() -> usize {
    20
}
