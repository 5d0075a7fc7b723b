use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::auth;
use crate::db::{DbEmployee, StaffDb};
use crate::error::StaffError;
use crate::types::Config;

/// Shared state for one running process: the loaded config and the open
/// database handle.
pub struct AppState {
    pub config: Config,
    pub db: Mutex<StaffDb>,
}

impl AppState {
    /// Open the database named by `config` (or the default location).
    pub fn open(config: Config) -> Result<Self, StaffError> {
        let db = match &config.database_path {
            Some(path) => StaffDb::open_at(expand_home(path)),
            None => StaffDb::open(),
        }?;
        if let Some(path) = db.file_path() {
            log::info!("Using database at {}", path.display());
        }
        Ok(Self {
            config,
            db: Mutex::new(db),
        })
    }

    pub fn in_memory(config: Config) -> Result<Self, StaffError> {
        Ok(Self {
            config,
            db: Mutex::new(StaffDb::open_in_memory()?),
        })
    }

    /// Hash of the configured default password, for new employees.
    pub fn default_password_hash(&self) -> Result<String, StaffError> {
        auth::hash_password(&self.config.default_password)
    }

    /// Create the configured root manager when the directory is empty.
    pub fn seed_if_empty(&self) -> Result<Option<DbEmployee>, StaffError> {
        let Some(seed) = &self.config.seed_root_manager else {
            return Ok(None);
        };
        let hash = self.default_password_hash()?;
        Ok(self.db.lock().seed_root_manager(seed, &hash)?)
    }
}

/// Default config location: `~/.staffdesk/config.json`.
pub fn default_config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".staffdesk").join("config.json"))
}

/// Load config from `path`, or from the default location when `None`.
/// A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, String> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !config_path.exists() {
        log::debug!(
            "No config at {}, using defaults",
            config_path.display()
        );
        return Ok(Config::default());
    }

    let content =
        fs::read_to_string(&config_path).map_err(|e| format!("Failed to read config: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewEmployee;

    #[test]
    fn test_missing_config_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("config.json"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.starts_with("Failed to parse config"));
    }

    #[test]
    fn test_open_uses_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("staff.db");
        let config = Config {
            database_path: Some(db_path.to_string_lossy().into_owned()),
            ..Config::default()
        };
        let state = AppState::open(config).unwrap();
        assert!(db_path.exists());
        assert_eq!(state.db.lock().count_employees().unwrap(), 0);
    }

    #[test]
    fn test_seed_if_empty() {
        let config = Config {
            seed_root_manager: Some(NewEmployee {
                full_name: Some("Sooraj Kumar".into()),
                emailid: Some("sooraj@company.com".into()),
                ..Default::default()
            }),
            ..Config::default()
        };
        let state = AppState::in_memory(config).unwrap();
        let seeded = state.seed_if_empty().unwrap().unwrap();
        assert!(seeded.is_manager);
        assert!(state.seed_if_empty().unwrap().is_none());

        let db = state.db.lock();
        assert!(auth::authenticate(&db, "sooraj@company.com", "password123").is_ok());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/staff.db"), PathBuf::from("/abs/staff.db"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/x.db"), home.join("x.db"));
        }
    }
}
