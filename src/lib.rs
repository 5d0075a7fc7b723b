pub mod access;
pub mod analytics;
pub mod auth;
pub mod db;
pub mod error;
pub mod hierarchy;
pub mod import;
mod migrations;
pub mod repair;
pub mod services;
pub mod state;
pub mod template;
pub mod types;

pub use error::StaffError;
pub use state::AppState;
pub use types::Config;
