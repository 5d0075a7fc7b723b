//! SQLite-backed store for the employee directory, feedback and billing.
//!
//! The database lives at `~/.staffdesk/staffdesk.db` unless the config names
//! another path. Every read a request makes for hierarchy resolution comes
//! from a single `SELECT`, so one resolver pass sees one snapshot. Multi-row
//! writes (import, repair) go through [`StaffDb::with_transaction`]; the
//! caller owns the commit/rollback boundary.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

pub mod billing;
pub mod employees;
pub mod feedback;
pub mod types;
pub use types::*;

pub struct StaffDb {
    conn: Connection,
}

impl StaffDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    pub fn with_transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<DbError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| E::from(DbError::from(e)))?;
        match f(self) {
            Ok(val) => {
                if let Err(e) = self.conn.execute_batch("COMMIT") {
                    let _ = self.conn.execute_batch("ROLLBACK");
                    return Err(E::from(DbError::from(e)));
                }
                Ok(val)
            }
            Err(e) => {
                if let Err(rollback_err) = self.conn.execute_batch("ROLLBACK") {
                    log::error!("Rollback failed: {rollback_err}");
                }
                Err(e)
            }
        }
    }

    /// Open (or create) the database at the default location.
    pub fn open() -> Result<Self, DbError> {
        Self::open_at(Self::default_path()?)
    }

    /// Open a database at an explicit path and bring its schema up to date.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::prepare(conn)
    }

    /// Open a private in-memory database. Used by dry runs and tests.
    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self, DbError> {
        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;
        // Manager links and the feedback/billing cascades depend on this.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Resolve the default database path: `~/.staffdesk/staffdesk.db`.
    pub fn default_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".staffdesk").join("staffdesk.db"))
    }

    /// Path of the main database file, if it is file-backed.
    pub fn file_path(&self) -> Option<&Path> {
        self.conn.path().map(Path::new).filter(|p| !p.as_os_str().is_empty())
    }
}
