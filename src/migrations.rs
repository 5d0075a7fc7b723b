//! Schema migration framework.
//!
//! Numbered SQL migrations are embedded at compile time via `include_str!`.
//! Each migration runs exactly once, tracked by the `schema_version` table.

use rusqlite::Connection;

struct Migration {
    version: i32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("migrations/001_baseline.sql"),
}];

fn ensure_schema_version_table(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .map_err(|e| format!("Failed to create schema_version table: {}", e))
}

/// Return the highest applied migration version, or 0 if none.
fn current_version(conn: &Connection) -> Result<i32, String> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| format!("Failed to read schema version: {}", e))
}

/// Hot copy of the database at `<db_path>.pre-migration.bak`.
///
/// Skipped for in-memory databases. Only called when migrations are pending
/// and at least one employee row exists.
fn backup_before_migration(conn: &Connection) -> Result<(), String> {
    let db_path: String = conn
        .query_row("PRAGMA database_list", [], |row| row.get(2))
        .map_err(|e| format!("Failed to get database path: {}", e))?;

    if db_path.is_empty() || db_path == ":memory:" {
        return Ok(());
    }

    let backup_path = format!("{}.pre-migration.bak", db_path);
    let mut backup_conn = Connection::open(&backup_path)
        .map_err(|e| format!("Failed to open backup file: {}", e))?;

    let backup = rusqlite::backup::Backup::new(conn, &mut backup_conn)
        .map_err(|e| format!("Failed to initialize pre-migration backup: {}", e))?;
    backup
        .step(-1)
        .map_err(|e| format!("Pre-migration backup failed: {}", e))?;

    log::info!("Pre-migration backup created at {}", backup_path);
    Ok(())
}

fn has_employee_rows(conn: &Connection) -> bool {
    conn.prepare("SELECT 1 FROM employees LIMIT 1")
        .and_then(|mut stmt| stmt.exists([]))
        .unwrap_or(false)
}

/// Run all pending migrations.
///
/// Returns the number of migrations applied (0 if already up-to-date).
/// A database stamped with a version newer than any known migration is
/// refused rather than opened.
pub fn run_migrations(conn: &Connection) -> Result<usize, String> {
    ensure_schema_version_table(conn)?;

    let current = current_version(conn)?;
    let max_known = MIGRATIONS.last().map(|m| m.version).unwrap_or(0);

    if current > max_known {
        return Err(format!(
            "Database schema version ({}) is newer than this version of staffdesk supports ({}). \
             Please upgrade staffdesk.",
            current, max_known
        ));
    }

    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        return Ok(0);
    }

    if has_employee_rows(conn) {
        backup_before_migration(conn)?;
    }

    for migration in &pending {
        conn.execute_batch(migration.sql)
            .map_err(|e| format!("Migration v{} failed: {}", migration.version, e))?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [migration.version],
        )
        .map_err(|e| format!("Failed to record migration v{}: {}", migration.version, e))?;

        log::info!("Applied migration v{}", migration.version);
    }

    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_db() -> Connection {
        Connection::open_in_memory().expect("in-memory db")
    }

    #[test]
    fn test_fresh_db_applies_baseline() {
        let conn = mem_db();
        let applied = run_migrations(&conn).expect("migrations should succeed");
        assert_eq!(applied, 1);
        assert_eq!(current_version(&conn).expect("version query"), 1);

        conn.execute(
            "INSERT INTO employees (full_name, is_manager, created_at, updated_at)
             VALUES ('Root', 1, '2025-01-01', '2025-01-01')",
            [],
        )
        .expect("employees table should exist");

        conn.execute(
            "INSERT INTO feedback (employee_id, manager_id, feedback_type, period_year,
             period_month, created_at, updated_at)
             VALUES (1, 1, 'Monthly', 2025, 3, '2025-01-01', '2025-01-01')",
            [],
        )
        .expect("feedback table should exist");

        conn.execute(
            "INSERT INTO billing_details (employee_id, billing_month, billing_year,
             created_at, updated_at)
             VALUES (1, 4, 2025, '2025-01-01', '2025-01-01')",
            [],
        )
        .expect("billing_details table should exist");

        let (currency, status): (String, String) = conn
            .query_row(
                "SELECT currency, billing_status FROM billing_details",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(currency, "USD");
        assert_eq!(status, "Draft");
    }

    #[test]
    fn test_feedback_type_is_constrained() {
        let conn = mem_db();
        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO employees (full_name, created_at, updated_at) VALUES ('A', 'x', 'x')",
            [],
        )
        .unwrap();
        let result = conn.execute(
            "INSERT INTO feedback (employee_id, manager_id, feedback_type, period_year,
             created_at, updated_at)
             VALUES (1, 1, 'Weekly', 2025, 'x', 'x')",
            [],
        );
        assert!(result.is_err(), "unknown feedback type should be rejected");
    }

    #[test]
    fn test_forward_compat_guard() {
        let conn = mem_db();
        ensure_schema_version_table(&conn).unwrap();
        conn.execute("INSERT INTO schema_version (version) VALUES (999)", [])
            .unwrap();

        let err = run_migrations(&conn).unwrap_err();
        assert!(
            err.contains("newer than this version"),
            "error should mention version mismatch: {}",
            err
        );
    }

    #[test]
    fn test_idempotency() {
        let conn = mem_db();
        assert_eq!(run_migrations(&conn).expect("first run"), 1);
        assert_eq!(run_migrations(&conn).expect("second run"), 0);
        assert_eq!(current_version(&conn).expect("version query"), 1);
    }
}
