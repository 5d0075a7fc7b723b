//! Bulk roster import.
//!
//! A roster file is read into a [`Table`], each row is coerced into a new
//! employee, validated and deduplicated, and the accepted rows are written
//! in one transaction. Row problems become warnings in the
//! [`ImportResult`]; only a failure while writing aborts the batch, and then
//! nothing from the file is kept.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{DbError, NewEmployee, StaffDb};
use crate::hierarchy::OrgTree;

pub mod columns;
pub mod sheet;

pub use sheet::{read_csv, read_table, Cell, Table};

/// Reasons a roster file cannot be imported at all.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported file format: .{0}. Use .xlsx, .xls or .csv")]
    UnsupportedFormat(String),

    #[error("Failed to read file: {0}")]
    Read(String),

    #[error("File is empty")]
    Empty,

    #[error("No recognized columns found. Expected columns: {0}")]
    NoRecognizedColumns(String),
}

/// Outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    /// Employees created.
    pub count: usize,
    /// Rows dropped as duplicates of an existing or earlier row.
    pub skipped: usize,
    /// Row-level warnings, in file order.
    pub errors: Vec<String>,
    /// Set when the file could not be imported at all.
    pub error: Option<String>,
}

impl ImportResult {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// A row that passed validation and dedupe, waiting to be written.
struct PendingRow {
    row_number: usize,
    employee: NewEmployee,
}

/// Import a roster file on behalf of `importer_id`.
///
/// Only an unsupported extension is returned as an error; every other
/// problem is reported in the result.
pub fn import_file(
    db: &StaffDb,
    path: &Path,
    importer_id: i64,
    password_hash: &str,
) -> Result<ImportResult, ImportError> {
    sheet::detect_format(path)?;
    let table = match read_table(path) {
        Ok(t) => t,
        Err(e @ ImportError::UnsupportedFormat(_)) => return Err(e),
        Err(e) => return Ok(ImportResult::failed(e.to_string())),
    };
    log::info!(
        "Importing {} row(s) from {}",
        table.rows.len(),
        path.display()
    );
    Ok(import_table(db, &table, importer_id, password_hash))
}

/// Reconcile an already-parsed table into the directory.
pub fn import_table(
    db: &StaffDb,
    table: &Table,
    importer_id: i64,
    password_hash: &str,
) -> ImportResult {
    if table.rows.iter().all(|row| row.iter().all(Cell::is_blank)) {
        return ImportResult::failed(ImportError::Empty.to_string());
    }

    let mapping = columns::map_headers(&table.headers);
    if mapping.is_empty() {
        return ImportResult::failed(
            ImportError::NoRecognizedColumns(columns::expected_headers()).to_string(),
        );
    }

    let mut result = ImportResult::default();
    let pending = match collect_rows(db, table, &mapping, &mut result) {
        Ok(p) => p,
        Err(e) => return unexpected(e),
    };
    // New rows may only hang under the importer or someone below them.
    let placeable = match OrgTree::load(db) {
        Ok(tree) => tree.subordinate_ids(importer_id),
        Err(e) => return unexpected(e),
    };

    let mut warnings = Vec::new();
    let written = db.with_transaction(|tx| -> Result<usize, DbError> {
        let mut count = 0;
        for row in &pending {
            let mut employee = row.employee.clone();
            let placed = match employee.manager_id {
                Some(mgr) if mgr == importer_id || placeable.contains(&mgr) => true,
                Some(mgr) => {
                    let reason = if tx.get_employee(mgr)?.is_some() {
                        "is outside the importer's hierarchy"
                    } else {
                        "not found"
                    };
                    warnings.push(format!(
                        "Row {}: Manager ID {} {}, assigned to importing manager",
                        row.row_number, mgr, reason
                    ));
                    false
                }
                None => false,
            };
            if !placed {
                employee.manager_id = Some(importer_id);
            }
            tx.create_employee(&employee, password_hash)?;
            count += 1;
        }
        Ok(count)
    });

    match written {
        Ok(count) => {
            result.count = count;
            result.errors.extend(warnings);
            result.success = true;
            log::info!(
                "Import finished: {} created, {} skipped, {} warning(s)",
                result.count,
                result.skipped,
                result.errors.len()
            );
            result
        }
        Err(e) => unexpected(e),
    }
}

fn unexpected(e: DbError) -> ImportResult {
    log::error!("Import rolled back: {e}");
    ImportResult::failed(format!("Unexpected error: {e}"))
}

/// First pass: coerce, validate and dedupe every row. Nothing is written.
fn collect_rows(
    db: &StaffDb,
    table: &Table,
    mapping: &[(usize, columns::Field)],
    result: &mut ImportResult,
) -> Result<Vec<PendingRow>, DbError> {
    let mut pending = Vec::new();
    let mut seen_system_ids = HashSet::new();
    let mut seen_emails = HashSet::new();

    for (index, row) in table.rows.iter().enumerate() {
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        let row_number = index + 2;

        let mut employee = NewEmployee::default();
        for (col, field) in mapping {
            columns::apply(*field, table.cell(index, *col), &mut employee);
        }

        if employee.system_id.is_none() && employee.full_name.is_none() {
            result
                .errors
                .push(format!("Row {row_number}: Missing System ID or Full Name"));
            continue;
        }

        let duplicate = if let Some(system_id) = &employee.system_id {
            (!seen_system_ids.insert(system_id.clone())
                || db.find_by_system_id(system_id)?.is_some())
            .then(|| format!("System ID {system_id}"))
        } else if let Some(email) = &employee.emailid {
            (!seen_emails.insert(email.to_lowercase()) || db.find_by_email(email)?.is_some())
                .then(|| format!("email {email}"))
        } else {
            None
        };
        if let Some(key) = duplicate {
            result.skipped += 1;
            result
                .errors
                .push(format!("Row {row_number}: Employee with {key} already exists"));
            continue;
        }
        if let Some(email) = &employee.emailid {
            seen_emails.insert(email.to_lowercase());
        }

        pending.push(PendingRow {
            row_number,
            employee,
        });
    }
    Ok(pending)
}
