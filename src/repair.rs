//! Name-based manager linking after an import.
//!
//! Rosters usually name the manager instead of giving an id. For each row
//! the repair pass finds the employee by external id and the manager by
//! name, then points the employee at that manager and sets the manager's
//! flag. Names that match more than one person are reported and left alone.

use serde::{Deserialize, Serialize};

use crate::db::{DbEmployee, DbError, StaffDb};
use crate::import::Table;

const EMPLOYEE_ID_COLUMNS: &[&str] = &["System_ID", "Bensl_ID"];
const MANAGER_NAME_COLUMNS: &[&str] = &["Manager_Name", "Manager Name"];

/// What a repair run changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairReport {
    /// Rows carrying both an employee id and a manager name.
    pub rows_seen: usize,
    pub links_updated: usize,
    pub managers_promoted: usize,
    pub warnings: Vec<String>,
}

enum ManagerMatch {
    Found(DbEmployee),
    Ambiguous(usize),
    Missing,
}

/// Resolve a manager name: a unique case-insensitive exact match wins,
/// otherwise a unique substring match.
fn match_manager(db: &StaffDb, name: &str) -> Result<ManagerMatch, DbError> {
    let candidates = db.find_by_name_fragment(name)?;
    let wanted = name.trim().to_lowercase();
    let mut exact: Vec<DbEmployee> = candidates
        .iter()
        .filter(|c| c.name().trim().to_lowercase() == wanted)
        .cloned()
        .collect();

    Ok(match (exact.len(), candidates.len()) {
        (1, _) => ManagerMatch::Found(exact.remove(0)),
        (n, _) if n > 1 => ManagerMatch::Ambiguous(n),
        (_, 1) => ManagerMatch::Found(candidates.into_iter().next().ok_or_else(|| {
            DbError::NotFound(format!("Manager {name}"))
        })?),
        (_, 0) => ManagerMatch::Missing,
        (_, n) => ManagerMatch::Ambiguous(n),
    })
}

/// First non-blank value among the given columns of a row.
fn first_value(table: &Table, row: usize, columns: &[&str]) -> Option<String> {
    columns
        .iter()
        .filter_map(|name| table.column(name))
        .find_map(|col| table.cell(row, col).as_text())
}

/// Link employees to managers named in `table`, in one transaction.
///
/// `may_link(employee, manager)` decides whether the caller is allowed to
/// make that link; refused rows become warnings.
pub fn repair_hierarchy<F>(
    db: &StaffDb,
    table: &Table,
    may_link: F,
) -> Result<RepairReport, DbError>
where
    F: Fn(&DbEmployee, &DbEmployee) -> bool,
{
    let has_id = EMPLOYEE_ID_COLUMNS.iter().any(|c| table.column(c).is_some());
    let has_manager = MANAGER_NAME_COLUMNS.iter().any(|c| table.column(c).is_some());
    if !has_id || !has_manager {
        return Err(DbError::Validation(
            "Hierarchy repair needs a System_ID or Bensl_ID column and a Manager_Name column"
                .to_string(),
        ));
    }

    let report = db.with_transaction(|tx| -> Result<RepairReport, DbError> {
        let mut report = RepairReport::default();

        for index in 0..table.rows.len() {
            let row_number = index + 2;
            let (Some(external_id), Some(manager_name)) = (
                first_value(table, index, EMPLOYEE_ID_COLUMNS),
                first_value(table, index, MANAGER_NAME_COLUMNS),
            ) else {
                continue;
            };
            report.rows_seen += 1;

            let Some(employee) = tx.find_by_external_id(&external_id)? else {
                report.warnings.push(format!(
                    "Row {row_number}: No employee with ID {external_id}"
                ));
                continue;
            };

            let manager = match match_manager(tx, &manager_name)? {
                ManagerMatch::Found(m) => m,
                ManagerMatch::Ambiguous(n) => {
                    report.warnings.push(format!(
                        "Row {row_number}: Manager name '{manager_name}' is ambiguous ({n} matches); link not changed"
                    ));
                    continue;
                }
                ManagerMatch::Missing => {
                    report.warnings.push(format!(
                        "Row {row_number}: No manager named '{manager_name}'"
                    ));
                    continue;
                }
            };
            if manager.id == employee.id {
                continue;
            }
            if !may_link(&employee, &manager) {
                report.warnings.push(format!(
                    "Row {row_number}: Not allowed to link {external_id} to '{manager_name}'"
                ));
                continue;
            }

            if employee.manager_id != Some(manager.id)
                || employee.manager_name.as_deref() != manager.full_name.as_deref()
            {
                match tx.set_manager(employee.id, Some(manager.id), manager.full_name.as_deref()) {
                    Ok(()) => report.links_updated += 1,
                    Err(DbError::Validation(msg)) => {
                        report.warnings.push(format!("Row {row_number}: {msg}"));
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            if !manager.is_manager {
                tx.set_is_manager(manager.id, true)?;
                report.managers_promoted += 1;
            }
        }
        Ok(report)
    })?;

    log::info!(
        "Hierarchy repair: {} row(s), {} link(s) updated, {} manager(s) promoted, {} warning(s)",
        report.rows_seen,
        report.links_updated,
        report.managers_promoted,
        report.warnings.len()
    );
    Ok(report)
}
