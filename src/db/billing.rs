use chrono::Utc;
use rusqlite::{params, params_from_iter, Row};

use super::*;

const BILLING_COLUMNS: &str = "id, employee_id, billing_rate, currency, project_name,
    client_name, billing_month, billing_year, billable_hours, total_amount,
    billing_status, created_at, updated_at";

impl StaffDb {
    // =========================================================================
    // Billing
    // =========================================================================

    /// Insert a billing record. `total_amount` is always rate × hours.
    pub fn insert_billing_detail(
        &self,
        new: &NewBillingDetail,
    ) -> Result<DbBillingDetail, DbError> {
        if !(1..=12).contains(&new.billing_month) {
            return Err(DbError::Validation(format!(
                "Billing month must be 1-12, got {}",
                new.billing_month
            )));
        }
        if new.billable_hours < 0.0 {
            return Err(DbError::Validation(
                "Billable hours cannot be negative".to_string(),
            ));
        }

        let now = Utc::now().to_rfc3339();
        let currency = clean_text(new.currency.as_deref()).unwrap_or_else(|| "USD".to_string());
        self.conn.execute(
            "INSERT INTO billing_details (
                employee_id, billing_rate, currency, project_name, client_name,
                billing_month, billing_year, billable_hours, total_amount, billing_status,
                created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                new.employee_id,
                new.billing_rate,
                currency,
                clean_text(new.project_name.as_deref()),
                clean_text(new.client_name.as_deref()),
                new.billing_month,
                new.billing_year,
                new.billable_hours,
                new.total_amount(),
                new.billing_status.as_str(),
                now,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        let sql = format!("SELECT {BILLING_COLUMNS} FROM billing_details WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id], Self::map_billing_row)?)
    }

    /// Billing records for a set of employees, latest period first.
    pub fn list_billing_for_employees(
        &self,
        employee_ids: &[i64],
    ) -> Result<Vec<DbBillingDetail>, DbError> {
        if employee_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; employee_ids.len()].join(", ");
        let sql = format!(
            "SELECT {BILLING_COLUMNS} FROM billing_details
             WHERE employee_id IN ({placeholders})
             ORDER BY billing_year DESC, billing_month DESC, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(employee_ids.iter()), Self::map_billing_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn map_billing_row(row: &Row<'_>) -> rusqlite::Result<DbBillingDetail> {
        let status_str: String = row.get(10)?;
        let billing_status = status_str.parse::<BillingStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(DbBillingDetail {
            id: row.get(0)?,
            employee_id: row.get(1)?,
            billing_rate: row.get(2)?,
            currency: row.get(3)?,
            project_name: row.get(4)?,
            client_name: row.get(5)?,
            billing_month: row.get(6)?,
            billing_year: row.get(7)?,
            billable_hours: row.get(8)?,
            total_amount: row.get(9)?,
            billing_status,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }
}
