use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::*;

const FEEDBACK_COLUMNS: &str = "id, employee_id, manager_id, feedback_type, period_year,
    period_month, period_quarter, performance_rating, goals_achieved,
    areas_of_improvement, strengths, comments, created_at, updated_at";

impl StaffDb {
    // =========================================================================
    // Feedback
    // =========================================================================

    /// Insert a feedback record owned by `manager_id`.
    ///
    /// Authorization is the caller's job; this only validates the period and
    /// rating ranges.
    pub fn insert_feedback(
        &self,
        manager_id: i64,
        input: &FeedbackInput,
    ) -> Result<DbFeedback, DbError> {
        input.validate()?;
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO feedback (
                employee_id, manager_id, feedback_type, period_year, period_month,
                period_quarter, performance_rating, goals_achieved, areas_of_improvement,
                strengths, comments, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
            params![
                input.employee_id,
                manager_id,
                input.period.feedback_type().as_str(),
                input.period.year(),
                input.period.month(),
                input.period.quarter(),
                input.performance_rating,
                clean_text(input.goals_achieved.as_deref()),
                clean_text(input.areas_of_improvement.as_deref()),
                clean_text(input.strengths.as_deref()),
                clean_text(input.comments.as_deref()),
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.find_feedback(id)
    }

    /// Overwrite the content of an existing record. The period replaces the
    /// old one wholesale, so switching between monthly and quarterly clears
    /// the field that no longer applies.
    pub fn update_feedback(&self, id: i64, input: &FeedbackInput) -> Result<DbFeedback, DbError> {
        input.validate()?;
        let changed = self.conn.execute(
            "UPDATE feedback SET
                feedback_type = ?2, period_year = ?3, period_month = ?4, period_quarter = ?5,
                performance_rating = ?6, goals_achieved = ?7, areas_of_improvement = ?8,
                strengths = ?9, comments = ?10, updated_at = ?11
             WHERE id = ?1",
            params![
                id,
                input.period.feedback_type().as_str(),
                input.period.year(),
                input.period.month(),
                input.period.quarter(),
                input.performance_rating,
                clean_text(input.goals_achieved.as_deref()),
                clean_text(input.areas_of_improvement.as_deref()),
                clean_text(input.strengths.as_deref()),
                clean_text(input.comments.as_deref()),
                Utc::now().to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound(format!("Feedback {id}")));
        }
        self.find_feedback(id)
    }

    pub fn get_feedback(&self, id: i64) -> Result<Option<DbFeedback>, DbError> {
        let sql = format!("SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id], Self::map_feedback_row)
            .optional()?)
    }

    pub fn find_feedback(&self, id: i64) -> Result<DbFeedback, DbError> {
        self.get_feedback(id)?
            .ok_or_else(|| DbError::NotFound(format!("Feedback {id}")))
    }

    /// Feedback written by a manager, newest first.
    pub fn list_feedback_by_manager(
        &self,
        manager_id: i64,
        limit: Option<usize>,
    ) -> Result<Vec<DbFeedback>, DbError> {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let sql = format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback
             WHERE manager_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![manager_id, limit], Self::map_feedback_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Feedback received by an employee, newest first.
    pub fn list_feedback_for_employee(&self, employee_id: i64) -> Result<Vec<DbFeedback>, DbError> {
        let sql = format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback
             WHERE employee_id = ?1
             ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![employee_id], Self::map_feedback_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn map_feedback_row(row: &Row<'_>) -> rusqlite::Result<DbFeedback> {
        let type_str: String = row.get(3)?;
        let feedback_type = type_str.parse::<FeedbackType>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(DbFeedback {
            id: row.get(0)?,
            employee_id: row.get(1)?,
            manager_id: row.get(2)?,
            feedback_type,
            period_year: row.get(4)?,
            period_month: row.get(5)?,
            period_quarter: row.get(6)?,
            performance_rating: row.get(7)?,
            goals_achieved: row.get(8)?,
            areas_of_improvement: row.get(9)?,
            strengths: row.get(10)?,
            comments: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }
}
