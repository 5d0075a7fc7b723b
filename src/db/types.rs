//! Shared type definitions for the database layer.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("{0} not found")]
    NotFound(String),

    /// Delete blocked by rows that still reference the record.
    #[error("{0}")]
    Dependency(String),

    #[error("{0}")]
    Validation(String),
}

pub const DEFAULT_EMPLOYMENT_TYPE: &str = "Permanent";
pub const DEFAULT_BILLABLE_STATUS: &str = "Billable";
pub const DEFAULT_EMPLOYEE_STATUS: &str = "Active";

/// A row from the `employees` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbEmployee {
    pub id: i64,
    pub employment_type: Option<String>,
    pub billable_status: Option<String>,
    pub employee_status: Option<String>,
    pub system_id: Option<String>,
    pub bensl_id: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub skill: Option<String>,
    pub team: Option<String>,
    pub manager_name: Option<String>,
    pub manager_id: Option<i64>,
    pub critical: Option<String>,
    pub doj_company: Option<NaiveDate>,
    pub dol_company: Option<NaiveDate>,
    pub doj_project: Option<NaiveDate>,
    pub dol_project: Option<NaiveDate>,
    pub grade: Option<String>,
    pub designation: Option<String>,
    pub gender: Option<String>,
    pub company: Option<String>,
    pub emailid: Option<String>,
    pub location: Option<String>,
    pub billing_rate: Option<f64>,
    pub rate_card: Option<String>,
    pub remarks: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub is_manager: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl DbEmployee {
    /// Display name used for sorting and summaries; missing names read as "".
    pub fn name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("")
    }
}

/// Fields for a new employee. Anything left `None` is stored as NULL, except
/// the three status enumerations which fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewEmployee {
    pub employment_type: Option<String>,
    pub billable_status: Option<String>,
    pub employee_status: Option<String>,
    pub system_id: Option<String>,
    pub bensl_id: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub skill: Option<String>,
    pub team: Option<String>,
    pub manager_name: Option<String>,
    pub manager_id: Option<i64>,
    pub critical: Option<String>,
    pub doj_company: Option<NaiveDate>,
    pub dol_company: Option<NaiveDate>,
    pub doj_project: Option<NaiveDate>,
    pub dol_project: Option<NaiveDate>,
    pub grade: Option<String>,
    pub designation: Option<String>,
    pub gender: Option<String>,
    pub company: Option<String>,
    pub emailid: Option<String>,
    pub location: Option<String>,
    pub billing_rate: Option<f64>,
    pub rate_card: Option<String>,
    pub remarks: Option<String>,
    pub is_manager: bool,
}

/// Partial update for an employee.
///
/// `None` leaves the stored value alone. For text fields `Some("")` (after
/// trimming) clears the column. `manager_id` is doubly optional so a caller
/// can detach an employee into a root with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeePatch {
    pub employment_type: Option<String>,
    pub billable_status: Option<String>,
    pub employee_status: Option<String>,
    pub system_id: Option<String>,
    pub bensl_id: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub skill: Option<String>,
    pub team: Option<String>,
    pub manager_name: Option<String>,
    pub manager_id: Option<Option<i64>>,
    pub critical: Option<String>,
    pub doj_company: Option<NaiveDate>,
    pub dol_company: Option<NaiveDate>,
    pub doj_project: Option<NaiveDate>,
    pub dol_project: Option<NaiveDate>,
    pub grade: Option<String>,
    pub designation: Option<String>,
    pub gender: Option<String>,
    pub company: Option<String>,
    pub emailid: Option<String>,
    pub location: Option<String>,
    pub billing_rate: Option<f64>,
    pub rate_card: Option<String>,
    pub remarks: Option<String>,
    pub is_manager: Option<bool>,
}

/// Review cadence for a feedback record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackType {
    Monthly,
    Quarterly,
}

impl FeedbackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Monthly => "Monthly",
            FeedbackType::Quarterly => "Quarterly",
        }
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackType {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Monthly" => Ok(FeedbackType::Monthly),
            "Quarterly" => Ok(FeedbackType::Quarterly),
            other => Err(DbError::Validation(format!(
                "Unknown feedback type: {other}"
            ))),
        }
    }
}

/// A row from the `feedback` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbFeedback {
    pub id: i64,
    pub employee_id: i64,
    pub manager_id: i64,
    pub feedback_type: FeedbackType,
    pub period_year: i32,
    pub period_month: Option<u32>,
    pub period_quarter: Option<u32>,
    pub performance_rating: Option<u8>,
    pub goals_achieved: Option<String>,
    pub areas_of_improvement: Option<String>,
    pub strengths: Option<String>,
    pub comments: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// The review period of a feedback record. Monthly and quarterly periods
/// are mutually exclusive, so the period travels as one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackPeriod {
    Month { year: i32, month: u32 },
    Quarter { year: i32, quarter: u32 },
}

impl FeedbackPeriod {
    pub fn feedback_type(&self) -> FeedbackType {
        match self {
            FeedbackPeriod::Month { .. } => FeedbackType::Monthly,
            FeedbackPeriod::Quarter { .. } => FeedbackType::Quarterly,
        }
    }

    pub fn year(&self) -> i32 {
        match *self {
            FeedbackPeriod::Month { year, .. } | FeedbackPeriod::Quarter { year, .. } => year,
        }
    }

    pub fn month(&self) -> Option<u32> {
        match *self {
            FeedbackPeriod::Month { month, .. } => Some(month),
            FeedbackPeriod::Quarter { .. } => None,
        }
    }

    pub fn quarter(&self) -> Option<u32> {
        match *self {
            FeedbackPeriod::Quarter { quarter, .. } => Some(quarter),
            FeedbackPeriod::Month { .. } => None,
        }
    }

    pub fn validate(&self) -> Result<(), DbError> {
        match *self {
            FeedbackPeriod::Month { month, .. } if !(1..=12).contains(&month) => Err(
                DbError::Validation(format!("Feedback month must be 1-12, got {month}")),
            ),
            FeedbackPeriod::Quarter { quarter, .. } if !(1..=4).contains(&quarter) => Err(
                DbError::Validation(format!("Feedback quarter must be 1-4, got {quarter}")),
            ),
            _ => Ok(()),
        }
    }
}

/// Content of a feedback record as entered by a manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackInput {
    pub employee_id: i64,
    pub period: FeedbackPeriod,
    pub performance_rating: Option<u8>,
    pub goals_achieved: Option<String>,
    pub areas_of_improvement: Option<String>,
    pub strengths: Option<String>,
    pub comments: Option<String>,
}

impl FeedbackInput {
    pub fn validate(&self) -> Result<(), DbError> {
        self.period.validate()?;
        if let Some(rating) = self.performance_rating {
            if !(1..=5).contains(&rating) {
                return Err(DbError::Validation(format!(
                    "Performance rating must be 1-5, got {rating}"
                )));
            }
        }
        Ok(())
    }
}

/// Billing workflow states, in workflow order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum BillingStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Paid,
}

impl BillingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingStatus::Draft => "Draft",
            BillingStatus::Submitted => "Submitted",
            BillingStatus::Approved => "Approved",
            BillingStatus::Paid => "Paid",
        }
    }
}

impl fmt::Display for BillingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingStatus {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Draft" => Ok(BillingStatus::Draft),
            "Submitted" => Ok(BillingStatus::Submitted),
            "Approved" => Ok(BillingStatus::Approved),
            "Paid" => Ok(BillingStatus::Paid),
            other => Err(DbError::Validation(format!(
                "Unknown billing status: {other}"
            ))),
        }
    }
}

/// A row from the `billing_details` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbBillingDetail {
    pub id: i64,
    pub employee_id: i64,
    pub billing_rate: Option<f64>,
    pub currency: String,
    pub project_name: Option<String>,
    pub client_name: Option<String>,
    pub billing_month: u32,
    pub billing_year: i32,
    pub billable_hours: f64,
    pub total_amount: f64,
    pub billing_status: BillingStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for a new billing record. `total_amount` is derived on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBillingDetail {
    pub employee_id: i64,
    pub billing_rate: Option<f64>,
    pub currency: Option<String>,
    pub project_name: Option<String>,
    pub client_name: Option<String>,
    pub billing_month: u32,
    pub billing_year: i32,
    pub billable_hours: f64,
    pub billing_status: BillingStatus,
}

impl NewBillingDetail {
    pub fn total_amount(&self) -> f64 {
        self.billing_rate.unwrap_or(0.0) * self.billable_hours
    }
}

/// Trim a text value, mapping blank strings to `None`.
pub fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
