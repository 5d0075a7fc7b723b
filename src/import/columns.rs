//! Recognized roster columns and per-field cell coercion.

use chrono::NaiveDate;

use super::sheet::Cell;
use crate::db::NewEmployee;

/// Text date layouts tried in order. The first that parses wins, so an
/// ambiguous `03/04/2024` reads day-first.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y"];

/// Internal field a roster column feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    EmploymentType,
    BillableStatus,
    EmployeeStatus,
    SystemId,
    BenslId,
    FullName,
    Role,
    Skill,
    Team,
    ManagerName,
    ManagerId,
    Critical,
    DojCompany,
    DolCompany,
    Grade,
    Designation,
    DojProject,
    DolProject,
    Gender,
    Company,
    Emailid,
    Location,
    BillingRate,
    RateCard,
    Remarks,
}

/// External header → field, in template order. Matching is exact after
/// trimming the header.
pub const COLUMNS: &[(&str, Field)] = &[
    ("Employment_Type", Field::EmploymentType),
    ("Billable_Status", Field::BillableStatus),
    ("Employee_Status", Field::EmployeeStatus),
    ("System_ID", Field::SystemId),
    ("Bensl_ID", Field::BenslId),
    ("Full_Name", Field::FullName),
    ("Role", Field::Role),
    ("Skill", Field::Skill),
    ("Team", Field::Team),
    ("Manager_Name", Field::ManagerName),
    ("Manager_ID", Field::ManagerId),
    ("Critical", Field::Critical),
    ("DOJ_Allianz", Field::DojCompany),
    ("DOL_Allianz", Field::DolCompany),
    ("Grade", Field::Grade),
    ("Designation", Field::Designation),
    ("DOJ_Project", Field::DojProject),
    ("DOL_Project", Field::DolProject),
    ("Gender", Field::Gender),
    ("Company", Field::Company),
    ("Emailid", Field::Emailid),
    ("Location", Field::Location),
    ("Billing_Rate", Field::BillingRate),
    ("Rate_Card", Field::RateCard),
    ("Remarks", Field::Remarks),
];

pub fn expected_headers() -> String {
    COLUMNS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pair each recognized header with its column index. A header repeated in
/// the file maps its first occurrence only.
pub fn map_headers(headers: &[String]) -> Vec<(usize, Field)> {
    COLUMNS
        .iter()
        .filter_map(|(name, field)| {
            headers
                .iter()
                .position(|h| h.trim() == *name)
                .map(|idx| (idx, *field))
        })
        .collect()
}

pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn coerce_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => parse_date_text(s),
        _ => None,
    }
}

fn coerce_float(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Manager ids arrive as text or as spreadsheet numbers; only whole
/// numbers count.
fn coerce_id(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Number(n) if n.fract() == 0.0 => Some(*n as i64),
        Cell::Text(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Write one coerced cell into the employee being assembled. Cells that do
/// not coerce leave the field unset.
pub fn apply(field: Field, cell: &Cell, emp: &mut NewEmployee) {
    let text = || cell.as_text();
    match field {
        Field::EmploymentType => emp.employment_type = text(),
        Field::BillableStatus => emp.billable_status = text(),
        Field::EmployeeStatus => emp.employee_status = text(),
        Field::SystemId => emp.system_id = text(),
        Field::BenslId => emp.bensl_id = text(),
        Field::FullName => emp.full_name = text(),
        Field::Role => emp.role = text(),
        Field::Skill => emp.skill = text(),
        Field::Team => emp.team = text(),
        Field::ManagerName => emp.manager_name = text(),
        Field::ManagerId => emp.manager_id = coerce_id(cell),
        Field::Critical => emp.critical = text(),
        Field::DojCompany => emp.doj_company = coerce_date(cell),
        Field::DolCompany => emp.dol_company = coerce_date(cell),
        Field::Grade => emp.grade = text(),
        Field::Designation => emp.designation = text(),
        Field::DojProject => emp.doj_project = coerce_date(cell),
        Field::DolProject => emp.dol_project = coerce_date(cell),
        Field::Gender => emp.gender = text(),
        Field::Company => emp.company = text(),
        Field::Emailid => emp.emailid = text(),
        Field::Location => emp.location = text(),
        Field::BillingRate => emp.billing_rate = coerce_float(cell),
        Field::RateCard => emp.rate_card = text(),
        Field::Remarks => emp.remarks = text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_formats_agree() {
        let iso = parse_date_text("2024-01-15").unwrap();
        assert_eq!(parse_date_text("15/01/2024"), Some(iso));
        assert_eq!(parse_date_text("01/15/2024"), Some(iso));
        assert_eq!(parse_date_text("15-01-2024"), Some(iso));
        assert_eq!(parse_date_text(" 2024-01-15 "), Some(iso));
        assert_eq!(parse_date_text("Jan 15 2024"), None);
    }

    #[test]
    fn test_ambiguous_date_reads_day_first() {
        assert_eq!(
            parse_date_text("03/04/2024"),
            NaiveDate::from_ymd_opt(2024, 4, 3)
        );
    }

    #[test]
    fn test_map_headers_trims_and_is_case_sensitive() {
        let headers: Vec<String> = [" System_ID ", "full_name", "Team", "Unrelated"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mapped = map_headers(&headers);
        assert_eq!(mapped, vec![(0, Field::SystemId), (2, Field::Team)]);
    }

    #[test]
    fn test_expected_headers_lists_every_column() {
        let list = expected_headers();
        assert!(list.starts_with("Employment_Type, Billable_Status"));
        assert!(list.ends_with("Rate_Card, Remarks"));
        assert_eq!(list.split(", ").count(), COLUMNS.len());
    }

    #[test]
    fn test_apply_coerces_by_field() {
        let mut emp = NewEmployee::default();
        apply(Field::BillingRate, &Cell::Text("abc".into()), &mut emp);
        assert_eq!(emp.billing_rate, None);
        apply(Field::BillingRate, &Cell::Text(" 42.5 ".into()), &mut emp);
        assert_eq!(emp.billing_rate, Some(42.5));
        apply(Field::ManagerId, &Cell::Number(7.0), &mut emp);
        assert_eq!(emp.manager_id, Some(7));
        apply(Field::ManagerId, &Cell::Text("seven".into()), &mut emp);
        assert_eq!(emp.manager_id, None);
        apply(Field::SystemId, &Cell::Number(1001.0), &mut emp);
        assert_eq!(emp.system_id.as_deref(), Some("1001"));
        apply(Field::DojProject, &Cell::Text("not a date".into()), &mut emp);
        assert_eq!(emp.doj_project, None);
        apply(Field::Team, &Cell::Text("   ".into()), &mut emp);
        assert_eq!(emp.team, None);
    }
}
