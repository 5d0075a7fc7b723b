//! Downloadable roster template.

use crate::import::columns::COLUMNS;

/// Sample rows, one value per entry of [`COLUMNS`] in the same order.
const SAMPLE_ROWS: [[&str; 25]; 2] = [
    [
        "Permanent",
        "Billable",
        "Active",
        "SYS001",
        "BENSL001",
        "John Doe",
        "Software Engineer",
        "Python, JavaScript, SQL",
        "UFS",
        "Jane Smith",
        "",
        "No",
        "2024-01-15",
        "",
        "L3",
        "Software Engineer",
        "2024-01-20",
        "",
        "Male",
        "Allianz",
        "john.doe@company.com",
        "Bangalore",
        "50.00",
        "Standard",
        "Good performer",
    ],
    [
        "Permanent",
        "Billable",
        "Active",
        "SYS002",
        "BENSL002",
        "Jane Smith",
        "Senior Developer",
        "Java, React, MongoDB",
        "RG",
        "Manager Name",
        "",
        "No",
        "2023-08-01",
        "",
        "L4",
        "Senior Developer",
        "2023-08-05",
        "",
        "Female",
        "Allianz",
        "jane.smith@company.com",
        "Mumbai",
        "75.00",
        "Premium",
        "Team lead",
    ],
];

/// Render the template as CSV: the recognized header row plus two sample
/// employees. The output imports cleanly as-is.
pub fn template_csv() -> Result<String, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(COLUMNS.iter().map(|(name, _)| *name))?;
    for row in SAMPLE_ROWS {
        wtr.write_record(row)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;
    use crate::db::NewEmployee;
    use crate::import::{import_table, read_csv};

    #[test]
    fn test_template_shape() {
        let csv_text = template_csv().unwrap();
        let table = read_csv(csv_text.as_bytes()).unwrap();
        assert_eq!(table.headers.len(), COLUMNS.len());
        assert_eq!(table.headers[0], "Employment_Type");
        assert_eq!(table.rows.len(), 2);
        assert!(csv_text.contains("\"Python, JavaScript, SQL\""));
    }

    #[test]
    fn test_template_imports_cleanly() {
        let db = test_db();
        let mgr = db
            .create_employee(
                &NewEmployee {
                    full_name: Some("Importer".into()),
                    is_manager: true,
                    ..Default::default()
                },
                "h",
            )
            .unwrap();
        let table = read_csv(template_csv().unwrap().as_bytes()).unwrap();
        let result = import_table(&db, &table, mgr.id, "h");
        assert!(result.success);
        assert_eq!(result.count, 2);
        assert!(result.errors.is_empty());

        let john = db.find_by_system_id("SYS001").unwrap().unwrap();
        assert_eq!(john.billing_rate, Some(50.0));
        assert_eq!(john.doj_project.map(|d| d.to_string()).as_deref(), Some("2024-01-20"));
    }
}
