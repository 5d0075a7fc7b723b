// Roster service
// Bulk import, name-based hierarchy repair and the import template.

use std::path::Path;

use super::RequestContext;
use crate::access;
use crate::db::StaffDb;
use crate::error::StaffError;
use crate::import::{self, ImportResult};
use crate::repair::{self, RepairReport};
use crate::template;

/// Import a roster file. New employees report to the requester unless the
/// file names another manager id.
pub fn import_roster(
    db: &StaffDb,
    requester_id: i64,
    path: &Path,
    password_hash: &str,
) -> Result<ImportResult, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    ctx.require_manager()?;
    Ok(import::import_file(db, path, requester_id, password_hash)?)
}

/// Re-link managers by name from a roster file. Only employees below the
/// requester can be moved, and only under the requester or someone below.
pub fn repair_roster(
    db: &StaffDb,
    requester_id: i64,
    path: &Path,
) -> Result<RepairReport, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    ctx.require_manager()?;
    let table = import::read_table(path)?;
    let report = repair::repair_hierarchy(db, &table, |employee, manager| {
        access::can_manage(&ctx.tree, &ctx.requester, employee.id)
            && (manager.id == ctx.requester.id
                || access::can_manage(&ctx.tree, &ctx.requester, manager.id))
    })?;
    Ok(report)
}

pub fn download_template(db: &StaffDb, requester_id: i64) -> Result<String, StaffError> {
    let ctx = RequestContext::load(db, requester_id)?;
    ctx.require_manager()?;
    template::template_csv()
        .map_err(|e| StaffError::Unexpected(format!("Failed to render template: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;
    use crate::services::test_org::org;

    #[test]
    fn test_import_then_repair() {
        let db = test_db();
        let o = org(&db);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        std::fs::write(
            &path,
            "System_ID,Full_Name,Manager_Name\n\
             SYS500,Kiran Rao,\n\
             SYS501,Meera Iyer,Kiran Rao\n",
        )
        .unwrap();

        let result = import_roster(&db, o.mid.id, &path, "h").unwrap();
        assert!(result.success);
        assert_eq!(result.count, 2);

        let report = repair_roster(&db, o.mid.id, &path).unwrap();
        assert_eq!(report.links_updated, 1);
        assert_eq!(report.managers_promoted, 1);

        let meera = db.find_by_system_id("SYS501").unwrap().unwrap();
        let kiran = db.find_by_system_id("SYS500").unwrap().unwrap();
        assert_eq!(meera.manager_id, Some(kiran.id));
        assert_eq!(kiran.manager_id, Some(o.mid.id));
    }

    #[test]
    fn test_repair_cannot_reach_outside_requester_tree() {
        let db = test_db();
        let o = org(&db);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repair.csv");

        // Other pulling Root's Leaf into their own tree.
        std::fs::write(&path, "System_ID,Manager_Name\nSYS-Leaf,Other\n").unwrap();
        let report = repair_roster(&db, o.other.id, &path).unwrap();
        assert_eq!(report.links_updated, 0);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(db.find_employee(o.leaf.id).unwrap().manager_id, Some(o.mid.id));

        // Root handing Leaf to a manager outside Root's tree.
        let report = repair_roster(&db, o.root.id, &path).unwrap();
        assert_eq!(report.links_updated, 0);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(db.find_employee(o.leaf.id).unwrap().manager_id, Some(o.mid.id));

        // Inside the tree the same kind of row goes through.
        std::fs::write(&path, "System_ID,Manager_Name\nSYS-Leaf,Root\n").unwrap();
        let report = repair_roster(&db, o.root.id, &path).unwrap();
        assert_eq!(report.links_updated, 1);
        assert_eq!(db.find_employee(o.leaf.id).unwrap().manager_id, Some(o.root.id));
    }

    #[test]
    fn test_roster_operations_are_managers_only() {
        let db = test_db();
        let o = org(&db);
        let path = Path::new("roster.csv");
        assert!(matches!(
            import_roster(&db, o.leaf.id, path, "h"),
            Err(StaffError::AccessDenied(_))
        ));
        assert!(matches!(
            download_template(&db, o.leaf.id),
            Err(StaffError::AccessDenied(_))
        ));
        assert!(download_template(&db, o.root.id)
            .unwrap()
            .starts_with("Employment_Type,"));
    }

    #[test]
    fn test_unsupported_extension_is_schema_error() {
        let db = test_db();
        let o = org(&db);
        assert!(matches!(
            import_roster(&db, o.root.id, Path::new("roster.txt"), "h"),
            Err(StaffError::Schema(_))
        ));
    }
}
