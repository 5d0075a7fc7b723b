use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::*;
use crate::hierarchy::OrgTree;

const EMPLOYEE_COLUMNS: &str = "id, employment_type, billable_status, employee_status,
    system_id, bensl_id, full_name, role, skill, team, manager_name, manager_id, critical,
    doj_company, dol_company, doj_project, dol_project, grade, designation, gender, company,
    emailid, location, billing_rate, rate_card, remarks, password_hash, is_manager,
    created_at, updated_at";

impl StaffDb {
    // =========================================================================
    // Employees
    // =========================================================================

    /// Insert a new employee with the given credential hash.
    ///
    /// Unset status enumerations fall back to Permanent / Billable / Active.
    /// A `manager_id` must name an existing employee.
    pub fn create_employee(
        &self,
        new: &NewEmployee,
        password_hash: &str,
    ) -> Result<DbEmployee, DbError> {
        if let Some(manager_id) = new.manager_id {
            self.require_employee(manager_id, "Manager")?;
        }

        let now = Utc::now().to_rfc3339();
        let or_default = |value: &Option<String>, default: &str| {
            clean_text(value.as_deref()).unwrap_or_else(|| default.to_string())
        };

        self.conn.execute(
            "INSERT INTO employees (
                employment_type, billable_status, employee_status, system_id, bensl_id,
                full_name, role, skill, team, manager_name, manager_id, critical,
                doj_company, dol_company, doj_project, dol_project, grade, designation,
                gender, company, emailid, location, billing_rate, rate_card, remarks,
                password_hash, is_manager, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                       ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?28)",
            params![
                or_default(&new.employment_type, DEFAULT_EMPLOYMENT_TYPE),
                or_default(&new.billable_status, DEFAULT_BILLABLE_STATUS),
                or_default(&new.employee_status, DEFAULT_EMPLOYEE_STATUS),
                clean_text(new.system_id.as_deref()),
                clean_text(new.bensl_id.as_deref()),
                clean_text(new.full_name.as_deref()),
                clean_text(new.role.as_deref()),
                clean_text(new.skill.as_deref()),
                clean_text(new.team.as_deref()),
                clean_text(new.manager_name.as_deref()),
                new.manager_id,
                clean_text(new.critical.as_deref()),
                new.doj_company,
                new.dol_company,
                new.doj_project,
                new.dol_project,
                clean_text(new.grade.as_deref()),
                clean_text(new.designation.as_deref()),
                clean_text(new.gender.as_deref()),
                clean_text(new.company.as_deref()),
                clean_text(new.emailid.as_deref()),
                clean_text(new.location.as_deref()),
                new.billing_rate,
                clean_text(new.rate_card.as_deref()),
                clean_text(new.remarks.as_deref()),
                password_hash,
                new.is_manager,
                now,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.find_employee(id)
    }

    /// Look up an employee by internal id.
    pub fn get_employee(&self, id: i64) -> Result<Option<DbEmployee>, DbError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id], Self::map_employee_row)
            .optional()?)
    }

    /// Like [`get_employee`](Self::get_employee) but a miss is an error.
    pub fn find_employee(&self, id: i64) -> Result<DbEmployee, DbError> {
        self.get_employee(id)?
            .ok_or_else(|| DbError::NotFound(format!("Employee {id}")))
    }

    fn require_employee(&self, id: i64, label: &str) -> Result<(), DbError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        if exists {
            Ok(())
        } else {
            Err(DbError::NotFound(format!("{label} {id}")))
        }
    }

    /// Exact match on `system_id`; the oldest record wins if several share it.
    pub fn find_by_system_id(&self, system_id: &str) -> Result<Option<DbEmployee>, DbError> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE system_id = ?1 ORDER BY id LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![system_id.trim()], Self::map_employee_row)
            .optional()?)
    }

    /// Case-insensitive match on `emailid`.
    pub fn find_by_email(&self, email: &str) -> Result<Option<DbEmployee>, DbError> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees
             WHERE LOWER(emailid) = LOWER(?1) ORDER BY id LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![email.trim()], Self::map_employee_row)
            .optional()?)
    }

    /// Match an external identifier against `system_id` or `bensl_id`.
    pub fn find_by_external_id(&self, external_id: &str) -> Result<Option<DbEmployee>, DbError> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees
             WHERE system_id = ?1 OR bensl_id = ?1 ORDER BY id LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![external_id.trim()], Self::map_employee_row)
            .optional()?)
    }

    /// Employees whose full name contains `fragment`, ignoring case.
    pub fn find_by_name_fragment(&self, fragment: &str) -> Result<Vec<DbEmployee>, DbError> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees
             WHERE full_name IS NOT NULL AND instr(LOWER(full_name), LOWER(?1)) > 0
             ORDER BY id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![fragment], Self::map_employee_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Every employee, in id order.
    pub fn list_employees(&self) -> Result<Vec<DbEmployee>, DbError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::map_employee_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count_employees(&self) -> Result<usize, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Apply a partial update. Fields absent from the patch keep their value.
    pub fn update_employee(&self, id: i64, patch: &EmployeePatch) -> Result<DbEmployee, DbError> {
        let mut emp = self.find_employee(id)?;

        if let Some(manager_id) = patch.manager_id {
            if manager_id != emp.manager_id {
                self.check_manager_link(id, manager_id)?;
            }
            emp.manager_id = manager_id;
        }

        let overwrite = |slot: &mut Option<String>, value: &Option<String>| {
            if let Some(v) = value {
                *slot = clean_text(Some(v));
            }
        };
        overwrite(&mut emp.employment_type, &patch.employment_type);
        overwrite(&mut emp.billable_status, &patch.billable_status);
        overwrite(&mut emp.employee_status, &patch.employee_status);
        overwrite(&mut emp.system_id, &patch.system_id);
        overwrite(&mut emp.bensl_id, &patch.bensl_id);
        overwrite(&mut emp.full_name, &patch.full_name);
        overwrite(&mut emp.role, &patch.role);
        overwrite(&mut emp.skill, &patch.skill);
        overwrite(&mut emp.team, &patch.team);
        overwrite(&mut emp.manager_name, &patch.manager_name);
        overwrite(&mut emp.critical, &patch.critical);
        overwrite(&mut emp.grade, &patch.grade);
        overwrite(&mut emp.designation, &patch.designation);
        overwrite(&mut emp.gender, &patch.gender);
        overwrite(&mut emp.company, &patch.company);
        overwrite(&mut emp.emailid, &patch.emailid);
        overwrite(&mut emp.location, &patch.location);
        overwrite(&mut emp.rate_card, &patch.rate_card);
        overwrite(&mut emp.remarks, &patch.remarks);

        for (slot, value) in [
            (&mut emp.doj_company, patch.doj_company),
            (&mut emp.dol_company, patch.dol_company),
            (&mut emp.doj_project, patch.doj_project),
            (&mut emp.dol_project, patch.dol_project),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }
        if patch.billing_rate.is_some() {
            emp.billing_rate = patch.billing_rate;
        }
        if let Some(is_manager) = patch.is_manager {
            emp.is_manager = is_manager;
        }
        emp.updated_at = Utc::now().to_rfc3339();

        self.conn.execute(
            "UPDATE employees SET
                employment_type = ?2, billable_status = ?3, employee_status = ?4,
                system_id = ?5, bensl_id = ?6, full_name = ?7, role = ?8, skill = ?9,
                team = ?10, manager_name = ?11, manager_id = ?12, critical = ?13,
                doj_company = ?14, dol_company = ?15, doj_project = ?16, dol_project = ?17,
                grade = ?18, designation = ?19, gender = ?20, company = ?21, emailid = ?22,
                location = ?23, billing_rate = ?24, rate_card = ?25, remarks = ?26,
                is_manager = ?27, updated_at = ?28
             WHERE id = ?1",
            params![
                emp.id,
                emp.employment_type,
                emp.billable_status,
                emp.employee_status,
                emp.system_id,
                emp.bensl_id,
                emp.full_name,
                emp.role,
                emp.skill,
                emp.team,
                emp.manager_name,
                emp.manager_id,
                emp.critical,
                emp.doj_company,
                emp.dol_company,
                emp.doj_project,
                emp.dol_project,
                emp.grade,
                emp.designation,
                emp.gender,
                emp.company,
                emp.emailid,
                emp.location,
                emp.billing_rate,
                emp.rate_card,
                emp.remarks,
                emp.is_manager,
                emp.updated_at,
            ],
        )?;
        Ok(emp)
    }

    /// Point an employee at a new manager (or none), keeping the
    /// denormalized manager name in step.
    pub fn set_manager(
        &self,
        id: i64,
        manager_id: Option<i64>,
        manager_name: Option<&str>,
    ) -> Result<(), DbError> {
        self.check_manager_link(id, manager_id)?;
        let changed = self.conn.execute(
            "UPDATE employees SET manager_id = ?2, manager_name = ?3, updated_at = ?4
             WHERE id = ?1",
            params![id, manager_id, clean_text(manager_name), Utc::now().to_rfc3339()],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound(format!("Employee {id}")));
        }
        Ok(())
    }

    /// Reject links to missing managers and links that would close a loop.
    fn check_manager_link(&self, id: i64, manager_id: Option<i64>) -> Result<(), DbError> {
        let Some(manager_id) = manager_id else {
            return Ok(());
        };
        self.require_employee(manager_id, "Manager")?;
        let tree = OrgTree::load(self)?;
        if tree.would_create_cycle(id, manager_id) {
            return Err(DbError::Validation(format!(
                "Employee {manager_id} cannot manage employee {id}: the reporting line would loop"
            )));
        }
        Ok(())
    }

    pub fn set_is_manager(&self, id: i64, is_manager: bool) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE employees SET is_manager = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, is_manager, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn set_password_hash(&self, id: i64, password_hash: &str) -> Result<(), DbError> {
        let changed = self.conn.execute(
            "UPDATE employees SET password_hash = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, password_hash, Utc::now().to_rfc3339()],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound(format!("Employee {id}")));
        }
        Ok(())
    }

    /// Delete an employee and, by cascade, their feedback and billing rows.
    ///
    /// Refused while anyone still reports to them: reports must be moved or
    /// deleted first.
    pub fn delete_employee(&self, id: i64) -> Result<(), DbError> {
        let emp = self.find_employee(id)?;
        let reports: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM employees WHERE manager_id = ?1 AND id != ?1",
            params![id],
            |row| row.get(0),
        )?;
        if reports > 0 {
            return Err(DbError::Dependency(format!(
                "Cannot delete {}: {} direct report(s) still reference this employee",
                emp.full_name.as_deref().unwrap_or("employee"),
                reports
            )));
        }

        self.conn.execute(
            "UPDATE employees SET manager_id = NULL WHERE id = ?1 AND manager_id = ?1",
            params![id],
        )?;
        self.conn
            .execute("DELETE FROM employees WHERE id = ?1", params![id])?;
        log::info!("Deleted employee {id}");
        Ok(())
    }

    /// Insert `root` as the first manager when the directory is empty.
    /// Returns `None` when employees already exist.
    pub fn seed_root_manager(
        &self,
        root: &NewEmployee,
        password_hash: &str,
    ) -> Result<Option<DbEmployee>, DbError> {
        if self.count_employees()? > 0 {
            return Ok(None);
        }
        let seed = NewEmployee {
            manager_id: None,
            is_manager: true,
            ..root.clone()
        };
        let created = self.create_employee(&seed, password_hash)?;
        log::info!(
            "Seeded root manager {} ({})",
            created.name(),
            created.emailid.as_deref().unwrap_or("no email")
        );
        Ok(Some(created))
    }

    pub(crate) fn map_employee_row(row: &Row<'_>) -> rusqlite::Result<DbEmployee> {
        Ok(DbEmployee {
            id: row.get(0)?,
            employment_type: row.get(1)?,
            billable_status: row.get(2)?,
            employee_status: row.get(3)?,
            system_id: row.get(4)?,
            bensl_id: row.get(5)?,
            full_name: row.get(6)?,
            role: row.get(7)?,
            skill: row.get(8)?,
            team: row.get(9)?,
            manager_name: row.get(10)?,
            manager_id: row.get(11)?,
            critical: row.get(12)?,
            doj_company: row.get(13)?,
            dol_company: row.get(14)?,
            doj_project: row.get(15)?,
            dol_project: row.get(16)?,
            grade: row.get(17)?,
            designation: row.get(18)?,
            gender: row.get(19)?,
            company: row.get(20)?,
            emailid: row.get(21)?,
            location: row.get(22)?,
            billing_rate: row.get(23)?,
            rate_card: row.get(24)?,
            remarks: row.get(25)?,
            password_hash: row.get(26)?,
            is_manager: row.get(27)?,
            created_at: row.get(28)?,
            updated_at: row.get(29)?,
        })
    }
}
