//! Password credentials and login.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::db::{DbEmployee, StaffDb};
use crate::error::StaffError;

const INVALID_LOGIN: &str = "Invalid email or password";
const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> Result<String, StaffError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StaffError::Unexpected(format!("Password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Log in by email. Unknown emails, missing credentials and wrong passwords
/// all fail the same way.
pub fn authenticate(db: &StaffDb, email: &str, password: &str) -> Result<DbEmployee, StaffError> {
    let denied = || StaffError::AccessDenied(INVALID_LOGIN.to_string());
    let employee = db.find_by_email(email)?.ok_or_else(denied)?;
    match employee.password_hash.as_deref() {
        Some(hash) if verify_password(password, hash) => {
            log::debug!("Login succeeded for employee {}", employee.id);
            Ok(employee)
        }
        _ => {
            log::debug!("Login failed for employee {}", employee.id);
            Err(denied())
        }
    }
}

pub fn change_password(
    db: &StaffDb,
    employee_id: i64,
    current: &str,
    new_password: &str,
) -> Result<(), StaffError> {
    let employee = db.find_employee(employee_id)?;
    let current_ok = employee
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(current, hash));
    if !current_ok {
        return Err(StaffError::AccessDenied(
            "Current password is incorrect".to_string(),
        ));
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(StaffError::Validation(format!(
            "New password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    db.set_password_hash(employee_id, &hash_password(new_password)?)?;
    log::info!("Password changed for employee {employee_id}");
    Ok(())
}
