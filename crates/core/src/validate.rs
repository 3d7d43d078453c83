//! Boundary validation for account fields.
//!
//! These run before anything touches the directory, so no partial mutation
//! can be left behind by malformed input.

use crate::error::{AuthError, AuthResult};

/// Usernames are optional, but when present must be non-empty and contain
/// only letters and digits.
pub fn validate_username(username: &str) -> AuthResult<()> {
    if username.is_empty() {
        return Err(AuthError::validation("username cannot be empty"));
    }
    if !username.chars().all(|c| c.is_alphanumeric()) {
        return Err(AuthError::validation(
            "username should contain only letters and digits",
        ));
    }
    Ok(())
}

/// Minimal structural email check: one `@` with non-empty local part and a
/// dotted domain. Full RFC parsing is out of scope; uniqueness is enforced
/// by the directory.
pub fn validate_email(email: &str) -> AuthResult<()> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::validation("invalid email format"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        return Err(AuthError::validation("invalid email format"));
    }
    Ok(())
}

/// Canonical email form used for storage and token subjects.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.is_empty() {
        return Err(AuthError::validation("password cannot be empty"));
    }
    Ok(())
}
