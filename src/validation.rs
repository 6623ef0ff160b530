/*!
 * Input validation for user write payloads.
 *
 * Mirrors the schema enforced on every user-facing write:
 * - `firstName` / `lastName`: alphanumeric, 3 to 30 characters, required
 * - `email`: well-formed address, required
 * - `password`: `^[a-zA-Z0-9]{3,30}$`, required
 *
 * Validation runs before any persistence side effect and reports the first
 * violated rule only. Full mode (POST/PUT) requires every field; partial
 * mode (PATCH) checks just the fields present in the payload.
 */

use crate::error::{AppError, AppResult};
use crate::models::UserPayload;
use regex::Regex;
use std::sync::LazyLock;

static ALPHANUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("valid regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

static PASSWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{3,30}$").expect("valid regex"));

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 30;

/// Which part of the schema a write must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every field required (POST, PUT).
    Full,
    /// Only supplied fields are checked (PATCH).
    Partial,
}

pub fn validate_user_payload(payload: &UserPayload, mode: ValidationMode) -> AppResult<()> {
    validate_name_field("firstName", payload.first_name.as_deref(), mode)?;
    validate_name_field("lastName", payload.last_name.as_deref(), mode)?;

    match payload.email.as_deref() {
        Some(email) => {
            if !EMAIL_RE.is_match(email) {
                return Err(AppError::Validation(
                    "\"email\" must be a valid email".to_string(),
                ));
            }
        }
        None if mode == ValidationMode::Full => {
            return Err(AppError::Validation("\"email\" is required".to_string()));
        }
        None => {}
    }

    match payload.password.as_deref() {
        Some(password) => {
            if !PASSWORD_RE.is_match(password) {
                return Err(AppError::Validation(
                    "\"password\" must be alphanumeric, 3 to 30 characters long".to_string(),
                ));
            }
        }
        None if mode == ValidationMode::Full => {
            return Err(AppError::Validation("\"password\" is required".to_string()));
        }
        None => {}
    }

    Ok(())
}

/// Required fields of a message write. Runs before any lookup so a payload
/// missing its subject, body or author never touches the store.
pub fn require_message_fields<'a>(
    subject: Option<&'a str>,
    body: Option<&'a str>,
    user_id: Option<i64>,
) -> AppResult<(&'a str, &'a str, i64)> {
    let subject = subject
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("\"subject\" is required".to_string()))?;
    let body = body
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("\"body\" is required".to_string()))?;
    let user_id =
        user_id.ok_or_else(|| AppError::Validation("\"userId\" is required".to_string()))?;
    Ok((subject, body, user_id))
}

fn validate_name_field(field: &str, value: Option<&str>, mode: ValidationMode) -> AppResult<()> {
    let value = match value {
        Some(value) => value,
        None if mode == ValidationMode::Full => {
            return Err(AppError::Validation(format!("\"{}\" is required", field)));
        }
        None => return Ok(()),
    };

    if !ALPHANUMERIC_RE.is_match(value) {
        return Err(AppError::Validation(format!(
            "\"{}\" must only contain alphanumeric characters",
            field
        )));
    }
    if value.chars().count() < NAME_MIN {
        return Err(AppError::Validation(format!(
            "\"{}\" length must be at least {} characters long",
            field, NAME_MIN
        )));
    }
    if value.chars().count() > NAME_MAX {
        return Err(AppError::Validation(format!(
            "\"{}\" length must be less than or equal to {} characters long",
            field, NAME_MAX
        )));
    }

    Ok(())
}
