//! Request field rules.
//!
//! Every text field is trimmed before it is checked, and the trimmed value is
//! what gets stored. Lengths are counted in characters.

use thiserror::Error;

pub const USERNAME_MAX_CHARS: usize = 32;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const TOPIC_TITLE_MAX_CHARS: usize = 100;
pub const TOPIC_DESCRIPTION_MAX_CHARS: usize = 500;
pub const POST_TITLE_MAX_CHARS: usize = 120;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} too long (max {max})")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} too short (min {min})")]
    TooShort { field: &'static str, min: usize },

    #[error("{0} is required")]
    Required(&'static str),

    #[error("nothing to update")]
    NothingToUpdate,
}

/// Trim `raw` and require it to be non-empty and, if `max` is given, at most
/// `max` characters long.
pub fn required_text(field: &'static str, raw: &str, max: Option<usize>) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    check_max(field, value, max)?;
    Ok(value.to_string())
}

/// Trim `raw`; empty is allowed.
pub fn optional_text(field: &'static str, raw: &str, max: usize) -> Result<String, ValidationError> {
    let value = raw.trim();
    check_max(field, value, Some(max))?;
    Ok(value.to_string())
}

fn check_max(field: &'static str, value: &str, max: Option<usize>) -> Result<(), ValidationError> {
    match max {
        Some(max) if value.chars().count() > max => Err(ValidationError::TooLong { field, max }),
        _ => Ok(()),
    }
}

pub fn username(raw: &str) -> Result<String, ValidationError> {
    required_text("username", raw, Some(USERNAME_MAX_CHARS))
}

/// Passwords are neither trimmed nor capped.
pub fn password(raw: &str) -> Result<(), ValidationError> {
    if raw.chars().count() < PASSWORD_MIN_CHARS {
        return Err(ValidationError::TooShort {
            field: "password",
            min: PASSWORD_MIN_CHARS,
        });
    }
    Ok(())
}

pub fn topic_title(raw: &str) -> Result<String, ValidationError> {
    required_text("title", raw, Some(TOPIC_TITLE_MAX_CHARS))
}

pub fn topic_description(raw: &str) -> Result<String, ValidationError> {
    optional_text("description", raw, TOPIC_DESCRIPTION_MAX_CHARS)
}

pub fn post_title(raw: &str) -> Result<String, ValidationError> {
    required_text("title", raw, Some(POST_TITLE_MAX_CHARS))
}

/// Post and comment bodies: non-empty, no upper bound.
pub fn body(raw: &str) -> Result<String, ValidationError> {
    required_text("body", raw, None)
}

/// The acting user id carried in mutating request bodies.
pub fn acting_user(user_id: Option<i64>) -> Result<i64, ValidationError> {
    match user_id {
        Some(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::Required("userId")),
    }
}
