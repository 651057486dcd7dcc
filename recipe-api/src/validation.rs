use rocket::serde::json::{self, Json};

use crate::error::ValidationError;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_FIELD_LENGTH: usize = 255;

/// Lowercases and trims an email address. The whole address is lowercased,
/// not only the domain part.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks the shape of an already normalized email address.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::Blank("email"));
    }
    if email.chars().count() > MAX_FIELD_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_FIELD_LENGTH));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(())
}

/// Trims surrounding whitespace and enforces [`MIN_PASSWORD_LENGTH`] on what
/// remains. Login passwords are compared untrimmed.
pub fn clean_password(password: &str) -> Result<String, ValidationError> {
    let password = password.trim();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH))
    } else {
        Ok(password.to_string())
    }
}

/// Trims `value` and rejects it when it is longer than [`MAX_FIELD_LENGTH`].
pub fn clean_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(ValidationError::TooLong(field, MAX_FIELD_LENGTH));
    }
    Ok(value.to_string())
}

pub fn required<'a>(
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, ValidationError> {
    value.ok_or(ValidationError::Required(field))
}

/// Unwraps a JSON data guard, turning parse failures into a 400 instead of
/// Rocket's default 422.
pub fn parse_body<T>(payload: Result<Json<T>, json::Error<'_>>) -> Result<T, ValidationError> {
    payload
        .map(Json::into_inner)
        .map_err(|e| ValidationError::MalformedBody(e.to_string()))
}
