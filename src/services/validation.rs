use crate::error::{AppError, AppResult};

pub const MIN_NAME_LEN: usize = 2;

/// Trim a free-text field; blank becomes `None`.
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn required_name(field: &str, value: Option<String>) -> AppResult<String> {
    match clean(value) {
        Some(name) => name_of(field, name),
        None => Err(AppError::Validation(format!("{field} name is required"))),
    }
}

pub fn name_of(field: &str, value: String) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() < MIN_NAME_LEN {
        return Err(AppError::Validation(format!(
            "{field} name must be at least {MIN_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn price(value: i64) -> AppResult<i64> {
    if value < 0 {
        return Err(AppError::Validation("Price cannot be negative".into()));
    }
    Ok(value)
}

pub fn stock(value: i32) -> AppResult<i32> {
    if value < 0 {
        return Err(AppError::Validation("Stock cannot be negative".into()));
    }
    Ok(value)
}

pub fn quantity(value: Option<i32>) -> AppResult<i32> {
    match value {
        Some(q) if q > 0 => Ok(q),
        Some(_) => Err(AppError::Validation("Quantity must be greater than 0".into())),
        None => Err(AppError::Validation("Quantity is required".into())),
    }
}

/// Normalised email: trimmed, lowercase, one `@` with text on both sides.
pub fn email(value: &str) -> AppResult<String> {
    let email = value.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(AppError::Validation(format!("{} is not a valid email", value.trim())));
    }
    Ok(email)
}

pub fn image_url(value: Option<String>) -> AppResult<Option<String>> {
    match clean(value) {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => Ok(Some(url)),
        Some(url) => Err(AppError::Validation(format!("{url} is not a valid URL"))),
        None => Ok(None),
    }
}
