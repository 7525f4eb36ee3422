// handlers/validate.rs - Request body field checks
//
// Length limits match the column widths in the migrations. Lengths count
// characters, not bytes.

use crate::error::ApiError;

pub const USERNAME: (usize, usize) = (1, 25);
pub const PASSWORD: (usize, usize) = (5, 20);
pub const NAME: (usize, usize) = (1, 30);
pub const TITLE: (usize, usize) = (1, 50);

pub fn length(field: &str, value: &str, (min, max): (usize, usize)) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ApiError::bad_request(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(())
}

pub fn username(value: &str) -> Result<(), ApiError> {
    length("username", value, USERNAME)
}

pub fn password(value: &str) -> Result<(), ApiError> {
    length("password", value, PASSWORD)
}

pub fn title(value: &str) -> Result<(), ApiError> {
    length("title", value, TITLE)
}

/// Exactly six hex digits, no leading `#`.
pub fn color_hex(value: &str) -> Result<(), ApiError> {
    if value.len() == 6 && value.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "colorHex must be 6 hexadecimal digits, got '{}'",
            value
        )))
    }
}
