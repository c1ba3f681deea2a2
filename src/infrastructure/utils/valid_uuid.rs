use uuid::Uuid;

use crate::errors::AppError;

/// Validates if a string is a valid UUID format
pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::BadRequest("invalid identifier format".to_string()))
}

/// Same as [`valid_uuid`] for an optional pagination cursor; blank means "from the start".
pub fn valid_cursor(cursor: Option<&str>) -> Result<Option<Uuid>, AppError> {
    match cursor.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => Uuid::parse_str(c)
            .map(Some)
            .map_err(|_| AppError::BadRequest("invalid pagination cursor".to_string())),
        None => Ok(None),
    }
}
