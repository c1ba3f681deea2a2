use crate::errors::ValidationFailure;

/// Empty, whitespace-only and unset all count as absent.
pub fn required(field: &'static str, value: &Option<String>) -> Result<String, ValidationFailure> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_owned()),
        _ => Err(ValidationFailure::new(field, format!("{field} is required"))),
    }
}

/// Non-blank optional strings become `Some`, everything else `None`.
pub fn present(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Extensions are stored lowercase without a leading dot.
pub fn extension(value: &Option<String>) -> Result<String, ValidationFailure> {
    let ext = required("extension", value)?;
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();

    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationFailure::new(
            "extension",
            "extension must be alphanumeric",
        ));
    }
    Ok(ext)
}
