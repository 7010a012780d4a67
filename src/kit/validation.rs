use crate::error::ValidationError;

/// Check a kit name against `^[a-z0-9][a-z0-9-]*$`.
pub fn validate_kit_name(field: &str, name: &str) -> Result<(), ValidationError> {
    let mut chars = name.chars();
    let first = chars
        .next()
        .ok_or_else(|| ValidationError::new(field, "kit name must not be empty"))?;

    let leading_ok = first.is_ascii_lowercase() || first.is_ascii_digit();
    let rest_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !leading_ok || !rest_ok {
        return Err(ValidationError::new(
            field,
            format!(
                "kit name must be lowercase alphanumeric with hyphens, starting with a letter or digit. Got: '{}'",
                name
            ),
        ));
    }
    Ok(())
}
