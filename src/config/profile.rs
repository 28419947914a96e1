use crate::error::{AppError, AppResult};

/// Normalizes a profile name; it becomes a file name under the profiles dir.
pub fn resolve_profile(requested: &str) -> AppResult<String> {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        return Ok("default".to_string());
    }

    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
    if !trimmed.chars().all(allowed) || trimmed.starts_with('.') {
        return Err(AppError::Config(format!(
            "invalid profile name `{trimmed}`; use letters, digits, `-`, `_` or `.`"
        )));
    }

    Ok(trimmed.to_string())
}
