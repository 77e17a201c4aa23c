//! Length validators
//!
//! Length means element count for arrays, byte size for uploaded files,
//! key count for other objects and character count for everything else.

use serde_json::Value;

use crate::foundation::{CheckInput, CollaboratorError, Scalar, parse_number};

use super::Env;

/// Measures a value.
pub fn measure(value: &Value, env: &Env<'_>) -> Result<usize, CollaboratorError> {
    Ok(match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => match env.collaborators.files() {
            Some(files) => match files.inspect(value)? {
                Some(meta) => meta.size as usize,
                None => map.len(),
            },
            None => map.len(),
        },
        other => Scalar::from_value(other)
            .as_text()
            .map_or(0, |text| text.chars().count()),
    })
}

fn limit(text: &str) -> Option<usize> {
    let n = parse_number(text)?;
    (n >= 0.0).then_some(n as usize)
}

/// `length:n` (exact) or `length:min,max` (inclusive range).
pub fn length(input: &CheckInput<'_>, env: &Env<'_>) -> Result<bool, CollaboratorError> {
    let len = measure(input.value, env)?;
    if input.param.is_listy() {
        let parts = input.param.parts();
        let (Some(min), Some(max)) = (
            parts.first().and_then(|p| limit(p)),
            parts.get(1).and_then(|p| limit(p)),
        ) else {
            return Ok(false);
        };
        return Ok(min <= len && len <= max);
    }
    Ok(limit(&input.param.as_text()) == Some(len))
}

/// `max:n`: length at most `n`.
pub fn max(input: &CheckInput<'_>, env: &Env<'_>) -> Result<bool, CollaboratorError> {
    let Some(max) = limit(&input.param.as_text()) else {
        return Ok(false);
    };
    Ok(measure(input.value, env)? <= max)
}

/// `min:n`: length at least `n`.
pub fn min(input: &CheckInput<'_>, env: &Env<'_>) -> Result<bool, CollaboratorError> {
    let Some(min) = limit(&input.param.as_text()) else {
        return Ok(false);
    };
    Ok(measure(input.value, env)? >= min)
}
