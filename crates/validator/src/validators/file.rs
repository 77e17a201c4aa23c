//! Uploaded-file validators

use serde_json::Value;
use tracing::warn;

use crate::collaborators::{FileMeta, ImageKind};
use crate::foundation::{CheckInput, CollaboratorError, parse_number};

use super::Env;

/// Asks the file inspector about `value`. Without an inspector nothing is a
/// file.
pub fn inspect(value: &Value, env: &Env<'_>) -> Result<Option<FileMeta>, CollaboratorError> {
    match env.collaborators.files() {
        Some(files) => files.inspect(value),
        None => {
            warn!("file rule needs a file inspector but none is configured");
            Ok(None)
        }
    }
}

/// Applies `test` to one file or to every file of a list.
fn each_file(
    value: &Value,
    env: &Env<'_>,
    test: impl Fn(&FileMeta) -> bool,
) -> Result<bool, CollaboratorError> {
    if let Value::Array(items) = value {
        if items.is_empty() {
            return Ok(false);
        }
        for item in items {
            match inspect(item, env)? {
                Some(meta) if test(&meta) => {}
                _ => return Ok(false),
            }
        }
        return Ok(true);
    }
    Ok(inspect(value, env)?.is_some_and(|meta| test(&meta)))
}

/// `fileExt:jpg,png`: extension in the list, case-insensitively.
pub fn file_ext(input: &CheckInput<'_>, env: &Env<'_>) -> Result<bool, CollaboratorError> {
    let allowed: Vec<String> = input
        .param
        .parts()
        .iter()
        .map(|p| p.trim().to_ascii_lowercase())
        .collect();
    each_file(input.value, env, |meta| {
        allowed.contains(&meta.extension.to_ascii_lowercase())
    })
}

/// `fileMime:image/png,...`: MIME type in the list.
pub fn file_mime(input: &CheckInput<'_>, env: &Env<'_>) -> Result<bool, CollaboratorError> {
    let allowed: Vec<String> = input
        .param
        .parts()
        .iter()
        .map(|p| p.trim().to_ascii_lowercase())
        .collect();
    each_file(input.value, env, |meta| {
        allowed.contains(&meta.mime.to_ascii_lowercase())
    })
}

/// `fileSize:bytes`: at most `bytes`.
pub fn file_size(input: &CheckInput<'_>, env: &Env<'_>) -> Result<bool, CollaboratorError> {
    let Some(limit) = parse_number(&input.param.as_text()) else {
        return Ok(false);
    };
    each_file(input.value, env, |meta| meta.size as f64 <= limit)
}

/// Bare `image`: a gif, jpeg, png or bmp.
pub fn is_common_image(value: &Value, env: &Env<'_>) -> Result<bool, CollaboratorError> {
    Ok(inspect(value, env)?
        .and_then(|meta| meta.image)
        .is_some_and(|image| image.kind.is_common()))
}

fn kind_matches(kind: &ImageKind, wanted: &str) -> bool {
    let wanted = wanted.trim().to_ascii_lowercase();
    let wanted = if wanted == "jpg" { "jpeg" } else { wanted.as_str() };
    kind.extension().eq_ignore_ascii_case(wanted)
}

/// `image[:width,height[,type]]` or `image:type`.
pub fn image(input: &CheckInput<'_>, env: &Env<'_>) -> Result<bool, CollaboratorError> {
    if input.param.is_empty() {
        return is_common_image(input.value, env);
    }
    let Some(info) = inspect(input.value, env)?.and_then(|meta| meta.image) else {
        return Ok(false);
    };
    let parts = input.param.parts();
    match parts.as_slice() {
        [kind] => Ok(kind_matches(&info.kind, kind)),
        [width, height, rest @ ..] => {
            if let Some(kind) = rest.first()
                && !kind_matches(&info.kind, kind)
            {
                return Ok(false);
            }
            let size = (width.trim().parse::<u32>(), height.trim().parse::<u32>());
            Ok(matches!(size, (Ok(w), Ok(h)) if w == info.width && h == info.height))
        }
        [] => Ok(false),
    }
}
