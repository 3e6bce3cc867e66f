use crate::error::ApiError;

/// Maximum identifier length for synthesis requests
const MAX_ID_LENGTH: usize = 512;
/// Maximum text length for the standard synthesis path
const MAX_TEXT_LENGTH: usize = 5000;

/// Validate synthesis request
pub fn validate_synthesis_request(id: &str, text: Option<&str>) -> Result<(), ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::InvalidInput("Identifier cannot be empty".to_string()));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "Identifier too long (max {} characters)",
            MAX_ID_LENGTH
        )));
    }
    if is_local_absolute(id) {
        return Err(ApiError::InvalidInput(format!(
            "Identifier must be relative to the resource root: {}",
            id
        )));
    }
    if has_parent_component(id) {
        return Err(ApiError::InvalidInput(format!(
            "Identifier must not contain '..' components: {}",
            id
        )));
    }

    if let Some(text) = text {
        if text.trim().is_empty() {
            return Err(ApiError::InvalidInput("Text cannot be empty".to_string()));
        }
        if text.len() > MAX_TEXT_LENGTH {
            return Err(ApiError::InvalidInput(format!(
                "Text too long (max {} characters)",
                MAX_TEXT_LENGTH
            )));
        }
    }

    Ok(())
}

/// Identifiers are resolved below the resource root; `..` would escape it
fn has_parent_component(id: &str) -> bool {
    id.split(['/', '\\']).any(|part| part == "..")
}

/// Rooted paths, drive letters and `file:` URLs name files outside the root
fn is_local_absolute(id: &str) -> bool {
    let bytes = id.as_bytes();
    id.starts_with(['/', '\\'])
        || id.get(..5).is_some_and(|scheme| scheme.eq_ignore_ascii_case("file:"))
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}
