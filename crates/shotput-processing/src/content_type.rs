//! Declared content-type handling

/// Extension used for re-encoded output.
pub const NORMALIZED_EXTENSION: &str = "png";

/// Strip parameters and lower-case a declared content type.
///
/// `"image/PNG; charset=binary"` becomes `"image/png"`.
pub fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Extension for a declared content type, when it is one of the web formats.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

pub fn is_image_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
}
