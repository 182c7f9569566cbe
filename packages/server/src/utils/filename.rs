use std::path::Path;

/// Extensions accepted for uploaded images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

/// Reason an uploaded file name or type was rejected.
#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains null bytes or other control characters.
    ControlCharacter,
    /// The extension is missing or not an image type.
    NotAnImage,
    /// The declared MIME type is not an image type.
    MimeMismatch,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
            Self::NotAnImage | Self::MimeMismatch => {
                "Only image files are allowed (jpeg, jpg, png, gif, webp)"
            }
        }
    }
}

/// Returns the lowercase image extension of a client-supplied file name.
///
/// Directory components sent by some browsers are ignored.
pub fn image_extension(original_name: &str) -> Result<String, FilenameError> {
    let trimmed = original_name.trim();
    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    let flat = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    let ext = Path::new(flat)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or(FilenameError::NotAnImage)?;

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(FilenameError::NotAnImage)
    }
}

/// Checks the declared content type of a part, when the client sent one.
pub fn check_image_mime(content_type: Option<&str>) -> Result<(), FilenameError> {
    match content_type {
        None => Ok(()),
        Some(mime) => {
            let subtype = mime
                .trim()
                .to_ascii_lowercase()
                .strip_prefix("image/")
                .map(|s| s.split(';').next().unwrap_or_default().trim().to_string());
            match subtype {
                Some(s) if IMAGE_EXTENSIONS.contains(&s.as_str()) => Ok(()),
                _ => Err(FilenameError::MimeMismatch),
            }
        }
    }
}

/// Name under which an upload is stored: `{field_name}-{uuid}.{ext}`.
///
/// Only ASCII alphanumerics and `_` survive from the field name.
pub fn stored_file_name(field_name: &str, ext: &str) -> String {
    let field: String = field_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let field = if field.is_empty() { "file".into() } else { field };
    format!("{}-{}.{}", field, uuid::Uuid::new_v4(), ext)
}
