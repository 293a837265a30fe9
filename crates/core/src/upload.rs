//! Rules for uploaded product images.

use uuid::Uuid;

use crate::error::CoreError;
use crate::types::DbId;

/// Accepted image extensions (lowercase).
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Lowercased extension of a client-supplied file name, if any.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Validate the extension and return it.
pub fn validate_image_name(file_name: &str) -> Result<String, CoreError> {
    match extension_of(file_name) {
        Some(ext) if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
        Some(ext) => Err(CoreError::Validation(format!(
            "Unsupported image format '.{ext}'. Supported: {}",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        ))),
        None => Err(CoreError::Validation(format!(
            "File '{file_name}' has no extension"
        ))),
    }
}

/// Reject empty files and files larger than `max_bytes`.
pub fn validate_size(size: usize, max_bytes: usize) -> Result<(), CoreError> {
    if size == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".to_string()));
    }
    if size > max_bytes {
        return Err(CoreError::Validation(format!(
            "Uploaded file is {size} bytes; the limit is {max_bytes}"
        )));
    }
    Ok(())
}

/// MIME type for an accepted extension.
pub fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Server-side file name: `product_<id>_<uuid>.<ext>`. Never derived from
/// client input beyond the validated extension.
pub fn stored_file_name(product_id: DbId, ext: &str) -> String {
    format!("product_{product_id}_{}.{ext}", Uuid::new_v4().simple())
}
