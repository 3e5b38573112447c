use std::path::Path;

use crate::error::{AppError, AppResult};

/// Write an uploaded image to the photos directory under a fresh
/// UUID-based name, keeping the original extension. Returns the stored
/// file name (not the full path).
pub fn save_photo(dir: &Path, original_name: &str, bytes: &[u8]) -> AppResult<String> {
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Empty image upload".into()));
    }

    let ext = image_extension(original_name)
        .ok_or_else(|| AppError::BadRequest("Unsupported image type".into()))?;

    let file_name = format!("{}.{}", uuid::Uuid::now_v7(), ext);
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::Internal(format!("Failed to create uploads dir: {}", e)))?;
    std::fs::write(dir.join(&file_name), bytes)
        .map_err(|e| AppError::Internal(format!("Failed to write upload: {}", e)))?;

    Ok(file_name)
}

/// Lower-cased extension of an upload, accepted only when it maps to an
/// image content type.
fn image_extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    let mime = mime_guess::from_ext(&ext).first()?;
    if mime.type_() == mime_guess::mime::IMAGE {
        Some(ext)
    } else {
        None
    }
}

/// Stored file names are flat UUID-based names; anything that could walk
/// the directory tree is rejected before touching the filesystem.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && !name.contains("..")
}
