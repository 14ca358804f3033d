//! Image intake rules for the designer.

/// Largest artwork file accepted (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Why an uploaded file was turned away. The messages are shown to the
/// shopper as-is.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("Please upload a valid image file")]
    NotAnImage,
    #[error("File size must be less than {}MB", .limit / (1024 * 1024))]
    TooLarge { limit: u64 },
    #[error("Please choose a file to upload")]
    Empty,
}

/// Check a file's declared type and size before it is accepted.
///
/// Only `image/*` media types pass. A file of exactly `limit` bytes is
/// accepted.
///
/// # Errors
///
/// Returns the first [`UploadRejection`] that applies.
pub fn check_image_upload(
    content_type: Option<&str>,
    size: u64,
    limit: u64,
) -> Result<(), UploadRejection> {
    let is_image = content_type
        .map(|ct| ct.trim().to_ascii_lowercase())
        .is_some_and(|ct| ct.starts_with("image/"));
    if !is_image {
        return Err(UploadRejection::NotAnImage);
    }
    if size == 0 {
        return Err(UploadRejection::Empty);
    }
    if size > limit {
        return Err(UploadRejection::TooLarge { limit });
    }
    Ok(())
}
