//! Photo intake
//!
//! Accepts a single image, rejects anything over 5 MB, and turns the bytes
//! into a `data:` URI that the card carries around in memory.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::notify::Notifications;

/// Largest accepted upload
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("photo is {size} bytes, limit is {}", MAX_PHOTO_BYTES)]
    TooLarge { size: usize },

    #[error("file is not a recognized image")]
    NotAnImage,

    #[error("failed to read photo: {0}")]
    Read(#[from] std::io::Error),
}

impl PhotoError {
    /// Surface the failure as a destructive toast
    pub fn notify(&self, notifications: &Notifications) {
        match self {
            PhotoError::TooLarge { .. } => {
                notifications.error("File too large", "Please select an image under 5MB")
            }
            PhotoError::NotAnImage => {
                notifications.error("Unsupported file", "Please select an image file")
            }
            PhotoError::Read(_) => {
                notifications.error("Upload failed", "The selected file could not be read")
            }
        }
    }
}

/// Encode raw image bytes as a data URI.
///
/// The format is always sniffed from the bytes and the bytes must decode;
/// the declared content type is only a hint. The URI carries the sniffed
/// mime type.
pub fn encode_photo(bytes: &[u8], declared_mime: Option<&str>) -> Result<String, PhotoError> {
    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(PhotoError::TooLarge { size: bytes.len() });
    }
    if bytes.is_empty() {
        return Err(PhotoError::NotAnImage);
    }

    let format = image::guess_format(bytes).map_err(|_| PhotoError::NotAnImage)?;
    image::load_from_memory_with_format(bytes, format).map_err(|_| PhotoError::NotAnImage)?;

    let mime = format.to_mime_type();
    if let Some(declared) = declared_mime.map(str::trim) {
        if !declared.eq_ignore_ascii_case(mime) {
            tracing::debug!(declared = %declared, sniffed = %mime, "Photo content type mismatch");
        }
    }

    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

/// Read a photo from disk and encode it.
/// The size check uses file metadata so oversized files are never loaded.
#[allow(dead_code)] // Used by tests
pub async fn read_photo(path: impl AsRef<Path>) -> Result<String, PhotoError> {
    let path = path.as_ref();
    let size = tokio::fs::metadata(path).await?.len() as usize;
    if size > MAX_PHOTO_BYTES {
        return Err(PhotoError::TooLarge { size });
    }

    let bytes = tokio::fs::read(path).await?;
    encode_photo(&bytes, None)
}

/// Split a base64 data URI into its mime type and decoded bytes
pub fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some((mime.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 0]));
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_encode_sniffs_png() {
        let png = tiny_png();
        let uri = encode_photo(&png, None).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let (mime, bytes) = decode_data_uri(&uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, png);
    }

    #[test]
    fn test_sniffed_format_beats_declared_mime() {
        let uri = encode_photo(&tiny_png(), Some("image/jpeg")).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_declared_image_mime_is_not_trusted() {
        assert!(matches!(
            encode_photo(b"hello world", Some("image/png")),
            Err(PhotoError::NotAnImage)
        ));
        // Right magic bytes, body does not decode
        assert!(matches!(
            encode_photo(b"GIF89a....", Some("image/gif")),
            Err(PhotoError::NotAnImage)
        ));
    }

    #[test]
    fn test_rejects_oversized() {
        let big = vec![0u8; MAX_PHOTO_BYTES + 1];
        let err = encode_photo(&big, Some("image/png")).unwrap_err();
        assert!(matches!(err, PhotoError::TooLarge { size } if size == MAX_PHOTO_BYTES + 1));

        let notes = Notifications::new();
        err.notify(&notes);
        let n = &notes.recent(1)[0];
        assert_eq!(n.title, "File too large");
        assert_eq!(n.description, "Please select an image under 5MB");
    }

    #[test]
    fn test_rejects_non_image() {
        let err = encode_photo(b"hello world", Some("text/plain")).unwrap_err();
        assert!(matches!(err, PhotoError::NotAnImage));
        assert!(matches!(encode_photo(&[], None), Err(PhotoError::NotAnImage)));
    }

    #[test]
    fn test_decode_rejects_non_base64_uri() {
        assert!(decode_data_uri("https://example.com/a.png").is_none());
        assert!(decode_data_uri("data:image/png,raw").is_none());
    }

    #[tokio::test]
    async fn test_read_photo_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.png");
        std::fs::write(&path, tiny_png()).unwrap();

        let uri = read_photo(&path).await.unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let missing = read_photo(dir.path().join("nope.png")).await;
        assert!(matches!(missing, Err(PhotoError::Read(_))));
    }
}
