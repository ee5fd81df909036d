//! Card export
//!
//! Rasterizes the current preview, encodes it as PNG or JPG and hands the
//! bytes to a download target. Also produces the quick share link shown next
//! to the export buttons.
//!
//! Rasterizing is CPU work, so `export_card` moves it onto the blocking pool.

mod font;
pub mod link;
mod raster;

pub use link::{
    copy_link, generate_link, Clipboard, DisabledClipboard, SystemClipboard,
    DEFAULT_QUICK_LINK_BASE, QUICK_LINK_COPIED, SHARE_LINK_COPIED,
};
pub use raster::{card_height, rasterize, CARD_WIDTH, MAX_SCALE};

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notify::Notifications;
use crate::render::CardView;

/// Default pixel density for exports
pub const DEFAULT_SCALE: u32 = 2;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export scale {0} is out of range")]
    Scale(u32),

    #[error("card photo could not be decoded")]
    Photo,

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("export task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    #[serde(alias = "jpeg")]
    Jpg,
}

impl ImageFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpg),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
        }
    }

    /// Fixed download name
    pub fn file_name(&self) -> String {
        format!("social-card.{}", self.extension())
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ExportedImage {
    pub fn file_name(&self) -> String {
        self.format.file_name()
    }
}

/// Composite onto opaque white
fn flatten_on_white(image: &RgbaImage) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let a = pixel[3] as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a)) / 255) as u8;
        *pixel = Rgba([blend(pixel[0]), blend(pixel[1]), blend(pixel[2]), 255]);
    }
    out
}

/// Encode a rasterized card
pub fn encode(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, ExportError> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        ImageFormat::Png => {
            DynamicImage::ImageRgba8(image.clone()).write_to(&mut buf, image::ImageFormat::Png)?;
        }
        ImageFormat::Jpg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(flatten_on_white(image)).to_rgb8();
            DynamicImage::ImageRgb8(rgb).write_to(&mut buf, image::ImageFormat::Jpeg)?;
        }
    }
    Ok(buf.into_inner())
}

/// Rasterize and encode on the blocking pool
pub async fn export_card(
    view: CardView,
    format: ImageFormat,
    scale: u32,
) -> Result<ExportedImage, ExportError> {
    tokio::task::spawn_blocking(move || {
        let image = rasterize(&view, scale)?;
        let bytes = encode(&image, format)?;
        Ok(ExportedImage {
            format,
            bytes,
            width: image.width(),
            height: image.height(),
        })
    })
    .await
    .map_err(|e| ExportError::Task(e.to_string()))?
}

/// Export and surface the outcome as a notification.
/// Failures are logged and reported, never returned.
pub async fn export_with_notice(
    view: CardView,
    format: ImageFormat,
    scale: u32,
    notifications: &Notifications,
) -> Option<ExportedImage> {
    match export_card(view, format, scale).await {
        Ok(image) => {
            tracing::info!(
                format = %format,
                width = image.width,
                height = image.height,
                bytes = image.bytes.len(),
                "Card exported"
            );
            notifications.success(
                "Download started",
                format!("Your social card is being downloaded as {}", format),
            );
            Some(image)
        }
        Err(e) => {
            tracing::error!(format = %format, error = %e, "Card export failed");
            notifications.error(
                "Download failed",
                "There was an error generating your social card",
            );
            None
        }
    }
}

/// Writes exports into a download directory
#[derive(Debug, Clone)]
pub struct Downloads {
    dir: PathBuf,
}

impl Downloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save as `social-card.<ext>`, replacing any previous export
    pub async fn save(&self, image: &ExportedImage) -> Result<PathBuf, ExportError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(image.file_name());
        tokio::fs::write(&path, &image.bytes).await?;
        tracing::debug!(path = %path.display(), "Export saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{SocialCardData, TemplateId};
    use crate::render::render;

    fn view() -> CardView {
        render(
            &SocialCardData {
                name: "Jane Doe".into(),
                email: "jane@example.com".into(),
                ..Default::default()
            },
            TemplateId::Classic,
        )
    }

    #[test]
    fn test_format_parse_and_names() {
        assert_eq!(ImageFormat::parse("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::parse("jpeg"), Some(ImageFormat::Jpg));
        assert_eq!(ImageFormat::parse("gif"), None);
        assert_eq!(ImageFormat::Jpg.file_name(), "social-card.jpg");
        assert_eq!(ImageFormat::Png.mime(), "image/png");
        assert_eq!(ImageFormat::Jpg.to_string(), "JPG");
    }

    #[test]
    fn test_png_keeps_alpha() {
        let raster = rasterize(&view(), 1).unwrap();
        let bytes = encode(&raster, ImageFormat::Png).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), raster.dimensions());
        assert_eq!(decoded.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_jpg_is_flattened_on_white() {
        let raster = rasterize(&view(), 1).unwrap();
        let flat = flatten_on_white(&raster);
        assert_eq!(flat.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert!(flat.pixels().all(|p| p[3] == 255));

        let bytes = encode(&raster, ImageFormat::Jpg).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), CARD_WIDTH);
    }

    #[tokio::test]
    async fn test_export_with_notice_success_and_save() {
        let notes = Notifications::new();
        let image = export_with_notice(view(), ImageFormat::Png, DEFAULT_SCALE, &notes)
            .await
            .unwrap();
        assert_eq!(image.width, CARD_WIDTH * DEFAULT_SCALE);

        let n = &notes.recent(1)[0];
        assert_eq!(n.title, "Download started");
        assert_eq!(n.description, "Your social card is being downloaded as PNG");

        let dir = tempfile::tempdir().unwrap();
        let path = Downloads::new(dir.path()).save(&image).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "social-card.png");
        assert_eq!(std::fs::read(&path).unwrap(), image.bytes);
    }

    #[tokio::test]
    async fn test_export_failure_is_reported_not_raised() {
        let notes = Notifications::new();
        let out = export_with_notice(view(), ImageFormat::Png, 0, &notes).await;
        assert!(out.is_none());

        let n = &notes.recent(1)[0];
        assert_eq!(n.title, "Download failed");
        assert!(n.is_destructive());
    }
}
