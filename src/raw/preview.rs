//! Preview generation for the image viewer
//! Decodes the file directly when possible, otherwise falls back to the
//! largest JPEG embedded in it (how RAW files carry their previews)

use iced::widget::image::Handle;
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use std::fs;
use std::path::{Path, PathBuf};

/// Longest edge of a preview, in pixels
const PREVIEW_MAX: u32 = 2048;

/// A decoded preview ready for display
#[derive(Debug, Clone)]
pub struct Preview {
    pub handle: Handle,
    /// Size of the source image before downscaling
    pub width: u32,
    pub height: u32,
    /// True when the preview came from an embedded JPEG
    pub embedded: bool,
}

/// Load a preview for `path` on the blocking pool
pub async fn load_preview(path: PathBuf) -> Result<Preview, String> {
    // Spawn blocking because decoding is CPU-intensive
    tokio::task::spawn_blocking(move || load_preview_blocking(&path))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
}

/// Blocking version of preview loading
fn load_preview_blocking(path: &Path) -> Result<Preview, String> {
    if !path.is_file() {
        return Err(format!("Not a file: {}", path.display()));
    }

    let buffer =
        fs::read(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    if let Ok(img) = image::load_from_memory(&buffer) {
        return Ok(to_preview(img, false));
    }

    // Fallback: scan for JPEG markers
    let jpeg = scan_for_largest_jpeg(&buffer).ok_or_else(|| {
        format!(
            "No displayable image in: {:?}",
            path.file_name().unwrap_or_default()
        )
    })?;

    tracing::debug!(
        "🔍 Found {:.1}MB JPEG via marker scan in {}",
        jpeg.len() as f64 / 1024.0 / 1024.0,
        path.display()
    );

    let img = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)
        .map_err(|e| format!("Failed to decode embedded JPEG: {}", e))?;

    Ok(to_preview(img, true))
}

/// Downscale if needed and hand the pixels to iced
fn to_preview(img: DynamicImage, embedded: bool) -> Preview {
    let (width, height) = (img.width(), img.height());

    let img = if width > PREVIEW_MAX || height > PREVIEW_MAX {
        img.resize(PREVIEW_MAX, PREVIEW_MAX, FilterType::Triangle)
    } else {
        img
    };

    let rgba = img.to_rgba8();
    let handle = Handle::from_rgba(rgba.width(), rgba.height(), rgba.into_raw());

    Preview {
        handle,
        width,
        height,
        embedded,
    }
}

/// Scan a buffer for JPEG markers and return the largest JPEG found
fn scan_for_largest_jpeg(buffer: &[u8]) -> Option<Vec<u8>> {
    let jpeg_start: [u8; 3] = [0xFF, 0xD8, 0xFF]; // JPEG Start Of Image (SOI)
    let jpeg_end: [u8; 2] = [0xFF, 0xD9]; // JPEG End Of Image (EOI)

    let mut largest: Option<&[u8]> = None;

    let mut pos = 0;
    while pos + jpeg_start.len() <= buffer.len() {
        if !buffer[pos..].starts_with(&jpeg_start) {
            pos += 1;
            continue;
        }

        // Find the corresponding EOI
        let Some(end) = buffer[pos..]
            .windows(2)
            .position(|w| w == jpeg_end)
            .map(|p| pos + p + 2)
        else {
            break;
        };

        let candidate = &buffer[pos..end];
        if largest.map_or(true, |best| candidate.len() > best.len()) {
            largest = Some(candidate);
        }
        pos = end;
    }

    largest.map(<[u8]>::to_vec)
}
