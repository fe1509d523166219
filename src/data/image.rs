//! Image preprocessing for pattern recognition.
//!
//! These functions decode image bytes (PNG/JPEG/BMP/GIF), resize them to the
//! specified dimensions, and normalize pixel values to the [0, 1] range ready
//! for network input.
//!
//! Images are scaled, not cropped, and flattened row by row. Loaders that crop
//! to the target size or lay pixels out column by column produce different
//! vectors, so models trained on their output are not interchangeable with
//! models trained here.

use std::path::Path;

use crate::error::Result;

/// Decodes image bytes, resizes to `width × height`, converts to grayscale,
/// and normalizes pixels to [0, 1].
///
/// Returns a flat row-major `Vec<f64>` of length `width * height`.
pub fn image_bytes_to_grayscale_input(bytes: &[u8], width: u32, height: u32) -> Result<Vec<f64>> {
    let img = ::image::load_from_memory(bytes)?;
    Ok(to_grayscale_input(img, width, height))
}

/// Same as [`image_bytes_to_grayscale_input`] for a file on disk.
pub fn load_grayscale(path: impl AsRef<Path>, width: u32, height: u32) -> Result<Vec<f64>> {
    let img = ::image::open(path)?;
    Ok(to_grayscale_input(img, width, height))
}

fn to_grayscale_input(img: ::image::DynamicImage, width: u32, height: u32) -> Vec<f64> {
    let resized = if img.width() == width && img.height() == height {
        img
    } else {
        img.resize_exact(width, height, ::image::imageops::FilterType::Lanczos3)
    };
    let gray = resized.to_luma8();
    gray.pixels().map(|p| p.0[0] as f64 / 255.0).collect()
}
