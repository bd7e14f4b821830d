use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::buffer::PixelBuffer;
use crate::foundation::core::CHANNELS;
use crate::foundation::error::{TilecastError, TilecastResult};

/// Convert linear float samples into an opaque RGBA8 image.
///
/// Each color channel is clamped to `[0, 1]` and scaled to `0..=255` with rounding; NaN maps to
/// `0`. The stored fourth channel is ignored and alpha is always `255`.
pub fn assemble_image(buffer: &PixelBuffer) -> TilecastResult<RgbaImage> {
    let g = buffer.geometry();
    let mut data = Vec::with_capacity(g.pixel_count() * CHANNELS);
    for px in buffer.samples().chunks_exact(CHANNELS) {
        data.extend_from_slice(&[to_u8(px[0]), to_u8(px[1]), to_u8(px[2]), u8::MAX]);
    }
    RgbaImage::from_raw(g.width, g.height, data).ok_or_else(|| {
        TilecastError::validation("pixel buffer length does not match its geometry")
    })
}

/// Assemble `buffer` and write it to `path`.
///
/// The encoding follows the file extension; unknown or missing extensions are written as PNG.
/// Formats without an alpha channel receive the RGB planes only.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn write_image(buffer: &PixelBuffer, path: impl AsRef<Path>) -> TilecastResult<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;

    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
    let img = DynamicImage::ImageRgba8(assemble_image(buffer)?);
    let img = match format {
        ImageFormat::Jpeg | ImageFormat::Pnm => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };

    let mut out = BufWriter::new(File::create(path)?);
    img.write_to(&mut out, format)?;
    out.flush()?;

    tracing::info!(
        width = buffer.geometry().width,
        height = buffer.geometry().height,
        ?format,
        "image written"
    );
    Ok(())
}

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> TilecastResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn to_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/assemble/image_out.rs"]
mod tests;
