// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Raster codecs: container decode, the canonical lossless encoding,
//! lossy encodes, and snapshot rendering.
//!
//! The lossless PNG encoding is the canonical pre-embedding hashing
//! format: two runs over the same grid produce identical bytes, so the
//! sha256 stored in a history entry is reproducible. Snapshots are
//! downscaled previews encoded as WebP and carried base64-encoded inside
//! the payload JSON.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{imageops, ExtendedColorType, ImageEncoder, RgbaImage};

use crate::chain::Snapshot;
use crate::raster::error::RasterError;
use crate::raster::grid::PixelGrid;
use crate::raster::validate_dimensions;

/// Default snapshot width in pixels.
pub const SNAPSHOT_WIDTH: u32 = 160;

/// Default snapshot quality. The WebP encoder in use is lossless, so the
/// value is accepted for interface compatibility and otherwise unused;
/// the `jpeg` codec maps it onto its 0-100 quality scale.
pub const SNAPSHOT_QUALITY: f32 = 0.8;

/// Decode raw container bytes (PNG, JPEG, WebP, ...) into a pixel grid.
///
/// # Errors
/// - [`RasterError::Decode`] if the bytes are not a supported image.
/// - [`RasterError::ImageTooSmall`] / [`RasterError::ImageTooLarge`] if
///   the decoded dimensions are out of bounds.
pub fn decode(bytes: &[u8]) -> Result<PixelGrid, RasterError> {
    let img = image::load_from_memory(bytes).map_err(RasterError::Decode)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    validate_dimensions(width, height)?;
    PixelGrid::from_rgba(width, height, rgba.into_raw())
}

/// Encode a grid to the canonical lossless format (PNG, RGBA8).
///
/// This is the stable bitmap used for hashing: the chain id and every
/// entry's sha256 are computed over these bytes.
pub fn encode_lossless(grid: &PixelGrid) -> Result<Vec<u8>, RasterError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            grid.data(),
            grid.width(),
            grid.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(RasterError::Encode)?;
    Ok(out)
}

/// Encode a grid with a lossy(ish) codec for preview purposes.
///
/// Supported codecs: `"webp"` (lossless WebP; `quality` accepted but
/// unused) and `"jpeg"` (`quality` in [0, 1] mapped to 0-100).
pub fn encode_lossy(grid: &PixelGrid, quality: f32, codec: &str) -> Result<Vec<u8>, RasterError> {
    let mut out = Vec::new();
    match codec {
        "webp" => {
            WebPEncoder::new_lossless(&mut out)
                .write_image(
                    grid.data(),
                    grid.width(),
                    grid.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(RasterError::Encode)?;
        }
        "jpeg" => {
            // JPEG has no alpha channel; drop it.
            let rgb: Vec<u8> = grid
                .data()
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            let q = (quality.clamp(0.0, 1.0) * 100.0).round() as u8;
            JpegEncoder::new_with_quality(&mut out, q.max(1))
                .write_image(&rgb, grid.width(), grid.height(), ExtendedColorType::Rgb8)
                .map_err(RasterError::Encode)?;
        }
        other => return Err(RasterError::UnsupportedCodec(other.to_string())),
    }
    Ok(out)
}

/// Render a snapshot of the grid: downscale to `SNAPSHOT_WIDTH`, encode
/// as WebP, base64 the bytes.
///
/// Grids narrower than the target width are kept at their native size.
pub fn snapshot(grid: &PixelGrid, quality: f32) -> Result<Snapshot, RasterError> {
    let (sw, sh) = if grid.width() <= SNAPSHOT_WIDTH {
        (grid.width(), grid.height())
    } else {
        let sh = (grid.height() as u64 * SNAPSHOT_WIDTH as u64 / grid.width() as u64).max(1);
        (SNAPSHOT_WIDTH, sh as u32)
    };

    let scaled = if (sw, sh) == (grid.width(), grid.height()) {
        grid.clone()
    } else {
        let buffer = RgbaImage::from_raw(grid.width(), grid.height(), grid.data().to_vec())
            .expect("grid buffer matches its dimensions");
        let resized = imageops::resize(&buffer, sw, sh, imageops::FilterType::Triangle);
        PixelGrid::from_rgba(sw, sh, resized.into_raw())?
    };

    let bytes = encode_lossy(&scaled, quality, "webp")?;
    Ok(Snapshot {
        width: sw,
        height: sh,
        codec: "webp".to_string(),
        bytes: BASE64.encode(bytes),
    })
}
