// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Image adapter: a uniform RGBA view of a raster plus codecs.
//!
//! Everything above this module works on [`PixelGrid`], a width x height
//! grid of 4-channel (R,G,B,A) bytes. The module also provides:
//!
//! - the luminance projection used by the DCT layer, together with the
//!   write-back rule that folds a luminance delta back into RGB,
//! - pixel-exact rotations by multiples of 90 degrees for the
//!   orientation search,
//! - the lossless PNG encoding that is the canonical hashing format,
//!   and the WebP snapshot encoding.

pub mod codec;
pub mod error;
pub mod grid;

pub use codec::{decode, encode_lossless, encode_lossy, snapshot};
pub use error::RasterError;
pub use grid::{PixelGrid, Rotation};

/// Minimum pixel dimension (width or height) for ingest.
/// Anything smaller cannot hold even a short embedded record.
pub const MIN_DIMENSION: u32 = 16;

/// Maximum pixel dimension (width or height) for ingest.
pub const MAX_DIMENSION: u32 = 8192;

/// Maximum total pixel count (width x height) for ingest.
pub const MAX_PIXELS: u32 = 16_000_000;

/// Validate image dimensions before any heavy processing.
///
/// # Errors
/// - [`RasterError::ImageTooSmall`] if either dimension < 16px.
/// - [`RasterError::ImageTooLarge`] if either dimension > 8192px or the
///   total pixel count exceeds 16M.
pub fn validate_dimensions(width: u32, height: u32) -> Result<(), RasterError> {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(RasterError::ImageTooSmall);
    }
    if width > MAX_DIMENSION
        || height > MAX_DIMENSION
        || width.checked_mul(height).map_or(true, |p| p > MAX_PIXELS)
    {
        return Err(RasterError::ImageTooLarge);
    }
    Ok(())
}
