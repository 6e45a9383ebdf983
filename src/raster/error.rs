// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for raster decoding, encoding, and grid handling.

use core::fmt;

/// Errors from the image adapter.
#[derive(Debug)]
pub enum RasterError {
    /// The input bytes could not be decoded as a supported image format.
    Decode(image::ImageError),
    /// The grid could not be encoded to the requested format.
    Encode(image::ImageError),
    /// The image is smaller than the minimum ingest dimensions.
    ImageTooSmall,
    /// The image dimensions exceed the maximum allowed (8192px / 16MP).
    ImageTooLarge,
    /// The requested lossy codec is not supported.
    UnsupportedCodec(String),
    /// A raw buffer does not match width * height * 4 bytes.
    BufferSize { expected: usize, actual: usize },
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "image decode failed: {e}"),
            Self::Encode(e) => write!(f, "image encode failed: {e}"),
            Self::ImageTooSmall => write!(f, "image too small (min 16px per side)"),
            Self::ImageTooLarge => write!(f, "image too large (max 8192px / 16MP)"),
            Self::UnsupportedCodec(codec) => write!(f, "unsupported lossy codec: {codec}"),
            Self::BufferSize { expected, actual } => {
                write!(f, "pixel buffer is {actual} bytes, expected {expected}")
            }
        }
    }
}

impl std::error::Error for RasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) | Self::Encode(e) => Some(e),
            _ => None,
        }
    }
}
