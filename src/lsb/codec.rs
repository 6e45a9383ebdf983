// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Writing and reading the payload bit stream in pixel LSBs.
//!
//! Carrier selection walks the RGBA bytes in raster order and skips
//! every fourth byte (alpha), so each pixel contributes three carrier
//! bits. The payload pipeline is:
//!
//! ```text
//! ChainedPayload -> canonical JSON -> DEFLATE -> frame -> 3x replicate
//!   -> bits (MSB first) -> carrier LSBs
//! ```
//!
//! When a carrier byte's LSB must flip, the channel can move up or down
//! one level; the writer picks, per pixel, the combination of directions
//! with the smallest net luminance shift. That keeps the spatial write
//! from disturbing the frequency-domain layer embedded just before it.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::chain::canonical::canonical_bytes;
use crate::chain::model::ChainedPayload;
use crate::error::ChainError;
use crate::lsb::ecc::{majority_decode, replicate};
use crate::lsb::frame::{build_frame, bytes_to_bits, scan_frame};
use crate::raster::grid::{LUMA_B, LUMA_G, LUMA_R};
use crate::raster::PixelGrid;

/// Decompression bound. Payloads are tens of kilobytes; anything past
/// this is a decompression bomb, not a chain.
const MAX_PAYLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Carrier capacity in bits: one per non-alpha byte.
pub fn capacity_bits(grid: &PixelGrid) -> usize {
    grid.pixel_count() * 3
}

/// Result of an LSB extraction attempt.
#[derive(Debug, Clone)]
pub struct LsbExtraction {
    /// The recovered payload, when the frame parsed cleanly.
    pub payload: Option<ChainedPayload>,
    /// Whether a payload was recovered at all.
    pub recovered: bool,
    /// Frame missing, checksum trouble, or replica disagreement.
    pub corruption_detected: bool,
    /// Fraction of frame byte groups whose replicas disagreed.
    /// Absent when no frame was located.
    pub error_rate: Option<f64>,
}

/// DEFLATE-compress the canonical JSON of a payload.
fn compress_payload(payload: &ChainedPayload) -> Result<Vec<u8>, ChainError> {
    let json = canonical_bytes(&payload.for_embedding())?;
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| ChainError::Internal(format!("deflate failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| ChainError::Internal(format!("deflate failed: {e}")))
}

/// Inverse of [`compress_payload`], with a size bound.
fn decompress_payload(compressed: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    let decoder = DeflateDecoder::new(compressed);
    decoder
        .take(MAX_PAYLOAD_BYTES as u64 + 1)
        .read_to_end(&mut out)
        .ok()?;
    if out.len() > MAX_PAYLOAD_BYTES {
        return None;
    }
    Some(out)
}

/// Embed the payload into the grid's carrier LSBs.
///
/// The transient `dct_metadata` field is never serialized into this
/// layer. Carrier bytes past the end of the replicated frame keep their
/// original LSBs.
///
/// # Errors
/// [`ChainError::CapacityExceeded`] if the replicated frame does not fit.
pub fn embed_payload(grid: &mut PixelGrid, payload: &ChainedPayload) -> Result<(), ChainError> {
    let compressed = compress_payload(payload)?;
    let framed = build_frame(&compressed);
    let replicated = replicate(&framed);
    let bits = bytes_to_bits(&replicated);

    if bits.len() > capacity_bits(grid) {
        return Err(ChainError::CapacityExceeded);
    }

    let mut bit_idx = 0usize;
    for px in grid.data_mut().chunks_exact_mut(4) {
        if bit_idx >= bits.len() {
            break;
        }

        // Collect the target bit for each of this pixel's three carriers.
        let mut targets = [None::<u8>; 3];
        for target in targets.iter_mut() {
            if bit_idx < bits.len() {
                *target = Some(bits[bit_idx]);
                bit_idx += 1;
            }
        }

        write_pixel_bits(px, targets);
    }

    Ok(())
}

/// Write up to three LSBs into one pixel, choosing step directions that
/// minimize the pixel's net luminance shift.
fn write_pixel_bits(px: &mut [u8], targets: [Option<u8>; 3]) {
    const WEIGHTS: [f64; 3] = [LUMA_R, LUMA_G, LUMA_B];

    // Valid step options per channel: 0 when the LSB already matches,
    // otherwise +1 / -1 within byte range.
    let mut options: [Vec<i16>; 3] = [vec![0], vec![0], vec![0]];
    for c in 0..3 {
        if let Some(bit) = targets[c] {
            if px[c] & 1 != bit {
                let mut opts = Vec::with_capacity(2);
                if px[c] < 255 {
                    opts.push(1i16);
                }
                if px[c] > 0 {
                    opts.push(-1i16);
                }
                options[c] = opts;
            }
        }
    }

    // At most eight combinations; pick the one with the smallest
    // absolute luminance change.
    let mut best: Option<([i16; 3], f64)> = None;
    for &dr in &options[0] {
        for &dg in &options[1] {
            for &db in &options[2] {
                let shift = (WEIGHTS[0] * dr as f64
                    + WEIGHTS[1] * dg as f64
                    + WEIGHTS[2] * db as f64)
                    .abs();
                if best.map_or(true, |(_, s)| shift < s) {
                    best = Some(([dr, dg, db], shift));
                }
            }
        }
    }

    let (deltas, _) = best.expect("at least one combination exists");
    for c in 0..3 {
        px[c] = (px[c] as i16 + deltas[c]) as u8;
    }
}

/// Extract a payload from the grid's carrier LSBs.
///
/// Never fails loudly: a missing or unrecoverable frame is reported
/// through the result flags.
pub fn extract_payload(grid: &PixelGrid) -> LsbExtraction {
    // Read the whole LSB plane.
    let bits: Vec<u8> = grid
        .data()
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 4 != 3)
        .map(|(_, &b)| b & 1)
        .collect();
    let raw = crate::lsb::frame::bits_to_bytes(&bits);

    let (decoded, mismatched) = majority_decode(&raw);

    let Some(hit) = scan_frame(&decoded) else {
        return LsbExtraction {
            payload: None,
            recovered: false,
            corruption_detected: true,
            error_rate: None,
        };
    };

    // Error rate over the groups the frame actually occupies; the tail
    // of the carrier plane is image noise, not replicas.
    let frame_groups = &mismatched[hit.offset..hit.offset + hit.total_len];
    let bad = frame_groups.iter().filter(|&&m| m).count();
    let error_rate = bad as f64 / frame_groups.len().max(1) as f64;

    let payload = decompress_payload(&hit.compressed)
        .and_then(|json| serde_json::from_slice::<ChainedPayload>(&json).ok());

    let recovered = payload.is_some();
    LsbExtraction {
        payload,
        recovered,
        corruption_detected: !recovered || bad > 0,
        error_rate: Some(error_rate),
    }
}
