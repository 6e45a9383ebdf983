// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Quantization-parity embedding in mid-frequency DCT coefficients.
//!
//! Each 8x8 luminance block carries five bits, one per coefficient at
//! the fixed mid-frequency positions (1,2), (2,1), (2,2), (3,1), (1,3),
//! in that order. A bit is the parity of the coefficient's quantization
//! lattice index with step Q = 4: if the nearest index already has the
//! target parity the coefficient snaps onto it, otherwise it moves one
//! step away from zero (sign preserved) and snaps. Moving away from
//! zero keeps coefficient magnitudes above the detection floor.
//!
//! After the coefficient update, the block is inverse-transformed and
//! folded back into RGB through the luminance write-back rule; alpha is
//! never touched. Extraction re-derives the coefficients from pixels
//! and reads the parity of the nearest lattice index, which tolerates
//! up to Q/2 of coefficient drift from byte rounding, LSB rewriting,
//! and mild recompression.

use rayon::prelude::*;

use crate::dct::record::{build_record, parse_record, CriticalMetadata};
use crate::dct::transform::{forward, inverse, BLOCK};
use crate::error::ChainError;
use crate::lsb::frame::{bits_to_bytes, bytes_to_bits};
use crate::raster::PixelGrid;

/// Mid-frequency embedding positions (u, v), in bit order.
pub const EMBED_POSITIONS: [(usize, usize); 5] = [(1, 2), (2, 1), (2, 2), (3, 1), (1, 3)];

/// Quantization step.
pub const QUANT_STEP: f64 = 4.0;

/// Embeddable bits for an image of the given dimensions:
/// five per full 8x8 block, partial edge blocks skipped.
pub fn capacity_bits(width: u32, height: u32) -> usize {
    (width as usize / BLOCK) * (height as usize / BLOCK) * EMBED_POSITIONS.len()
}

/// Snap a coefficient onto the quantization lattice so its index parity
/// encodes `bit`.
fn quantize_to_parity(coeff: f64, bit: u8) -> f64 {
    let k = (coeff / QUANT_STEP).round();
    let parity = (k as i64).rem_euclid(2) as u8;
    if parity == bit {
        k * QUANT_STEP
    } else if coeff >= 0.0 {
        (k + 1.0) * QUANT_STEP
    } else {
        (k - 1.0) * QUANT_STEP
    }
}

/// Read the parity bit of a coefficient's nearest lattice index.
fn parity_bit(coeff: f64) -> u8 {
    let k = (coeff / QUANT_STEP).round() as i64;
    k.rem_euclid(2) as u8
}

/// Embed the framed metadata record into the grid's luminance blocks.
///
/// Blocks are consumed left-to-right, top-to-bottom; blocks past the end
/// of the record are left untouched.
///
/// # Errors
/// [`ChainError::CapacityExceeded`] if the framed record needs more bits
/// than the image has full blocks for. Callers that can degrade (the
/// commit path) catch this and skip the layer.
pub fn embed_record(grid: &mut PixelGrid, meta: &CriticalMetadata) -> Result<(), ChainError> {
    let framed = build_record(meta)
        .ok_or_else(|| ChainError::Internal("metadata record too large to frame".to_string()))?;
    let bits = bytes_to_bits(&framed);

    if bits.len() > capacity_bits(grid.width(), grid.height()) {
        return Err(ChainError::CapacityExceeded);
    }

    let blocks_wide = grid.width() as usize / BLOCK;
    let blocks_tall = grid.height() as usize / BLOCK;
    let mut bit_idx = 0usize;

    'blocks: for by in 0..blocks_tall {
        for bx in 0..blocks_wide {
            if bit_idx >= bits.len() {
                break 'blocks;
            }

            let x0 = (bx * BLOCK) as u32;
            let y0 = (by * BLOCK) as u32;

            // Decide lattice targets from the block's current coefficients.
            let block = read_block(grid, x0, y0);
            let coeffs = forward(&block);
            let mut targets = [None::<(usize, f64)>; 5];
            for (i, &(u, v)) in EMBED_POSITIONS.iter().enumerate() {
                if bit_idx >= bits.len() {
                    break;
                }
                let idx = u * BLOCK + v;
                targets[i] = Some((idx, quantize_to_parity(coeffs[idx], bits[bit_idx])));
                bit_idx += 1;
            }

            write_block_targets(grid, x0, y0, &targets);
        }
    }

    Ok(())
}

/// Iterations of the write-and-remeasure loop per block.
const REFINE_PASSES: usize = 6;

/// Residual (in coefficient units) below which a block is done.
const REFINE_TOLERANCE: f64 = 0.2;

fn read_block(grid: &PixelGrid, x0: u32, y0: u32) -> [f64; 64] {
    let mut block = [0.0f64; 64];
    for dy in 0..BLOCK {
        for dx in 0..BLOCK {
            block[dy * BLOCK + dx] = grid.luminance_at(x0 + dx as u32, y0 + dy as u32);
        }
    }
    block
}

/// Drive a block's embedded coefficients onto their lattice targets.
///
/// Each pass projects the remaining coefficient residual back into the
/// pixel domain and writes it through the clamping, byte-rounding
/// luminance rule, then re-measures. Rounding leaves a residual of a
/// few tenths after one pass; iterating shrinks it well below the
/// parity decision margin so the LSB rewrite that follows cannot tip
/// any coefficient over.
fn write_block_targets(grid: &mut PixelGrid, x0: u32, y0: u32, targets: &[Option<(usize, f64)>; 5]) {
    for _ in 0..REFINE_PASSES {
        let block = read_block(grid, x0, y0);
        let coeffs = forward(&block);

        let mut residual = [0.0f64; 64];
        let mut worst = 0.0f64;
        for target in targets.iter().flatten() {
            let (idx, value) = *target;
            let diff = value - coeffs[idx];
            residual[idx] = diff;
            worst = worst.max(diff.abs());
        }
        if worst <= REFINE_TOLERANCE {
            break;
        }

        // inverse() level-shifts by +128; a pure-AC residual block comes
        // back centered there.
        let delta = inverse(&residual);
        for dy in 0..BLOCK {
            for dx in 0..BLOCK {
                let d = delta[dy * BLOCK + dx] - 128.0;
                if d != 0.0 {
                    grid.apply_luminance_delta(x0 + dx as u32, y0 + dy as u32, d);
                }
            }
        }
    }
}

/// Extract a metadata record from the grid, if one is present.
///
/// Reads every block's five parity bits in block order and attempts to
/// parse the framed record. Returns `None` on any mismatch; extraction
/// never fails loudly.
pub fn extract_record(grid: &PixelGrid) -> Option<CriticalMetadata> {
    let blocks_wide = grid.width() as usize / BLOCK;
    let blocks_tall = grid.height() as usize / BLOCK;
    let total_blocks = blocks_wide * blocks_tall;
    if total_blocks == 0 {
        return None;
    }

    // Per-block parity reads are independent; run them in parallel and
    // keep block order in the collected output.
    let block_bits: Vec<[u8; 5]> = (0..total_blocks)
        .into_par_iter()
        .map(|idx| {
            let bx = idx % blocks_wide;
            let by = idx / blocks_wide;
            let x0 = (bx * BLOCK) as u32;
            let y0 = (by * BLOCK) as u32;

            let mut block = [0.0f64; 64];
            for dy in 0..BLOCK {
                for dx in 0..BLOCK {
                    block[dy * BLOCK + dx] = grid.luminance_at(x0 + dx as u32, y0 + dy as u32);
                }
            }
            let coeffs = forward(&block);

            let mut bits = [0u8; 5];
            for (i, &(u, v)) in EMBED_POSITIONS.iter().enumerate() {
                bits[i] = parity_bit(coeffs[u * BLOCK + v]);
            }
            bits
        })
        .collect();

    let bits: Vec<u8> = block_bits.into_iter().flatten().collect();
    let bytes = bits_to_bytes(&bits);
    parse_record(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    // A gradient with a little texture so channel rounding errors do not
    // line up with any single DCT basis function.
    fn gradient(w: u32, h: u32) -> PixelGrid {
        let mut g = PixelGrid::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let base = 64 + ((x + y) * 128 / (w + h)) as u32;
                let texture = (x.wrapping_mul(31).wrapping_add(y.wrapping_mul(17))) % 13;
                let v = (base + texture) as u8;
                g.set_pixel(x, y, [v, v.saturating_add(7), v.saturating_sub(13), 255]);
            }
        }
        g
    }

    fn sample_meta() -> CriticalMetadata {
        CriticalMetadata::new("1a".repeat(32), 2, &"2b".repeat(32))
    }

    #[test]
    fn quantize_parity_roundtrip() {
        for bit in 0..=1u8 {
            for coeff in [-37.2, -4.0, -1.1, 0.0, 0.4, 3.9, 8.0, 55.5] {
                let q = quantize_to_parity(coeff, bit);
                assert_eq!(parity_bit(q), bit, "coeff {coeff}, bit {bit} -> {q}");
                // Snapped exactly onto the lattice.
                assert!((q / QUANT_STEP - (q / QUANT_STEP).round()).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn mismatch_moves_away_from_zero() {
        // 8.0 has lattice index 2 (even). Requesting bit 1 must move to
        // index 3, not index 1.
        assert_eq!(quantize_to_parity(8.0, 1), 12.0);
        assert_eq!(quantize_to_parity(-8.0, 1), -12.0);
        // Matching parity snaps in place.
        assert_eq!(quantize_to_parity(8.0, 0), 8.0);
    }

    #[test]
    fn parity_tolerates_half_step_noise() {
        for bit in 0..=1u8 {
            let q = quantize_to_parity(20.0, bit);
            for noise in [-1.9, -0.5, 0.0, 0.7, 1.9] {
                assert_eq!(parity_bit(q + noise), bit, "noise {noise}");
            }
        }
    }

    #[test]
    fn capacity_counts_full_blocks_only() {
        assert_eq!(capacity_bits(64, 64), 8 * 8 * 5);
        // Partial edge blocks are skipped.
        assert_eq!(capacity_bits(71, 64), 8 * 8 * 5);
        assert_eq!(capacity_bits(7, 7), 0);
    }

    #[test]
    fn record_roundtrip_through_pixels() {
        let mut grid = gradient(256, 256);
        let meta = sample_meta();
        embed_record(&mut grid, &meta).unwrap();
        let extracted = extract_record(&grid).unwrap();
        assert_eq!(extracted, meta);
    }

    #[test]
    fn embedding_distortion_is_small() {
        let original = gradient(256, 256);
        let mut embedded = original.clone();
        embed_record(&mut embedded, &sample_meta()).unwrap();

        let mut sq_sum = 0.0f64;
        for (a, b) in original.data().iter().zip(embedded.data().iter()) {
            let d = *a as f64 - *b as f64;
            sq_sum += d * d;
        }
        let mse = sq_sum / original.data().len() as f64;
        assert!(mse < 15.0, "embedding MSE too high: {mse}");
    }

    #[test]
    fn too_small_image_rejected() {
        // 64x64 has 64 blocks = 320 bits, far below the record size.
        let mut grid = gradient(64, 64);
        let err = embed_record(&mut grid, &sample_meta());
        assert!(matches!(err, Err(ChainError::CapacityExceeded)));
    }

    #[test]
    fn unmarked_image_extracts_none() {
        assert!(extract_record(&gradient(256, 256)).is_none());
    }

    #[test]
    fn record_survives_small_pixel_noise() {
        let mut grid = gradient(256, 256);
        let meta = sample_meta();
        embed_record(&mut grid, &meta).unwrap();

        // Scatter sub-pixel luminance nudges over ~3% of pixels. Each 8x8
        // block sees at most one hit per row (7 is invertible mod 29), so
        // any coefficient drifts by at most 8 hits * ~0.6 * 0.25 peak
        // basis weight = ~1.2, inside the half-step parity margin of 2.
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if (x * 7 + y * 13) % 29 == 0 {
                    let sign = if (x + y) % 2 == 0 { 1.0 } else { -1.0 };
                    grid.apply_luminance_delta(x, y, 0.6 * sign);
                }
            }
        }
        assert_eq!(extract_record(&grid).unwrap(), meta);
    }

    #[test]
    fn alpha_channel_untouched() {
        let mut grid = gradient(256, 256);
        embed_record(&mut grid, &sample_meta()).unwrap();
        for px in grid.data().chunks_exact(4) {
            assert_eq!(px[3], 255);
        }
    }
}
