// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! 8x8 DCT-II and its inverse for luminance blocks.
//!
//! The transform pair is the JPEG-style orthogonal one:
//!
//! ```text
//! F(u,v) = 1/4 C(u) C(v) sum f(x,y) cos((2x+1)u pi/16) cos((2y+1)v pi/16)
//! f(x,y) = 1/4 sum C(u) C(v) F(u,v) cos(...) cos(...)
//! ```
//!
//! with C(0) = 1/sqrt(2) and C(u>0) = 1. Both directions are separable
//! row/column passes over a precomputed cosine table.

use std::sync::OnceLock;

/// Block edge length.
pub const BLOCK: usize = 8;

/// Pre-computed 8x8 cosine table.
/// `COSINE[u][x] = cos((2*x + 1) * u * PI / 16)`
static COSINE: OnceLock<[[f64; BLOCK]; BLOCK]> = OnceLock::new();

/// Normalization constants: C(0) = 1/sqrt(2), C(u>0) = 1.
static NORM: OnceLock<[f64; BLOCK]> = OnceLock::new();

fn cosine_table() -> &'static [[f64; BLOCK]; BLOCK] {
    COSINE.get_or_init(|| {
        let mut table = [[0.0f64; BLOCK]; BLOCK];
        for u in 0..BLOCK {
            for x in 0..BLOCK {
                table[u][x] =
                    ((2 * x + 1) as f64 * u as f64 * std::f64::consts::PI / 16.0).cos();
            }
        }
        table
    })
}

fn norm_table() -> &'static [f64; BLOCK] {
    NORM.get_or_init(|| {
        let mut n = [1.0f64; BLOCK];
        n[0] = std::f64::consts::FRAC_1_SQRT_2;
        n
    })
}

/// Forward 8x8 DCT-II of one luminance block (row-major, values ~0-255).
///
/// Output is in natural order: `coeffs[u * 8 + v]` with `u` the vertical
/// and `v` the horizontal frequency.
pub fn forward(block: &[f64; 64]) -> [f64; 64] {
    let cos = cosine_table();
    let c = norm_table();

    // Level shift: subtract 128 (affects the DC coefficient only).
    let mut shifted = [0.0f64; 64];
    for i in 0..64 {
        shifted[i] = block[i] - 128.0;
    }

    // Step 1: transform rows (horizontal frequencies).
    let mut temp = [0.0f64; 64];
    for y in 0..BLOCK {
        for v in 0..BLOCK {
            let mut sum = 0.0;
            for x in 0..BLOCK {
                sum += shifted[y * BLOCK + x] * cos[v][x];
            }
            temp[y * BLOCK + v] = sum;
        }
    }

    // Step 2: transform columns (vertical frequencies) and scale.
    let mut coeffs = [0.0f64; 64];
    for v in 0..BLOCK {
        for u in 0..BLOCK {
            let mut sum = 0.0;
            for y in 0..BLOCK {
                sum += temp[y * BLOCK + v] * cos[u][y];
            }
            coeffs[u * BLOCK + v] = 0.25 * c[u] * c[v] * sum;
        }
    }

    coeffs
}

/// Inverse 8x8 DCT of one coefficient block back to pixel values.
///
/// Output values are level-shifted back by +128 but not clamped; the
/// caller clamps to [0, 255] when writing into a grid.
pub fn inverse(coeffs: &[f64; 64]) -> [f64; 64] {
    let cos = cosine_table();
    let c = norm_table();

    // Step 1: inverse transform over vertical frequencies.
    let mut temp = [0.0f64; 64];
    for v in 0..BLOCK {
        for y in 0..BLOCK {
            let mut sum = 0.0;
            for u in 0..BLOCK {
                sum += c[u] * coeffs[u * BLOCK + v] * cos[u][y];
            }
            temp[y * BLOCK + v] = sum;
        }
    }

    // Step 2: inverse transform over horizontal frequencies.
    let mut pixels = [0.0f64; 64];
    for y in 0..BLOCK {
        for x in 0..BLOCK {
            let mut sum = 0.0;
            for v in 0..BLOCK {
                sum += c[v] * temp[y * BLOCK + v] * cos[v][x];
            }
            pixels[y * BLOCK + x] = 0.25 * sum + 128.0;
        }
    }

    pixels
}
