// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Extraction under damage: lossy recompression, bit flips, rotation,
//! and capacity boundaries.

use imagechain_core::dct::transform::{forward, inverse, BLOCK};
use imagechain_core::{
    extract_with_details, extract_with_rotations, ChainError, ChainSession, EditOp, FilterKind,
    PixelGrid, Rotation, SigScheme,
};

fn gradient(w: u32, h: u32) -> PixelGrid {
    let mut g = PixelGrid::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let v = (64 + ((x + y) * 128 / (w + h)) as u32) as u8;
            g.set_pixel(x, y, [v, v, v, 255]);
        }
    }
    g
}

/// Commit v1 (empty) and v2 (brightness + sepia) on one canvas; returns
/// the session and the v2 output image.
fn two_version_chain(canvas: &PixelGrid) -> (ChainSession, PixelGrid) {
    let mut session = ChainSession::new();
    session.configure("Studio", SigScheme::EcdsaP256Sha256);
    session.ingest(canvas).unwrap();
    let v1 = session.commit(canvas, vec![]).unwrap();
    let v2 = session
        .commit(
            &v1.image,
            vec![
                EditOp::Brightness { delta: 1.3 },
                EditOp::Filter {
                    kind: FilterKind::Sepia,
                },
            ],
        )
        .unwrap();
    (session, v2.image)
}

/// A JPEG-equivalent lossy pass over the luminance plane: per 8x8 block,
/// forward DCT, quantize every coefficient against a quality table, and
/// reconstruct. Low frequencies get a step of 4 (matching the embedding
/// lattice), higher frequencies a step of 10, which scrambles the pixel
/// LSBs thoroughly while the parity layer rides through.
fn lossy_recompress(grid: &PixelGrid) -> PixelGrid {
    let mut out = grid.clone();
    let blocks_wide = grid.width() as usize / BLOCK;
    let blocks_tall = grid.height() as usize / BLOCK;

    for by in 0..blocks_tall {
        for bx in 0..blocks_wide {
            let x0 = (bx * BLOCK) as u32;
            let y0 = (by * BLOCK) as u32;

            let mut block = [0.0f64; 64];
            for dy in 0..BLOCK {
                for dx in 0..BLOCK {
                    block[dy * BLOCK + dx] = out.luminance_at(x0 + dx as u32, y0 + dy as u32);
                }
            }

            let mut coeffs = forward(&block);
            for u in 0..BLOCK {
                for v in 0..BLOCK {
                    let step = if u + v <= 4 { 4.0 } else { 10.0 };
                    let idx = u * BLOCK + v;
                    coeffs[idx] = (coeffs[idx] / step).round() * step;
                }
            }

            let rebuilt = inverse(&coeffs);
            for dy in 0..BLOCK {
                for dx in 0..BLOCK {
                    let delta = rebuilt[dy * BLOCK + dx] - block[dy * BLOCK + dx];
                    out.apply_luminance_delta(x0 + dx as u32, y0 + dy as u32, delta);
                }
            }
        }
    }

    out
}

#[test]
fn lossy_pass_degrades_to_metadata_only() {
    let canvas = gradient(512, 512);
    let (session, v2_image) = two_version_chain(&canvas);
    let chain_id = session.chain_id().unwrap().to_string();
    let v2_hash = session.payload().unwrap().history[1].sha256.clone();

    let squeezed = lossy_recompress(&v2_image);

    let details = extract_with_details(&squeezed);
    assert!(details.payload.is_none(), "LSB layer must not survive");
    assert!(details.corruption_detected);
    assert!(details.dct_extracted, "DCT layer must survive");

    let meta = details.critical_metadata.unwrap();
    assert_eq!(meta.chain_id, chain_id);
    assert_eq!(meta.version_count, 2);
    assert_eq!(meta.last_version_hash, v2_hash);

    // The orientation search reports the same partial result.
    let search = extract_with_rotations(&squeezed);
    assert!(search.payload.is_none());
    assert_eq!(search.rotation, Some(0));
    assert_eq!(search.critical_metadata.unwrap().chain_id, chain_id);
}

#[test]
fn single_bit_flip_recovers_with_error_rate() {
    let canvas = gradient(512, 512);
    let (session, v2_image) = two_version_chain(&canvas);
    let expected = session.payload().unwrap().clone();

    // Flip one carrier LSB inside the frame region.
    let mut damaged = v2_image.clone();
    let mut carrier_index = 0usize;
    for (i, byte) in damaged.data_mut().iter_mut().enumerate() {
        if i % 4 == 3 {
            continue;
        }
        if carrier_index == 1234 {
            *byte ^= 1;
            break;
        }
        carrier_index += 1;
    }

    let details = extract_with_details(&damaged);
    assert!(details.recovered);
    assert!(details.corruption_detected);
    assert!(details.error_rate.unwrap() > 0.0);

    let payload = details.payload.unwrap();
    assert_eq!(payload.chain_id, expected.chain_id);
    assert_eq!(payload.history, expected.history);
}

#[test]
fn rotated_output_still_yields_full_payload() {
    let canvas = gradient(512, 512);
    let (session, v2_image) = two_version_chain(&canvas);
    let expected = session.payload().unwrap().clone();

    let upside_down = v2_image.rotate(Rotation::Ccw180);
    let search = extract_with_rotations(&upside_down);
    assert_eq!(search.rotation, Some(180));
    let payload = search.payload.unwrap();
    assert_eq!(payload.history, expected.history);
}

#[test]
fn all_quarter_turns_recoverable() {
    let canvas = gradient(256, 256);
    let mut session = ChainSession::new();
    session.configure("Studio", SigScheme::EcdsaP256Sha256);
    session.ingest(&canvas).unwrap();
    let committed = session.commit(&canvas, vec![]).unwrap();
    let expected = session.payload().unwrap().clone();

    for applied in [Rotation::Ccw90, Rotation::Ccw180, Rotation::Ccw270] {
        let moved = committed.image.rotate(applied);
        let search = extract_with_rotations(&moved);
        assert!(
            search.payload.is_some(),
            "payload lost after {applied:?}"
        );
        assert_eq!(search.payload.unwrap().history, expected.history);
    }
}

#[test]
fn image_too_small_for_lsb_frame() {
    let canvas = gradient(16, 16);
    let mut session = ChainSession::new();
    session.configure("Studio", SigScheme::EcdsaP256Sha256);
    session.ingest(&canvas).unwrap();

    let err = session.commit(&canvas, vec![]);
    assert!(matches!(err, Err(ChainError::CapacityExceeded)));
}

#[test]
fn image_too_small_for_dct_still_commits() {
    // 120x96 holds the LSB frame but has far too few blocks for the
    // metadata record.
    let canvas = gradient(120, 96);
    let mut session = ChainSession::new();
    session.configure("Studio", SigScheme::EcdsaP256Sha256);
    session.ingest(&canvas).unwrap();

    let committed = session.commit(&canvas, vec![]).unwrap();
    assert!(!committed.dct_embedded, "DCT layer skipped and flagged");

    let details = extract_with_details(&committed.image);
    assert!(details.recovered, "LSB payload still present");
    assert!(details.critical_metadata.is_none());
    assert!(!details.dct_extracted);
}

#[test]
fn extraction_is_idempotent() {
    let canvas = gradient(256, 256);
    let mut session = ChainSession::new();
    session.configure("Studio", SigScheme::EcdsaP256Sha256);
    session.ingest(&canvas).unwrap();
    let committed = session.commit(&canvas, vec![]).unwrap();

    let first = extract_with_details(&committed.image);
    let second = extract_with_details(&committed.image);
    assert_eq!(first.payload, second.payload);
    assert_eq!(first.error_rate, second.error_rate);
}

#[test]
fn embedding_distortion_stays_low() {
    let canvas = gradient(256, 256);
    let mut session = ChainSession::new();
    session.configure("Studio", SigScheme::EcdsaP256Sha256);
    session.ingest(&canvas).unwrap();
    let committed = session.commit(&canvas, vec![]).unwrap();

    let mut sq_sum = 0.0f64;
    for (a, b) in canvas.data().iter().zip(committed.image.data().iter()) {
        let d = *a as f64 - *b as f64;
        sq_sum += d * d;
    }
    let mse = sq_sum / canvas.data().len() as f64;
    assert!(mse < 15.0, "commit embedding MSE too high: {mse}");
}
