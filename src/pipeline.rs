// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Embed and extract orchestration across the two codec layers.
//!
//! Embedding writes the DCT layer first and the LSB layer second; the
//! spatial write must be the last one because the frequency write moves
//! every pixel in a block. Extraction mirrors that order per candidate
//! orientation: DCT read, then LSB read, reconciling the two.
//!
//! The orientation search tries 0, 90, 180, and 270 degree
//! counter-clockwise rotations in that order, on pixel-exact rotated
//! grids. Negative and larger angles collapse onto these under
//! normalization; interpolated angles are out of scope because they
//! destroy the LSB plane. The first rotation yielding a full LSB
//! payload wins; failing that, the earliest rotation that yielded DCT
//! metadata gives a partial (metadata-only) result.

use crate::chain::model::ChainedPayload;
use crate::dct;
use crate::dct::record::CriticalMetadata;
use crate::error::ChainError;
use crate::lsb;
use crate::raster::{PixelGrid, Rotation};

/// Result of embedding a payload into a canvas.
pub struct EmbedOutcome {
    /// The canvas carrying both layers (or just the LSB layer when the
    /// image is too small for the metadata record).
    pub image: PixelGrid,
    /// Whether the DCT layer fit.
    pub dct_embedded: bool,
}

/// Detailed result of a single-orientation extraction.
#[derive(Debug, Clone)]
pub struct ExtractionDetails {
    /// The full payload, when the LSB layer parsed, enriched with the
    /// DCT metadata when that was also readable.
    pub payload: Option<ChainedPayload>,
    /// Whether a full payload was recovered.
    pub recovered: bool,
    /// Replica disagreement or a missing/corrupt LSB frame.
    pub corruption_detected: bool,
    /// Observed replica error rate inside the frame, when one was found.
    pub error_rate: Option<f64>,
    /// Metadata recovered from the DCT layer, when present.
    pub critical_metadata: Option<CriticalMetadata>,
    /// Whether the DCT layer decoded at all.
    pub dct_extracted: bool,
}

/// Result of the orientation-search extraction.
#[derive(Debug, Clone)]
pub struct RotationSearch {
    /// Full payload, when some rotation yielded one.
    pub payload: Option<ChainedPayload>,
    /// The counter-clockwise rotation (degrees) at which extraction
    /// succeeded, full or partial.
    pub rotation: Option<u32>,
    /// Metadata from the DCT layer at the successful rotation, or at
    /// the earliest rotation that yielded any when no full payload was
    /// found.
    pub critical_metadata: Option<CriticalMetadata>,
}

/// Embed a payload into a canvas: DCT metadata first, full LSB payload
/// second, on the same pixels.
///
/// An image too small for the metadata record degrades gracefully: the
/// DCT layer is skipped and flagged, the LSB layer still written. A
/// payload with an empty history carries nothing the metadata record
/// could summarize, so the DCT layer is skipped for it as well.
///
/// # Errors
/// [`ChainError::CapacityExceeded`] if the LSB frame does not fit; the
/// LSB layer is the one that must always succeed.
pub fn embed_payload(grid: &PixelGrid, payload: &ChainedPayload) -> Result<EmbedOutcome, ChainError> {
    let mut canvas = grid.clone();

    let dct_embedded = match payload.last_entry() {
        Some(last) => {
            let meta = CriticalMetadata::new(
                payload.chain_id.clone(),
                payload.history.len() as u32,
                &last.sha256,
            );
            match dct::embed_record(&mut canvas, &meta) {
                Ok(()) => true,
                Err(ChainError::CapacityExceeded) => false,
                Err(other) => return Err(other),
            }
        }
        None => false,
    };

    lsb::embed_payload(&mut canvas, payload)?;

    Ok(EmbedOutcome {
        image: canvas,
        dct_embedded,
    })
}

/// Extract both layers from a canvas at its current orientation.
///
/// Never fails: every outcome is expressed through the result flags.
pub fn extract_with_details(grid: &PixelGrid) -> ExtractionDetails {
    let critical_metadata = dct::extract_record(grid);
    let dct_extracted = critical_metadata.is_some();

    let lsb_result = lsb::extract_payload(grid);

    let payload = lsb_result.payload.map(|mut payload| {
        payload.dct_metadata = critical_metadata.clone();
        payload
    });

    ExtractionDetails {
        recovered: payload.is_some(),
        payload,
        corruption_detected: lsb_result.corruption_detected,
        error_rate: lsb_result.error_rate,
        critical_metadata,
        dct_extracted,
    }
}

/// Run the bounded orientation search over a candidate image.
pub fn extract_with_rotations(grid: &PixelGrid) -> RotationSearch {
    let mut first_metadata: Option<(u32, CriticalMetadata)> = None;

    for rotation in Rotation::ALL {
        let candidate = grid.rotate(rotation);
        let details = extract_with_details(&candidate);

        if let Some(payload) = details.payload {
            return RotationSearch {
                critical_metadata: payload.dct_metadata.clone(),
                payload: Some(payload),
                rotation: Some(rotation.degrees()),
            };
        }

        if first_metadata.is_none() {
            if let Some(meta) = details.critical_metadata {
                first_metadata = Some((rotation.degrees(), meta));
            }
        }
    }

    match first_metadata {
        Some((degrees, meta)) => RotationSearch {
            payload: None,
            rotation: Some(degrees),
            critical_metadata: Some(meta),
        },
        None => RotationSearch {
            payload: None,
            rotation: None,
            critical_metadata: None,
        },
    }
}
