// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Frequency-domain codec for the critical-metadata record.
//!
//! A short, self-delimited record (chain id, version count, last version
//! hash) is embedded into mid-frequency DCT coefficients of the 8x8
//! luminance blocks, five bits per block. The quantization-parity
//! embedding survives moderate lossy recompression, which makes this
//! layer the safety net when the fragile LSB layer is destroyed.

pub mod codec;
pub mod record;
pub mod transform;

pub use codec::{capacity_bits, embed_record, extract_record, EMBED_POSITIONS, QUANT_STEP};
pub use record::CriticalMetadata;
