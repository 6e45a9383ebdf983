// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Spatial-domain codec for the full chained payload.
//!
//! The payload rides in the least-significant bits of the R, G, B
//! channels (alpha untouched): canonical JSON, DEFLATE-compressed,
//! framed with magic/length/checksum/end-marker, then every frame byte
//! tripled for majority-vote recovery. The layer is fragile by design:
//! any lossy recompression destroys it, and the DCT layer is the safety
//! net for that case. What the triplication buys is recovery from
//! scattered bit flips (brightness drift, isolated tampering) together
//! with an observed error rate.

pub mod codec;
pub mod ecc;
pub mod frame;

pub use codec::{capacity_bits, embed_payload, extract_payload, LsbExtraction};
pub use ecc::REPLICATION;
