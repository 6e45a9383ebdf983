// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! # imagechain-core
//!
//! Embeds a cryptographically signed, chained version history of an
//! image directly into the image's own pixels, so a single raster file
//! carries its provenance, its edit log, and the proofs needed to
//! verify them, with no external registry. Two embedding layers share
//! the pixels:
//!
//! - **LSB** (spatial): the full payload, DEFLATE-compressed, framed,
//!   and tripled for majority-vote recovery, in the least-significant
//!   bits of R, G, B. Exact but fragile.
//! - **DCT** (frequency): a compact critical-metadata record in
//!   mid-frequency coefficients of the 8x8 luminance blocks. Small but
//!   survives moderate lossy recompression.
//!
//! History entries are signed (RSA-PSS-3072 or ECDSA-P256, both over
//! SHA-256) and hash-linked, so both pixel tampering and history
//! rewriting are detectable. The embedded data is public by design;
//! only integrity and authorship are protected.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use imagechain_core::{ChainSession, SigScheme, extract_with_rotations, verify_chain, VerifyOptions};
//!
//! let canvas = imagechain_core::decode(&std::fs::read("photo.png")?)?;
//!
//! let mut session = ChainSession::new();
//! session.configure("Studio", SigScheme::EcdsaP256Sha256);
//! session.ingest(&canvas)?;
//! let committed = session.commit(&canvas, vec![])?;
//!
//! let found = extract_with_rotations(&committed.image);
//! let report = verify_chain(
//!     found.payload.as_ref().unwrap(),
//!     session.public_key_pem().unwrap(),
//!     &VerifyOptions { is_uploaded: true, canvas: None },
//! )?;
//! assert!(report.chain_intact);
//! ```

pub mod chain;
pub mod crypto;
pub mod dct;
pub mod error;
pub mod lsb;
pub mod pipeline;
pub mod raster;

pub use chain::{
    canonical_bytes, canonical_entry_bytes, verify_chain, ChainSession, ChainVerification,
    ChainedPayload, CommitOutcome, EditOp, FilterKind, HistoryEntry, SessionState, Snapshot,
    VerificationResult, VerifyOptions,
};
pub use crypto::{generate_keys, sha256_hex, sign, verify, CryptoError, KeyMaterial, SigScheme};
pub use dct::CriticalMetadata;
pub use error::ChainError;
pub use pipeline::{
    embed_payload, extract_with_details, extract_with_rotations, EmbedOutcome, ExtractionDetails,
    RotationSearch,
};
pub use raster::{decode, encode_lossless, encode_lossy, snapshot, PixelGrid, RasterError, Rotation};
