// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! The chain engine: data model, canonical serialization, session
//! handling, and verification.
//!
//! A chain is an append-only list of signed [`HistoryEntry`] records
//! riding inside a [`ChainedPayload`]. Entries link by hash: each entry
//! after the first carries the SHA-256 of its predecessor's canonical
//! form, so any retroactive edit breaks every later link. The canonical
//! form (recursively key-sorted, whitespace-free JSON with the signature
//! field removed) is both the signing input and the link-hash input.

pub mod canonical;
pub mod model;
pub mod session;
pub mod verify;

pub use canonical::{canonical_bytes, canonical_entry_bytes};
pub use model::{ChainedPayload, EditOp, FilterKind, HistoryEntry, Snapshot};
pub use session::{ChainSession, CommitOutcome, SessionState};
pub use verify::{verify_chain, ChainVerification, VerificationResult, VerifyOptions};
