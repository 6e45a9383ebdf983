// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the chain and embedding pipeline.
//!
//! [`ChainError`] covers all failure modes from image decoding through
//! signing, embedding, and session handling. Extraction routines do not
//! use it: a bad or unmarked image is a normal outcome there, reported
//! through result records instead of errors.

use core::fmt;

use crate::crypto::CryptoError;
use crate::raster::RasterError;

/// Errors that can occur while building, signing, or embedding a chain.
#[derive(Debug)]
pub enum ChainError {
    /// The input image could not be decoded or encoded.
    InvalidImage(RasterError),
    /// The framed payload does not fit into the carrier image.
    CapacityExceeded,
    /// Key generation, signing, or verification machinery failed.
    Crypto(CryptoError),
    /// The payload JSON could not be serialized or parsed.
    MalformedPayload(String),
    /// A commit with an empty edit log was attempted after version 1.
    EmptyCommit,
    /// A session operation was called in the wrong state.
    InvalidState(&'static str),
    /// An internal invariant was violated.
    Internal(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidImage(e) => write!(f, "invalid image: {e}"),
            Self::CapacityExceeded => write!(f, "payload exceeds carrier capacity"),
            Self::Crypto(e) => write!(f, "crypto failure: {e}"),
            Self::MalformedPayload(msg) => write!(f, "malformed payload: {msg}"),
            Self::EmptyCommit => write!(f, "empty edit log is not allowed after version 1"),
            Self::InvalidState(expected) => write!(f, "session is not {expected}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for ChainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidImage(e) => Some(e),
            Self::Crypto(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RasterError> for ChainError {
    fn from(e: RasterError) -> Self {
        Self::InvalidImage(e)
    }
}

impl From<CryptoError> for ChainError {
    fn from(e: CryptoError) -> Self {
        Self::Crypto(e)
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedPayload(e.to_string())
    }
}
