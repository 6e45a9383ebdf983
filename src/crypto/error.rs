// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for key handling and signing.
//!
//! Note the split the rest of the crate relies on: a signature that does
//! not verify is a normal `Ok(false)` outcome, never an error. These
//! variants cover machinery failures only.

use core::fmt;

/// Errors from key generation, parsing, signing, or verification setup.
#[derive(Debug)]
pub enum CryptoError {
    /// A PEM block could not be parsed into a key.
    InvalidPem(String),
    /// The scheme string or key type is not supported.
    UnsupportedScheme(String),
    /// Key generation failed.
    KeyGeneration(openssl::error::ErrorStack),
    /// Producing a signature failed.
    Signing(openssl::error::ErrorStack),
    /// Setting up verification failed (distinct from a bad signature).
    Verification(openssl::error::ErrorStack),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPem(msg) => write!(f, "invalid PEM: {msg}"),
            Self::UnsupportedScheme(s) => write!(f, "unsupported signature scheme: {s}"),
            Self::KeyGeneration(e) => write!(f, "key generation failed: {e}"),
            Self::Signing(e) => write!(f, "signing failed: {e}"),
            Self::Verification(e) => write!(f, "verification setup failed: {e}"),
        }
    }
}

impl std::error::Error for CryptoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::KeyGeneration(e) | Self::Signing(e) | Self::Verification(e) => Some(e),
            _ => None,
        }
    }
}
