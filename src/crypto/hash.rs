// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! SHA-256 hashing helpers.

use sha2::{Digest, Sha256};

/// SHA-256 of `bytes` as a raw 32-byte digest.
pub fn sha256_bytes(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// SHA-256 of `bytes` as a lowercase hex string.
///
/// This is the identifier format used for chain ids, entry hashes, and
/// parent links.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(sha256_bytes(bytes))
}
