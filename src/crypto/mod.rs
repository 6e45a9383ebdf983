// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Cryptographic primitives: hashing, key management, signing.
//!
//! Two signature schemes are first-class, selected per history entry:
//!
//! - **RSA-PSS** with a 3072-bit modulus, public exponent 65537, MGF1
//!   over SHA-256, salt length 32, hash SHA-256.
//! - **ECDSA over P-256** with SHA-256. Signatures on the wire are raw
//!   IEEE-P1363 `r || s` (64 bytes), not DER.
//!
//! Keys travel as standard PEM text blocks: SubjectPublicKeyInfo for
//! public keys, PKCS#8 for private keys. Hash identifiers everywhere are
//! lowercase-hex SHA-256.

pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;

pub use error::CryptoError;
pub use hash::{sha256_bytes, sha256_hex};
pub use keys::{generate_keys, KeyMaterial, PrivateKey, PublicKey, SigScheme};
pub use sign::{sign, verify};
