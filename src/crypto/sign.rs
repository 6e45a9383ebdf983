// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Signing and verification over the two supported schemes.
//!
//! RSA-PSS goes through the openssl streaming signer with explicit PSS
//! parameters (MGF1/SHA-256, salt length 32). ECDSA signs the SHA-256
//! digest directly and converts between openssl's internal DER form and
//! the wire format, which is fixed to raw IEEE-P1363 `r || s` with both
//! halves zero-padded to 32 bytes.
//!
//! `verify` returns `Ok(false)` for any signature that does not check
//! out, including structurally malformed ones; `Err` is reserved for
//! machinery failures such as an unusable key.

use openssl::bn::BigNum;
use openssl::ecdsa::EcdsaSig;
use openssl::hash::MessageDigest;
use openssl::rsa::Padding;
use openssl::sign::{RsaPssSaltlen, Signer, Verifier};

use crate::crypto::error::CryptoError;
use crate::crypto::hash::sha256_bytes;
use crate::crypto::keys::{PrivateKey, PublicKey, SigScheme};

/// PSS salt length in bytes (matches the SHA-256 digest length).
const PSS_SALT_LEN: i32 = 32;

/// Length of one ECDSA P-256 scalar on the wire.
const P256_SCALAR_LEN: usize = 32;

/// Sign `data` with the key's scheme. Returns the raw signature bytes:
/// a PSS block for RSA, 64-byte `r || s` for ECDSA.
pub fn sign(data: &[u8], key: &PrivateKey) -> Result<Vec<u8>, CryptoError> {
    match key.scheme() {
        SigScheme::RsaPssSha256 => {
            let mut signer =
                Signer::new(MessageDigest::sha256(), key.pkey()).map_err(CryptoError::Signing)?;
            signer
                .set_rsa_padding(Padding::PKCS1_PSS)
                .map_err(CryptoError::Signing)?;
            signer
                .set_rsa_pss_saltlen(RsaPssSaltlen::custom(PSS_SALT_LEN))
                .map_err(CryptoError::Signing)?;
            signer
                .set_rsa_mgf1_md(MessageDigest::sha256())
                .map_err(CryptoError::Signing)?;
            signer.update(data).map_err(CryptoError::Signing)?;
            signer.sign_to_vec().map_err(CryptoError::Signing)
        }
        SigScheme::EcdsaP256Sha256 => {
            let digest = sha256_bytes(data);
            let ec = key.pkey().ec_key().map_err(CryptoError::Signing)?;
            let sig = EcdsaSig::sign(&digest, &ec).map_err(CryptoError::Signing)?;
            let r = sig
                .r()
                .to_vec_padded(P256_SCALAR_LEN as i32)
                .map_err(CryptoError::Signing)?;
            let s = sig
                .s()
                .to_vec_padded(P256_SCALAR_LEN as i32)
                .map_err(CryptoError::Signing)?;
            let mut out = Vec::with_capacity(P256_SCALAR_LEN * 2);
            out.extend_from_slice(&r);
            out.extend_from_slice(&s);
            Ok(out)
        }
    }
}

/// Verify `signature` over `data` under `scheme`.
///
/// Returns `Ok(false)` when the signature does not verify or does not
/// even parse; `Err` only when verification could not be attempted.
pub fn verify(
    data: &[u8],
    signature: &[u8],
    key: &PublicKey,
    scheme: SigScheme,
) -> Result<bool, CryptoError> {
    if key.scheme() != scheme {
        // A key of the wrong type can never validate this signature.
        return Ok(false);
    }
    match scheme {
        SigScheme::RsaPssSha256 => {
            let mut verifier =
                Verifier::new(MessageDigest::sha256(), key.pkey()).map_err(CryptoError::Verification)?;
            verifier
                .set_rsa_padding(Padding::PKCS1_PSS)
                .map_err(CryptoError::Verification)?;
            verifier
                .set_rsa_pss_saltlen(RsaPssSaltlen::custom(PSS_SALT_LEN))
                .map_err(CryptoError::Verification)?;
            verifier
                .set_rsa_mgf1_md(MessageDigest::sha256())
                .map_err(CryptoError::Verification)?;
            verifier.update(data).map_err(CryptoError::Verification)?;
            // A structurally bad signature surfaces as Err here; that is
            // still just "does not verify" to the caller.
            Ok(verifier.verify(signature).unwrap_or(false))
        }
        SigScheme::EcdsaP256Sha256 => {
            if signature.len() != P256_SCALAR_LEN * 2 {
                return Ok(false);
            }
            let digest = sha256_bytes(data);
            let r = match BigNum::from_slice(&signature[..P256_SCALAR_LEN]) {
                Ok(n) => n,
                Err(_) => return Ok(false),
            };
            let s = match BigNum::from_slice(&signature[P256_SCALAR_LEN..]) {
                Ok(n) => n,
                Err(_) => return Ok(false),
            };
            let sig = match EcdsaSig::from_private_components(r, s) {
                Ok(sig) => sig,
                Err(_) => return Ok(false),
            };
            let ec = key.pkey().ec_key().map_err(CryptoError::Verification)?;
            Ok(sig.verify(&digest, &ec).unwrap_or(false))
        }
    }
}
