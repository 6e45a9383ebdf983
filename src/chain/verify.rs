// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Chain verification.
//!
//! Verification walks every entry and checks, independently:
//!
//! - the signature over the entry's canonical form, under the entry's
//!   declared scheme and the supplied public key, and
//! - the hash link: version numbers strictly increasing from 1, parent
//!   hash equal to the previous entry's canonical-form hash, absent on
//!   the first entry.
//!
//! A mismatched signature is a finding, never an error: it marks the
//! entry invalid and verification continues. Errors are reserved for a
//! key that cannot be parsed at all.
//!
//! The optional live-canvas check compares the current canvas hash with
//! the newest entry's stored canvas hash. It only makes sense for the
//! editor's own canvas: an uploaded file embeds a payload, so its pixels
//! hash differently from the pre-embedding hash by construction. The
//! `is_uploaded` flag disables the check for that case.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::chain::canonical::canonical_entry_bytes;
use crate::chain::model::ChainedPayload;
use crate::crypto::hash::sha256_hex;
use crate::crypto::keys::PublicKey;
use crate::crypto::sign::verify;
use crate::error::ChainError;
use crate::raster::codec::encode_lossless;
use crate::raster::PixelGrid;

/// Options for [`verify_chain`].
#[derive(Default)]
pub struct VerifyOptions<'a> {
    /// True when verifying an uploaded file rather than the live editor
    /// canvas; disables the canvas hash comparison.
    pub is_uploaded: bool,
    /// The canvas to compare against the newest entry, when available.
    pub canvas: Option<&'a PixelGrid>,
}

/// Per-entry verification verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub version: u32,
    pub signature_valid: bool,
    pub chain_link_valid: bool,
    /// Diagnostic for whichever check failed first.
    pub error: Option<String>,
}

/// Whole-chain verification verdict.
#[derive(Debug, Clone)]
pub struct ChainVerification {
    pub entries: Vec<VerificationResult>,
    /// True when every entry's signature and link checks passed.
    pub chain_intact: bool,
    /// Result of the live-canvas hash comparison, when performed.
    pub canvas_hash_matches: Option<bool>,
    /// Consistency of recovered DCT metadata with the history, when the
    /// payload carries any.
    pub metadata_consistent: Option<bool>,
}

/// Verify a payload against a public key.
///
/// # Errors
/// [`ChainError::Crypto`] if the PEM cannot be parsed. Signature
/// mismatches and broken links are reported per entry instead.
pub fn verify_chain(
    payload: &ChainedPayload,
    public_key_pem: &str,
    options: &VerifyOptions<'_>,
) -> Result<ChainVerification, ChainError> {
    let key = PublicKey::from_pem(public_key_pem)?;

    let mut entries = Vec::with_capacity(payload.history.len());
    let mut prev_entry_hash: Option<String> = None;
    let mut prev_version: Option<u32> = None;

    for entry in &payload.history {
        let mut error: Option<String> = None;

        let canonical = canonical_entry_bytes(entry)?;
        let signature_valid = match BASE64.decode(&entry.signature) {
            Ok(sig) => verify(&canonical, &sig, &key, entry.sig_scheme)?,
            Err(_) => false,
        };
        if !signature_valid {
            error = Some("signature does not verify".to_string());
        }

        let chain_link_valid = match (&prev_version, &prev_entry_hash) {
            (None, _) => {
                let first_ok = entry.version == 1 && entry.parent_hash.is_none();
                if !first_ok && error.is_none() {
                    error = Some("first entry must be version 1 with no parent".to_string());
                }
                first_ok
            }
            (Some(pv), Some(ph)) => {
                if entry.version != pv + 1 {
                    if error.is_none() {
                        error = Some(format!(
                            "version {} does not follow {}",
                            entry.version, pv
                        ));
                    }
                    false
                } else if entry.parent_hash.as_deref() != Some(ph.as_str()) {
                    if error.is_none() {
                        error = Some("parent hash does not match previous entry".to_string());
                    }
                    false
                } else {
                    true
                }
            }
            _ => false,
        };

        entries.push(VerificationResult {
            version: entry.version,
            signature_valid,
            chain_link_valid,
            error,
        });

        prev_entry_hash = Some(sha256_hex(&canonical));
        prev_version = Some(entry.version);
    }

    let chain_intact = entries
        .iter()
        .all(|e| e.signature_valid && e.chain_link_valid);

    let canvas_hash_matches = match (options.is_uploaded, options.canvas, payload.last_entry()) {
        (false, Some(canvas), Some(last)) => {
            let hash = sha256_hex(&encode_lossless(canvas)?);
            Some(hash == last.sha256)
        }
        _ => None,
    };

    let metadata_consistent = payload.dct_metadata.as_ref().map(|meta| {
        meta.version_count as usize == payload.history.len()
            && payload
                .last_entry()
                .map_or(false, |last| meta.last_version_hash == last.sha256)
            && meta.chain_id == payload.chain_id
    });

    Ok(ChainVerification {
        entries,
        chain_intact,
        canvas_hash_matches,
        metadata_consistent,
    })
}
