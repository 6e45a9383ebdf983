// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Editing session: key ownership, chain state, and the commit path.
//!
//! A session is a value, not a singleton. It moves through three states:
//!
//! ```text
//! Idle -> Configured   (signer + scheme set)
//!      -> Initialized  (image ingested: keys generated, chain id
//!                       computed, any embedded payload adopted)
//!      -> Initialized  (on each successful commit)
//!      -> Idle         (on reset; key material is dropped)
//! ```
//!
//! A commit hashes the pre-embedding canvas, appends one signed entry,
//! and re-embeds the whole payload: critical metadata into the DCT layer
//! first, then the full payload into the LSB layer of the same canvas.
//! The order is fixed because the spatial write must be the last one.
//! On any failure the session payload is left exactly as it was; the
//! payload field is only replaced wholesale after the embed succeeded.

use chrono::{SecondsFormat, Utc};

use crate::chain::canonical::canonical_entry_bytes;
use crate::chain::model::{ChainedPayload, EditOp, HistoryEntry};
use crate::crypto::hash::sha256_hex;
use crate::crypto::keys::{generate_keys, KeyMaterial, SigScheme};
use crate::crypto::sign::sign;
use crate::error::ChainError;
use crate::pipeline::{embed_payload, extract_with_details};
use crate::raster::codec::{encode_lossless, snapshot, SNAPSHOT_QUALITY};
use crate::raster::PixelGrid;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Lifecycle state of a [`ChainSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Configured,
    Initialized,
}

/// Result of a successful commit.
pub struct CommitOutcome {
    /// The canvas with the updated payload embedded.
    pub image: PixelGrid,
    /// The version number of the appended entry.
    pub version: u32,
    /// Whether the DCT layer fit; false means the image was too small
    /// for the metadata record and only the LSB layer was written.
    pub dct_embedded: bool,
}

/// One editing session owning a key pair and the working payload.
pub struct ChainSession {
    signer: Option<String>,
    scheme: Option<SigScheme>,
    keys: Option<KeyMaterial>,
    payload: Option<ChainedPayload>,
}

impl ChainSession {
    pub fn new() -> Self {
        Self {
            signer: None,
            scheme: None,
            keys: None,
            payload: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.payload.is_some() {
            SessionState::Initialized
        } else if self.signer.is_some() {
            SessionState::Configured
        } else {
            SessionState::Idle
        }
    }

    /// Set the signer identity and signature scheme.
    pub fn configure(&mut self, signer: impl Into<String>, scheme: SigScheme) {
        self.signer = Some(signer.into());
        self.scheme = Some(scheme);
    }

    /// Ingest an image: generate keys, compute the chain id, and adopt
    /// an embedded payload if the image already carries one.
    ///
    /// # Errors
    /// [`ChainError::InvalidState`] before [`Self::configure`];
    /// [`ChainError::Crypto`] if key generation fails.
    pub fn ingest(&mut self, grid: &PixelGrid) -> Result<(), ChainError> {
        let scheme = self.scheme.ok_or(ChainError::InvalidState("configured"))?;

        let keys = generate_keys(scheme)?;

        let details = extract_with_details(grid);
        let payload = match details.payload {
            Some(existing) => existing,
            None => {
                let chain_id = sha256_hex(&encode_lossless(grid)?);
                ChainedPayload::new(chain_id)
            }
        };

        self.keys = Some(keys);
        self.payload = Some(payload);
        Ok(())
    }

    /// Append one signed entry and re-embed the full payload.
    ///
    /// # Errors
    /// - [`ChainError::InvalidState`] before ingest.
    /// - [`ChainError::EmptyCommit`] for an empty edit log after v1.
    /// - [`ChainError::CapacityExceeded`] if the LSB frame does not fit.
    /// - [`ChainError::Crypto`] if signing fails.
    pub fn commit(
        &mut self,
        grid: &PixelGrid,
        edit_log: Vec<EditOp>,
    ) -> Result<CommitOutcome, ChainError> {
        let payload = self
            .payload
            .as_ref()
            .ok_or(ChainError::InvalidState("initialized"))?;
        let keys = self
            .keys
            .as_ref()
            .ok_or(ChainError::InvalidState("initialized"))?;
        let signer = self
            .signer
            .clone()
            .ok_or(ChainError::InvalidState("configured"))?;

        let version = payload.next_version();
        if version > 1 && edit_log.is_empty() {
            return Err(ChainError::EmptyCommit);
        }

        let canvas_hash = sha256_hex(&encode_lossless(grid)?);
        let parent_hash = match payload.last_entry() {
            Some(prev) => Some(sha256_hex(&canonical_entry_bytes(prev)?)),
            None => None,
        };

        let wants_snapshot = version == 1 || edit_log.iter().any(EditOp::is_destructive);
        let snap = if wants_snapshot {
            Some(snapshot(grid, SNAPSHOT_QUALITY)?)
        } else {
            None
        };

        let mut entry = HistoryEntry {
            version,
            sha256: canvas_hash,
            parent_hash,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            signer,
            sig_scheme: keys.scheme,
            edit_log,
            snapshot: snap,
            signature: String::new(),
        };

        let canonical = canonical_entry_bytes(&entry)?;
        let signature = sign(&canonical, &keys.private_key)?;
        entry.signature = BASE64.encode(signature);

        // Build the successor payload and embed it. The session field is
        // replaced only after the embed succeeded, so a capacity failure
        // leaves no partial state behind.
        let mut updated = payload.clone();
        updated.history.push(entry);

        let outcome = embed_payload(grid, &updated)?;

        self.payload = Some(updated);
        Ok(CommitOutcome {
            image: outcome.image,
            version,
            dct_embedded: outcome.dct_embedded,
        })
    }

    /// Drop keys, payload, and configuration.
    ///
    /// The private PEM inside the key material zeroizes on drop; entries
    /// never leave the process except through an embedded image.
    pub fn reset(&mut self) {
        self.keys = None;
        self.payload = None;
        self.signer = None;
        self.scheme = None;
    }

    pub fn payload(&self) -> Option<&ChainedPayload> {
        self.payload.as_ref()
    }

    pub fn chain_id(&self) -> Option<&str> {
        self.payload.as_ref().map(|p| p.chain_id.as_str())
    }

    pub fn keys(&self) -> Option<&KeyMaterial> {
        self.keys.as_ref()
    }

    pub fn public_key_pem(&self) -> Option<&str> {
        self.keys.as_ref().map(|k| k.public_pem.as_str())
    }
}

impl Default for ChainSession {
    fn default() -> Self {
        Self::new()
    }
}
