// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Payload data model: edit operations, snapshots, history entries.
//!
//! All types serialize to the JSON shapes fixed by the wire format.
//! Edit operations are descriptive only: verification never re-applies
//! them, it just checks that the log was signed.

use serde::{Deserialize, Serialize};

use crate::crypto::keys::SigScheme;
use crate::dct::record::CriticalMetadata;

/// Filter kinds carried by [`EditOp::Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    None,
    Grayscale,
    Sepia,
    Invert,
}

/// One edit operation in a version's edit log.
///
/// Serialized with an `"op"` tag, e.g.
/// `{"op":"brightness","delta":1.3}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum EditOp {
    Brightness { delta: f64 },
    Contrast { delta: f64 },
    Crop { x: i64, y: i64, w: i64, h: i64 },
    Rotate { angle: f64 },
    Compress { quality: f64 },
    Filter {
        #[serde(rename = "type")]
        kind: FilterKind,
    },
    Text {
        text: String,
        x: i64,
        y: i64,
        font: String,
        color: String,
    },
}

impl EditOp {
    /// Whether the op irreversibly changes pixel content.
    ///
    /// Destructive versions carry a snapshot of their result so a viewer
    /// can show what the image looked like at that point.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            EditOp::Filter { .. }
                | EditOp::Crop { .. }
                | EditOp::Rotate { .. }
                | EditOp::Compress { .. }
                | EditOp::Text { .. }
        )
    }
}

/// A small preview image carried inside an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    /// Codec tag, always `"webp"`.
    pub codec: String,
    /// Base64-encoded image bytes.
    pub bytes: String,
}

/// One immutable, signed version record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Version number, starting at 1 and strictly increasing.
    pub version: u32,
    /// Lowercase-hex SHA-256 of the pre-embedding canonical pixel
    /// encoding of this version's canvas.
    pub sha256: String,
    /// SHA-256 of the previous entry's canonical form (minus signature).
    /// Absent on version 1.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent_hash: Option<String>,
    /// RFC-3339 UTC timestamp.
    pub timestamp: String,
    /// Free-form signer identity.
    pub signer: String,
    /// Signature scheme used for this entry.
    pub sig_scheme: SigScheme,
    /// Ordered edit operations applied in this version (may be empty).
    pub edit_log: Vec<EditOp>,
    /// Preview, present on v1 and on destructive versions.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub snapshot: Option<Snapshot>,
    /// Base64 signature over the canonical form of all other fields.
    pub signature: String,
}

/// The full payload embedded into an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainedPayload {
    /// SHA-256 of the originally ingested image's canonical pixel
    /// encoding. Constant across every version of one chain.
    pub chain_id: String,
    /// Ordered version history.
    pub history: Vec<HistoryEntry>,
    /// Critical metadata recovered from the DCT layer when the LSB layer
    /// failed. Never serialized into the LSB layer itself.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dct_metadata: Option<CriticalMetadata>,
}

impl ChainedPayload {
    /// A fresh payload with no history yet.
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            history: Vec::new(),
            dct_metadata: None,
        }
    }

    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    /// The version number the next commit will get.
    pub fn next_version(&self) -> u32 {
        self.history.last().map_or(1, |e| e.version + 1)
    }

    /// A copy with the transient `dct_metadata` field stripped, as
    /// serialized into the LSB layer.
    pub fn for_embedding(&self) -> Self {
        Self {
            chain_id: self.chain_id.clone(),
            history: self.history.clone(),
            dct_metadata: None,
        }
    }
}
