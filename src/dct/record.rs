// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Critical-metadata record and its binary framing.
//!
//! The DCT layer carries a compact summary of the chain, enough to prove
//! provenance when the full LSB payload has been destroyed by lossy
//! recompression. Wire format:
//!
//! ```text
//! [7 bytes] magic "ICMETA1"
//! [2 bytes] payload length (big-endian u16)
//! [N bytes] canonical JSON payload
//! [4 bytes] payload byte sum (big-endian u32, wrapping)
//! ```
//!
//! The JSON payload carries its own second checksum over the field
//! string `"{chain_id}|{version_count}|{last_version_hash}"`, computed
//! as the classic 31-multiplier string hash over code points, so a
//! record that survives the framing checksum by accident is still
//! rejected unless its fields are internally consistent.
//!
//! Parsing never fails loudly: any mismatch at any step yields `None`.

use serde::{Deserialize, Serialize};

use crate::chain::canonical::canonical_bytes;

/// Magic prefix of a framed metadata record.
pub const MAGIC: &[u8; 7] = b"ICMETA1";

/// Fixed framing overhead: magic + length + byte sum.
pub const FRAME_OVERHEAD: usize = 7 + 2 + 4;

/// The compact chain summary carried by the DCT layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalMetadata {
    /// Chain id (hex SHA-256 of the original image).
    pub chain_id: String,
    /// Number of history entries at embed time.
    pub version_count: u32,
    /// The `sha256` field of the newest entry.
    pub last_version_hash: String,
    /// Internal field checksum, 8 hex chars.
    pub checksum: String,
}

impl CriticalMetadata {
    /// Build a record with its checksum filled in.
    pub fn new(chain_id: impl Into<String>, version_count: u32, last_version_hash: &str) -> Self {
        let chain_id = chain_id.into();
        let checksum = field_checksum(&chain_id, version_count, last_version_hash);
        Self {
            chain_id,
            version_count,
            last_version_hash: last_version_hash.to_string(),
            checksum,
        }
    }

    /// Whether the stored checksum matches the other fields.
    pub fn checksum_valid(&self) -> bool {
        self.checksum == field_checksum(&self.chain_id, self.version_count, &self.last_version_hash)
    }
}

/// 31-multiplier string hash over `"{chain_id}|{count}|{hash}"`,
/// truncated to 32 bits, rendered as 8 lowercase hex chars.
fn field_checksum(chain_id: &str, version_count: u32, last_version_hash: &str) -> String {
    let text = format!("{chain_id}|{version_count}|{last_version_hash}");
    let mut h: u32 = 0;
    for ch in text.chars() {
        h = h.wrapping_mul(31).wrapping_add(ch as u32);
    }
    format!("{h:08x}")
}

/// Wrapping byte sum used as the framing checksum.
fn byte_sum(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32))
}

/// Frame a record for embedding.
///
/// Returns `None` only if the JSON payload would overflow the u16
/// length field, which cannot happen for well-formed hex hashes.
pub fn build_record(meta: &CriticalMetadata) -> Option<Vec<u8>> {
    let payload = canonical_bytes(meta).ok()?;
    if payload.len() > u16::MAX as usize {
        return None;
    }

    let mut out = Vec::with_capacity(FRAME_OVERHEAD + payload.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&byte_sum(&payload).to_be_bytes());
    Some(out)
}

/// Parse a framed record from a decoded bit stream.
///
/// The input may be longer than the record (trailing noise bits from
/// unused blocks). Returns `None` on any mismatch.
pub fn parse_record(data: &[u8]) -> Option<CriticalMetadata> {
    if data.len() < FRAME_OVERHEAD {
        return None;
    }
    if &data[..7] != MAGIC {
        return None;
    }

    let len = u16::from_be_bytes([data[7], data[8]]) as usize;
    let payload_start = 9;
    let sum_start = payload_start + len;
    if data.len() < sum_start + 4 {
        return None;
    }

    let payload = &data[payload_start..sum_start];
    let stored_sum = u32::from_be_bytes([
        data[sum_start],
        data[sum_start + 1],
        data[sum_start + 2],
        data[sum_start + 3],
    ]);
    if byte_sum(payload) != stored_sum {
        return None;
    }

    let meta: CriticalMetadata = serde_json::from_slice(payload).ok()?;
    if !meta.checksum_valid() {
        return None;
    }
    Some(meta)
}
