// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Triple-replication error correction with byte-level majority voting.
//!
//! Every frame byte is written three times in a row. Decoding groups the
//! stream into triples and votes per byte: two matching copies win, a
//! three-way disagreement falls back to the first copy. This corrects
//! any single corrupted copy per group and, unlike a stronger code, has
//! a fixed and predictable capacity cost of exactly 3x. Groups whose
//! copies disagree are flagged so callers can report an observed error
//! rate.

/// Replication factor.
pub const REPLICATION: usize = 3;

/// Replicate each byte `REPLICATION` times, contiguously.
pub fn replicate(frame: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.len() * REPLICATION);
    for &byte in frame {
        for _ in 0..REPLICATION {
            out.push(byte);
        }
    }
    out
}

/// Majority-decode a replicated stream.
///
/// Returns the voted bytes and a per-group flag marking groups whose
/// three copies were not all identical. A trailing partial group is
/// dropped; a full frame always occupies whole groups.
pub fn majority_decode(raw: &[u8]) -> (Vec<u8>, Vec<bool>) {
    let groups = raw.len() / REPLICATION;
    let mut decoded = Vec::with_capacity(groups);
    let mut mismatched = Vec::with_capacity(groups);

    for group in raw.chunks_exact(REPLICATION) {
        let (a, b, c) = (group[0], group[1], group[2]);
        let voted = if a == b || a == c {
            a
        } else if b == c {
            b
        } else {
            // Three-way tie: first occurrence wins.
            a
        };
        decoded.push(voted);
        mismatched.push(!(a == b && b == c));
    }

    (decoded, mismatched)
}
