// Copyright (c) 2026 imagechain developers
// SPDX-License-Identifier: GPL-3.0-only

//! Canonical JSON serialization.
//!
//! The canonical form of a record is its JSON encoding after recursive
//! lexicographic key-sorting, with array order and scalar values kept
//! verbatim and no whitespace anywhere. It is the substrate for both
//! signing and entry-hash links, so it must never depend on struct field
//! order or on a serializer's insertion order.
//!
//! Implementation note: values are routed through `serde_json::Value`,
//! whose object map is a BTreeMap, which sorts keys at every nesting
//! level. The `preserve_order` feature of serde_json must stay off.

use serde::Serialize;
use serde_json::Value;

use crate::chain::model::HistoryEntry;
use crate::error::ChainError;

/// Canonical bytes of any serializable record.
pub fn canonical_bytes<T: Serialize>(record: &T) -> Result<Vec<u8>, ChainError> {
    let value = serde_json::to_value(record)?;
    Ok(serde_json::to_vec(&value)?)
}

/// Canonical bytes of a history entry with the signature field removed.
///
/// The field is removed, not blanked: a signed entry and its pre-signing
/// draft canonicalize to identical bytes. These bytes are what gets
/// signed and what the next entry's `parent_hash` commits to.
pub fn canonical_entry_bytes(entry: &HistoryEntry) -> Result<Vec<u8>, ChainError> {
    let mut value = serde_json::to_value(entry)?;
    match value {
        Value::Object(ref mut map) => {
            map.remove("signature");
        }
        _ => {
            return Err(ChainError::Internal(
                "history entry did not serialize to an object".to_string(),
            ))
        }
    }
    Ok(serde_json::to_vec(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::SigScheme;

    fn entry() -> HistoryEntry {
        HistoryEntry {
            version: 1,
            sha256: "ab".repeat(32),
            parent_hash: None,
            timestamp: "2026-03-01T10:00:00Z".into(),
            signer: "Studio".into(),
            sig_scheme: SigScheme::EcdsaP256Sha256,
            edit_log: vec![],
            snapshot: None,
            signature: "c2ln".into(),
        }
    }

    #[test]
    fn keys_are_sorted_and_compact() {
        let bytes = canonical_bytes(&entry()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        // No whitespace.
        assert!(!text.contains(' '));
        assert!(!text.contains('\n'));
        // Keys appear in lexicographic order.
        let order = [
            "\"edit_log\"",
            "\"sha256\"",
            "\"sig_scheme\"",
            "\"signature\"",
            "\"signer\"",
            "\"timestamp\"",
            "\"version\"",
        ];
        let positions: Vec<usize> = order.iter().map(|k| text.find(k).unwrap()).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted, "keys out of order in {text}");
    }

    #[test]
    fn stable_under_input_key_reordering() {
        // Building the same object with keys in different insertion
        // orders must canonicalize identically.
        let a: Value = serde_json::from_str(r#"{"b":2,"a":1,"nested":{"y":0,"x":[3,2,1]}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"nested":{"x":[3,2,1],"y":0},"a":1,"b":2}"#).unwrap();
        assert_eq!(canonical_bytes(&a).unwrap(), canonical_bytes(&b).unwrap());
    }

    #[test]
    fn array_order_is_preserved() {
        let v: Value = serde_json::from_str(r#"{"list":[3,1,2]}"#).unwrap();
        let text = String::from_utf8(canonical_bytes(&v).unwrap()).unwrap();
        assert_eq!(text, r#"{"list":[3,1,2]}"#);
    }

    #[test]
    fn signature_removed_not_blanked() {
        let bytes = canonical_entry_bytes(&entry()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(!text.contains("signature"));
        // Draft and signed entry canonicalize identically.
        let mut draft = entry();
        draft.signature = String::new();
        assert_eq!(
            canonical_entry_bytes(&entry()).unwrap(),
            canonical_entry_bytes(&draft).unwrap()
        );
    }

    #[test]
    fn scalars_kept_verbatim() {
        let v: Value = serde_json::from_str(r#"{"f":1.3,"i":-7,"s":"x","t":true,"n":null}"#).unwrap();
        let text = String::from_utf8(canonical_bytes(&v).unwrap()).unwrap();
        assert_eq!(text, r#"{"f":1.3,"i":-7,"n":null,"s":"x","t":true}"#);
    }
}
