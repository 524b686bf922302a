//! Content fingerprints for settings trees.
//!
//! The fingerprint covers the canonical JSON rendering of the tree. Tables
//! are ordered maps, so two trees with the same entries always hash equal
//! regardless of the file format or key order they were loaded from.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// A 32-byte SHA-256 settings hash.
pub type SettingsHash = [u8; 32];

/// Compute the SHA-256 hash of any serializable value.
pub fn content_hash<T: Serialize>(value: &T) -> Result<SettingsHash> {
    let json = serde_json::to_vec(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(hasher.finalize().into())
}

/// Format a hash as a hex string.
pub fn hash_hex(hash: &SettingsHash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_hash() {
        let h1 = content_hash(&"Byte.Map").unwrap();
        let h2 = content_hash(&"Byte.Map").unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn different_inputs_different_hash() {
        let h1 = content_hash(&"Byte").unwrap();
        let h2 = content_hash(&"Int").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn hash_hex_format() {
        let h = content_hash(&true).unwrap();
        assert_eq!(hash_hex(&h).len(), 64);
    }
}
