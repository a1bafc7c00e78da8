//! Hashing utilities for content-addressed identifiers.
//!
//! This module provides:
//! - `ObjectHash`: a truncated 20-character hash used as a fragment-set or manifest id
//! - `hash_parts()`: hash an ordered list of string components

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::consts::OBJ_HASH_PREFIX_LEN;

/// A content-addressed hash identifying a unique object.
///
/// The hash is a 20-character truncated SHA-256 of the hashed parts, so
/// restarted or replicated processes derive identical ids.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string, e.g., `"a1b2c3d4e5f6789012ab"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectHash(pub String);

impl std::fmt::Display for ObjectHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Hash an ordered sequence of string parts.
///
/// Each part is length-prefixed so that `["ab", "c"]` and `["a", "bc"]`
/// produce different hashes.
pub fn hash_parts<I, S>(parts: I) -> ObjectHash
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut hasher = Sha256::new();
  for part in parts {
    let part = part.as_ref();
    hasher.update((part.len() as u64).to_le_bytes());
    hasher.update(part.as_bytes());
  }
  truncate(hasher.finalize())
}

fn truncate(digest: impl std::fmt::LowerHex) -> ObjectHash {
  let full = format!("{:x}", digest);
  ObjectHash(full[..OBJ_HASH_PREFIX_LEN].to_string())
}
