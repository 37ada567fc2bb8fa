//! Cache key derivation for selector sets.
//!
//! Selector terms form an unordered collection: each term is digested on its
//! own, the digests are sorted, and the sorted list is digested again. Two
//! selector sets holding the same terms in any order share a key. Repeated
//! terms still count, so `[a, a]` and `[a]` get different keys.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex-encoded SHA-256 key for a selector set
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the order-independent key for a selector set
pub fn cache_key<T: Serialize>(terms: &[T]) -> Result<CacheKey, serde_json::Error> {
    let mut digests = terms
        .iter()
        .map(|term| serde_json::to_vec(term).map(|bytes| Sha256::digest(&bytes)))
        .collect::<Result<Vec<_>, _>>()?;
    digests.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update((digests.len() as u64).to_be_bytes());
    for digest in &digests {
        hasher.update(digest);
    }

    Ok(CacheKey(hex::encode(hasher.finalize())))
}
