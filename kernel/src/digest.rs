//! Content digests with domain separation.
//!
//! Algorithm: SHA-256. Format: `"sha256:<hex_digest>"`.
//!
//! Every digest is computed over `domain || data`. Domain prefixes are
//! null-terminated so no prefix is a prefix of another.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// A content-addressed hash with algorithm identifier.
///
/// Invariant: the inner string always contains exactly one `:` separator,
/// with non-empty substrings on both sides (enforced by [`ContentHash::parse`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContentHash {
    full: String,
    #[serde(skip)]
    colon: usize,
}

impl ContentHash {
    /// Parse from `"algorithm:hex"` format.
    ///
    /// Returns `None` if the format is invalid (missing colon,
    /// empty algorithm, or empty digest).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let colon = s.find(':')?;
        if colon == 0 || colon == s.len() - 1 || s[colon + 1..].contains(':') {
            return None;
        }
        Some(Self {
            full: s.to_string(),
            colon,
        })
    }

    /// The algorithm portion (e.g., "sha256").
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.full[..self.colon]
    }

    /// The hex digest portion.
    #[must_use]
    pub fn hex_digest(&self) -> &str {
        &self.full[self.colon + 1..]
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

/// Domain prefix for serialized thought trees.
pub const DOMAIN_THOUGHT_TREE: &[u8] = b"THICKET::THOUGHT_TREE::V1\0";

/// Domain prefix for serialized search results.
pub const DOMAIN_SEARCH_RESULT: &[u8] = b"THICKET::SEARCH_RESULT::V1\0";

/// Domain prefix for serialized search requests.
pub const DOMAIN_SEARCH_REQUEST: &[u8] = b"THICKET::SEARCH_REQUEST::V1\0";

/// Every domain prefix in use. Lock tests keep this list honest.
pub const ALL_DOMAINS: &[&[u8]] = &[
    DOMAIN_THOUGHT_TREE,
    DOMAIN_SEARCH_RESULT,
    DOMAIN_SEARCH_REQUEST,
];

/// Compute the SHA-256 digest of `data` under `domain`.
#[must_use]
pub fn canonical_hash(domain: &[u8], data: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    let hex_digest = hex::encode(hasher.finalize());
    ContentHash {
        colon: "sha256".len(),
        full: format!("sha256:{hex_digest}"),
    }
}
