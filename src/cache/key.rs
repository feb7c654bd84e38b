//! Cache key derivation
//!
//! A key identifies the cache entry for one mount on one branch under one
//! build matrix. It is the MD5 of the sorted input parts, so entries written
//! by earlier plugin versions keep resolving to the same file.

use md5::{Digest, Md5};
use std::collections::HashMap;
use std::fmt;

/// Lowercase hex MD5 digest identifying a cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Length of the hex representation
    pub const HEX_LEN: usize = 32;

    /// Derive the key for a mount on a branch with the given matrix axes
    ///
    /// The mount, the branch and one `KEY=VALUE` string per matrix entry are
    /// sorted byte-wise and fed to the digest in that order, with no
    /// separator. Matrix iteration order never affects the result.
    pub fn derive(mount: &str, branch: &str, matrix: &HashMap<String, String>) -> Self {
        let mut parts: Vec<String> = Vec::with_capacity(matrix.len() + 2);
        parts.push(mount.to_string());
        parts.push(branch.to_string());
        parts.extend(matrix.iter().map(|(key, value)| format!("{key}={value}")));
        parts.sort();

        let mut hasher = Md5::new();
        for part in &parts {
            hasher.update(part.as_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Parse a key from its hex form (as found in an entry file name)
    pub fn parse(s: &str) -> Option<Self> {
        let valid = s.len() == Self::HEX_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(s.to_string()))
    }

    /// The hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
