//! Checksums of migration SQL
//!
//! A migration whose SQL changed after it was applied is refused.

use sha2::{Digest, Sha256};

/// SHA-256 of a string, hex encoded
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
