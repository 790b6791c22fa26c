//! Content-addressed cache key generation.

use sha2::{Digest, Sha256};

/// Compute the storage digest for a request key.
///
/// Hex-encoded SHA-256 of the key's UTF-8 bytes. No salt is mixed in, so a
/// cache written by one run can be replayed by another.
pub fn request_digest(request_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request_key.as_bytes());
    hex::encode(hasher.finalize())
}
