use sha2::{Digest, Sha256};

use crate::ContentDigest;

/// SHA-256 over the complete content. Identical bytes always give the same digest.
pub fn digest(data: &[u8]) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    ContentDigest::from_bytes(hasher.finalize().into())
}
