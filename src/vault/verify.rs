use serde::{Deserialize, Serialize};
use tracing::info;

use super::upload::hash_blocking;
use super::Vault;
use crate::{ContentDigest, FileRecord, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileRecord>,
    pub hash: ContentDigest,
}

impl Vault {
    /// Digest membership check only. Passwords are never involved, so an encrypted
    /// record matches as long as it was registered under its plaintext digest.
    pub async fn verify(&self, data: Vec<u8>) -> Result<VerifyOutcome> {
        let (hash, _) = hash_blocking(data).await?;
        let file = self.store.find_by_hash(&hash).await?;

        info!(hash = %hash, verified = file.is_some(), "file verified");
        Ok(VerifyOutcome {
            verified: file.is_some(),
            file,
            hash,
        })
    }
}
