mod upload;
mod verify;

use std::sync::Arc;

use tracing::{info, warn};

use crate::crypto::Encryptor;
use crate::storage::{MemoryStore, MetadataStore, Payload};
use crate::{FileRecord, Result, StorageSummary, VaultConfig, VaultError};

pub use upload::{UploadEncryption, UploadRequest, UploadStage};
pub use verify::VerifyOutcome;

/// The data-handling core: upload, verify, list, delete and fetch content.
///
/// Every operation takes the acting owner explicitly; the HTTP layer passes the
/// configured placeholder identity.
#[derive(Clone)]
pub struct Vault {
    store: Arc<dyn MetadataStore>,
    encryptor: Encryptor,
}

impl Vault {
    pub fn new(store: Arc<dyn MetadataStore>, encryptor: Encryptor) -> Self {
        Self { store, encryptor }
    }

    /// In-memory vault configured from `config`.
    pub fn in_memory(config: &VaultConfig) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Encryptor::new(config.kdf_iterations),
        )
    }

    pub async fn list(&self, owner_id: &str) -> Result<Vec<FileRecord>> {
        self.store.list(owner_id).await
    }

    pub async fn delete(&self, id: u64, owner_id: &str) -> Result<()> {
        if self.store.delete(id, owner_id).await? {
            info!(id, "file deleted");
            Ok(())
        } else {
            warn!(id, "delete target missing or not owned by caller");
            Err(VaultError::NotFound("File not found".to_string()))
        }
    }

    /// Stored bytes of a record, as uploaded (ciphertext for encrypted files).
    pub async fn content(&self, id: u64, owner_id: &str) -> Result<(FileRecord, Payload)> {
        self.store
            .payload(id, owner_id)
            .await?
            .ok_or_else(|| VaultError::NotFound("File not found".to_string()))
    }

    pub async fn summary(&self, owner_id: &str) -> Result<StorageSummary> {
        self.store.summary(owner_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> Vault {
        Vault::in_memory(&VaultConfig::default().with_kdf_iterations(1_000))
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let vault = vault();
        let result = vault.delete(1, "default-user").await;
        assert!(matches!(result, Err(VaultError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_content_of_other_owner_is_not_found() {
        let vault = vault();
        let record = vault
            .upload(UploadRequest::plain("a.txt", b"abc".to_vec()), "alice")
            .await
            .unwrap();

        assert!(matches!(
            vault.content(record.id, "bob").await,
            Err(VaultError::NotFound(_))
        ));
        let (_, payload) = vault.content(record.id, "alice").await.unwrap();
        assert_eq!(payload.data, b"abc");
    }
}
