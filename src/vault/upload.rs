use std::fmt;

use tracing::{debug, info, warn};

use super::Vault;
use crate::crypto::{self, Envelope};
use crate::storage::Payload;
use crate::{ContentDigest, FileRecord, MimeDetector, NewFileRecord, Result, VaultError};

/// How the bytes of an upload relate to encryption.
#[derive(Debug, Clone)]
pub enum UploadEncryption {
    /// Plaintext, stored as is.
    None,
    /// Plaintext the vault encrypts with the transmitted password before storing.
    Server { password: String },
    /// Ciphertext the client produced itself. `plaintext_digest` identifies the
    /// original content; without it the ciphertext is hashed instead.
    Client {
        envelope: Envelope,
        plaintext_digest: Option<ContentDigest>,
        zero_knowledge: bool,
    },
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    pub encryption: UploadEncryption,
}

impl UploadRequest {
    pub fn plain(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            data,
            encryption: UploadEncryption::None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_encryption(mut self, encryption: UploadEncryption) -> Self {
        self.encryption = encryption;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    Hashing,
    DuplicateCheck,
    Rejected,
    Encrypting,
    Stored,
    Responded,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStage::Received => "received",
            UploadStage::Hashing => "hashing",
            UploadStage::DuplicateCheck => "duplicate-check",
            UploadStage::Rejected => "rejected",
            UploadStage::Encrypting => "encrypting",
            UploadStage::Stored => "stored",
            UploadStage::Responded => "responded",
        };
        f.write_str(name)
    }
}

fn enter(name: &str, stage: UploadStage) {
    debug!(file = name, %stage, "upload stage");
}

impl Vault {
    /// Hash, reject duplicates, optionally encrypt, then store.
    ///
    /// The digest always identifies the original content, so a later verify against
    /// the user's plaintext copy matches even when the stored bytes are ciphertext.
    pub async fn upload(&self, request: UploadRequest, owner_id: &str) -> Result<FileRecord> {
        let UploadRequest {
            name,
            content_type,
            data,
            encryption,
        } = request;
        enter(&name, UploadStage::Received);

        enter(&name, UploadStage::Hashing);
        let (digest, data) = match &encryption {
            UploadEncryption::Client {
                plaintext_digest: Some(digest),
                ..
            } => (*digest, data),
            _ => hash_blocking(data).await?,
        };

        enter(&name, UploadStage::DuplicateCheck);
        if let Some(existing) = self.store.find_by_hash(&digest).await? {
            enter(&name, UploadStage::Rejected);
            warn!(file = %name, hash = %digest, existing = existing.id, "duplicate upload rejected");
            return Err(VaultError::Conflict("File already exists".to_string()));
        }

        let mime_type = MimeDetector::resolve(content_type.as_deref(), &data);
        let payload = match encryption {
            UploadEncryption::None => Payload::plain(data),
            UploadEncryption::Server { password } => {
                enter(&name, UploadStage::Encrypting);
                let encryptor = self.encryptor;
                let sealed = tokio::task::spawn_blocking(move || encryptor.encrypt(&data, &password))
                    .await
                    .map_err(|e| VaultError::Internal(format!("Encryption task failed: {}", e)))??;
                Payload::encrypted(sealed.ciphertext, sealed.envelope)
            }
            UploadEncryption::Client {
                envelope,
                zero_knowledge,
                ..
            } => {
                debug!(file = %name, zero_knowledge, "client-side ciphertext received");
                Payload::encrypted(data, envelope)
            }
        };

        let new_record = NewFileRecord {
            name: name.clone(),
            size: payload.data.len() as u64,
            mime_type,
            hash: digest,
            encrypted: payload.envelope.is_some(),
            user_id: owner_id.to_string(),
        };

        // The lookup above is repeated under the store lock, so a concurrent upload of
        // the same content that slipped in meanwhile still ends in a conflict.
        let record = match self.store.create_unique(new_record, payload).await {
            Ok(record) => record,
            Err(err) => {
                enter(&name, UploadStage::Rejected);
                return Err(err);
            }
        };
        enter(&name, UploadStage::Stored);

        info!(id = record.id, file = %record.name, size = record.size, encrypted = record.encrypted, "file uploaded");
        enter(&name, UploadStage::Responded);
        Ok(record)
    }
}

/// Hashing a large upload is CPU bound, keep it off the async workers.
pub(crate) async fn hash_blocking(data: Vec<u8>) -> Result<(ContentDigest, Vec<u8>)> {
    tokio::task::spawn_blocking(move || (crypto::digest(&data), data))
        .await
        .map_err(|e| VaultError::Internal(format!("Hashing task failed: {}", e)))
}
