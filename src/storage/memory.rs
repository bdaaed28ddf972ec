use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::crypto::Envelope;
use crate::{ContentDigest, FileRecord, NewFileRecord, Result, StorageSummary, VaultError};

/// Bytes kept for a record: the plaintext, or the ciphertext plus its envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub data: Vec<u8>,
    pub envelope: Option<Envelope>,
}

impl Payload {
    pub fn plain(data: Vec<u8>) -> Self {
        Self { data, envelope: None }
    }

    pub fn encrypted(data: Vec<u8>, envelope: Envelope) -> Self {
        Self {
            data,
            envelope: Some(envelope),
        }
    }
}

#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Records owned by `owner_id`. Callers must not rely on the order.
    async fn list(&self, owner_id: &str) -> Result<Vec<FileRecord>>;
    async fn find_by_hash(&self, digest: &ContentDigest) -> Result<Option<FileRecord>>;
    /// Insert without any uniqueness check; the caller has already looked the digest up.
    async fn create(&self, record: NewFileRecord, payload: Payload) -> Result<FileRecord>;
    /// Lookup and insert under one lock. Fails with `Conflict` if the digest is taken.
    async fn create_unique(&self, record: NewFileRecord, payload: Payload) -> Result<FileRecord>;
    async fn delete(&self, id: u64, owner_id: &str) -> Result<bool>;
    async fn payload(&self, id: u64, owner_id: &str) -> Result<Option<(FileRecord, Payload)>>;
    async fn summary(&self, owner_id: &str) -> Result<StorageSummary>;
}

struct StoredFile {
    record: FileRecord,
    payload: Payload,
}

struct Inner {
    files: BTreeMap<u64, StoredFile>,
    next_id: u64,
}

impl Inner {
    fn find_by_hash(&self, digest: &ContentDigest) -> Option<&FileRecord> {
        self.files
            .values()
            .map(|stored| &stored.record)
            .find(|record| record.hash == *digest)
    }

    fn insert(&mut self, record: NewFileRecord, payload: Payload) -> FileRecord {
        let id = self.next_id;
        self.next_id += 1;

        let record = record.into_record(id, Utc::now());
        self.files.insert(
            id,
            StoredFile {
                record: record.clone(),
                payload,
            },
        );
        debug!(id, hash = %record.hash, "record inserted");
        record
    }

    fn owned(&self, id: u64, owner_id: &str) -> Option<&StoredFile> {
        self.files
            .get(&id)
            .filter(|stored| stored.record.user_id == owner_id)
    }
}

/// Process-local store. Ids start at 1 and are never reused, even after deletes.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                files: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn list(&self, owner_id: &str) -> Result<Vec<FileRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .files
            .values()
            .filter(|stored| stored.record.user_id == owner_id)
            .map(|stored| stored.record.clone())
            .collect())
    }

    async fn find_by_hash(&self, digest: &ContentDigest) -> Result<Option<FileRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.find_by_hash(digest).cloned())
    }

    async fn create(&self, record: NewFileRecord, payload: Payload) -> Result<FileRecord> {
        let mut inner = self.inner.lock().await;
        Ok(inner.insert(record, payload))
    }

    async fn create_unique(&self, record: NewFileRecord, payload: Payload) -> Result<FileRecord> {
        let mut inner = self.inner.lock().await;
        if let Some(existing) = inner.find_by_hash(&record.hash) {
            return Err(VaultError::Conflict(format!(
                "File already exists (id {})",
                existing.id
            )));
        }
        Ok(inner.insert(record, payload))
    }

    async fn delete(&self, id: u64, owner_id: &str) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        if inner.owned(id, owner_id).is_none() {
            return Ok(false);
        }
        inner.files.remove(&id);
        Ok(true)
    }

    async fn payload(&self, id: u64, owner_id: &str) -> Result<Option<(FileRecord, Payload)>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .owned(id, owner_id)
            .map(|stored| (stored.record.clone(), stored.payload.clone())))
    }

    async fn summary(&self, owner_id: &str) -> Result<StorageSummary> {
        let inner = self.inner.lock().await;
        let owned = inner
            .files
            .values()
            .filter(|stored| stored.record.user_id == owner_id);

        let mut summary = StorageSummary {
            file_count: 0,
            storage_used: 0,
        };
        for stored in owned {
            summary.file_count += 1;
            summary.storage_used += stored.record.size;
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::digest;
    use std::sync::Arc;

    fn new_record(content: &[u8], owner: &str) -> NewFileRecord {
        NewFileRecord {
            name: "file.txt".to_string(),
            size: content.len() as u64,
            mime_type: "text/plain".to_string(),
            hash: digest(content),
            encrypted: false,
            user_id: owner.to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_never_reused() {
        let store = MemoryStore::new();
        let a = store.create(new_record(b"a", "u"), Payload::plain(b"a".to_vec())).await.unwrap();
        let b = store.create(new_record(b"b", "u"), Payload::plain(b"b".to_vec())).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        assert!(store.delete(b.id, "u").await.unwrap());
        let c = store.create(new_record(b"c", "u"), Payload::plain(b"c".to_vec())).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn test_upload_date_assigned_by_store() {
        let store = MemoryStore::new();
        let before = Utc::now();
        let record = store.create(new_record(b"x", "u"), Payload::plain(vec![])).await.unwrap();
        assert!(record.upload_date >= before);
        assert!(record.upload_date <= Utc::now());
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_owner() {
        let store = MemoryStore::new();
        store.create(new_record(b"1", "alice"), Payload::plain(vec![])).await.unwrap();
        store.create(new_record(b"2", "bob"), Payload::plain(vec![])).await.unwrap();
        store.create(new_record(b"3", "alice"), Payload::plain(vec![])).await.unwrap();

        let alice = store.list("alice").await.unwrap();
        assert_eq!(alice.len(), 2);
        assert!(alice.iter().all(|r| r.user_id == "alice"));
        assert!(store.list("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_hash() {
        let store = MemoryStore::new();
        let created = store.create(new_record(b"hello", "u"), Payload::plain(vec![])).await.unwrap();

        let found = store.find_by_hash(&digest(b"hello")).await.unwrap();
        assert_eq!(found, Some(created));
        assert_eq!(store.find_by_hash(&digest(b"other")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_requires_matching_owner() {
        let store = MemoryStore::new();
        let record = store.create(new_record(b"x", "alice"), Payload::plain(vec![])).await.unwrap();

        assert!(!store.delete(record.id, "bob").await.unwrap());
        assert_eq!(store.list("alice").await.unwrap().len(), 1);

        assert!(!store.delete(999, "alice").await.unwrap());
        assert!(store.delete(record.id, "alice").await.unwrap());
        assert!(store.list("alice").await.unwrap().is_empty());
        assert!(!store.delete(record.id, "alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_unique_rejects_taken_digest() {
        let store = MemoryStore::new();
        store.create_unique(new_record(b"same", "u"), Payload::plain(vec![])).await.unwrap();
        let second = store.create_unique(new_record(b"same", "u"), Payload::plain(vec![])).await;
        assert!(matches!(second, Err(VaultError::Conflict(_))));
        assert_eq!(store.list("u").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_create_unique_admits_one() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .create_unique(new_record(b"race", "u"), Payload::plain(vec![]))
                    .await
                    .is_ok()
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(store.list("u").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_payload_and_summary() {
        let store = MemoryStore::new();
        let record = store
            .create(new_record(b"abc", "u"), Payload::plain(b"abc".to_vec()))
            .await
            .unwrap();
        store.create(new_record(b"de", "u"), Payload::plain(b"de".to_vec())).await.unwrap();

        let (found, payload) = store.payload(record.id, "u").await.unwrap().unwrap();
        assert_eq!(found.id, record.id);
        assert_eq!(payload.data, b"abc");
        assert!(store.payload(record.id, "someone-else").await.unwrap().is_none());

        let summary = store.summary("u").await.unwrap();
        assert_eq!(summary.file_count, 2);
        assert_eq!(summary.storage_used, 5);
    }
}
