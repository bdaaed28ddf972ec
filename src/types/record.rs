use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContentDigest;

/// A file registered in the vault.
///
/// `id` and `upload_date` are assigned by the store at creation and never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: u64,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub hash: ContentDigest,
    pub encrypted: bool,
    pub upload_date: DateTime<Utc>,
    pub user_id: String,
}

/// Caller-supplied part of a record; the store fills in `id` and `upload_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFileRecord {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub hash: ContentDigest,
    pub encrypted: bool,
    pub user_id: String,
}

impl NewFileRecord {
    pub(crate) fn into_record(self, id: u64, upload_date: DateTime<Utc>) -> FileRecord {
        FileRecord {
            id,
            name: self.name,
            size: self.size,
            mime_type: self.mime_type,
            hash: self.hash,
            encrypted: self.encrypted,
            upload_date,
            user_id: self.user_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSummary {
    pub file_count: usize,
    pub storage_used: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_uses_camel_case_and_type_key() {
        let record = NewFileRecord {
            name: "a.txt".to_string(),
            size: 5,
            mime_type: "text/plain".to_string(),
            hash: ContentDigest::from_bytes([0; 32]),
            encrypted: false,
            user_id: "default-user".to_string(),
        }
        .into_record(1, Utc::now());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "text/plain");
        assert_eq!(json["userId"], "default-user");
        assert!(json.get("uploadDate").is_some());
        assert_eq!(json["hash"].as_str().unwrap().len(), 64);
    }
}
