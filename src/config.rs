use serde::{Deserialize, Serialize};

use crate::crypto::encryption::KDF_ITERATIONS;

pub const DEFAULT_OWNER_ID: &str = "default-user";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Runtime settings of a vault instance.
///
/// There is no authentication, every request acts as `owner_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub owner_id: String,
    pub max_upload_bytes: u64,
    pub kdf_iterations: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            owner_id: DEFAULT_OWNER_ID.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            kdf_iterations: KDF_ITERATIONS,
        }
    }
}

impl VaultConfig {
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}
