use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::VaultError;

/// SHA-256 digest of a file's original bytes, the vault's content identity key.
///
/// Serialized as 64 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest(pub [u8; 32]);

impl ContentDigest {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a hex digest as supplied by a client. Upper case is accepted.
    pub fn from_hex(s: &str) -> Result<Self, VaultError> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| VaultError::Validation(format!("Invalid hash: {}", e)))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| VaultError::Validation("Invalid hash: expected 32 bytes".to_string()))?;
        Ok(Self(arr))
    }
}

impl FromStr for ContentDigest {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = VaultError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<ContentDigest> for String {
    fn from(digest: ContentDigest) -> Self {
        digest.to_hex()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({}...)", &self.to_hex()[..8])
    }
}
