//! Password-based authenticated encryption.
//!
//! A 256-bit key is derived from the password with PBKDF2-HMAC-SHA256 over a fresh
//! random salt, then the content is sealed with AES-256-GCM under a fresh random nonce.
//! The salt and nonce are public and travel next to the ciphertext.

use aes_gcm::{aead::Aead, Aes256Gcm, Key, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Result, VaultError};

pub const KDF_ITERATIONS: u32 = 100_000;
pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;

/// Public parameters needed to decrypt a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
}

impl Envelope {
    pub fn generate() -> Self {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut nonce);
        Self { salt, nonce }
    }

    /// Parse the browser wire form: comma-separated decimal bytes for `iv` and `salt`.
    pub fn from_wire(iv: &str, salt: &str) -> Result<Self> {
        Ok(Self {
            salt: parse_byte_list("salt", salt)?,
            nonce: parse_byte_list("iv", iv)?,
        })
    }

    pub fn iv_wire(&self) -> String {
        encode_byte_list(&self.nonce)
    }

    pub fn salt_wire(&self) -> String {
        encode_byte_list(&self.salt)
    }
}

#[derive(Debug, Clone)]
pub struct EncryptedPayload {
    pub ciphertext: Vec<u8>,
    pub envelope: Envelope,
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct DerivedKey([u8; 32]);

#[derive(Debug, Clone, Copy)]
pub struct Encryptor {
    iterations: u32,
}

impl Default for Encryptor {
    fn default() -> Self {
        Self {
            iterations: KDF_ITERATIONS,
        }
    }
}

impl Encryptor {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    fn derive_key(&self, password: &str, salt: &[u8; SALT_LEN]) -> DerivedKey {
        let mut key = DerivedKey([0u8; 32]);
        pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, self.iterations, &mut key.0);
        key
    }

    /// Encrypt under a freshly generated salt and nonce.
    pub fn encrypt(&self, data: &[u8], password: &str) -> Result<EncryptedPayload> {
        self.encrypt_with(data, password, Envelope::generate())
    }

    fn encrypt_with(
        &self,
        data: &[u8],
        password: &str,
        envelope: Envelope,
    ) -> Result<EncryptedPayload> {
        let key = self.derive_key(password, &envelope.salt);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));
        let nonce = Nonce::from_slice(&envelope.nonce);

        let ciphertext = cipher
            .encrypt(nonce, data)
            .map_err(|err| VaultError::Crypto(format!("Encryption failed: {}", err)))?;

        Ok(EncryptedPayload {
            ciphertext,
            envelope,
        })
    }

    /// Inverse of [`Encryptor::encrypt`]. A wrong password or any modification of the
    /// ciphertext yields [`VaultError::Authentication`], never plaintext.
    pub fn decrypt(&self, ciphertext: &[u8], password: &str, envelope: &Envelope) -> Result<Vec<u8>> {
        let key = self.derive_key(password, &envelope.salt);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));
        let nonce = Nonce::from_slice(&envelope.nonce);

        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| VaultError::Authentication)
    }
}

fn encode_byte_list(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_byte_list<const N: usize>(field: &str, value: &str) -> Result<[u8; N]> {
    let bytes = value
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<std::result::Result<Vec<u8>, _>>()
        .map_err(|_| VaultError::Validation(format!("Malformed {}: expected comma-separated bytes", field)))?;

    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| VaultError::Validation(format!("Malformed {}: expected {} bytes, got {}", field, N, len)))
}
