pub mod encryption;
pub mod hashing;
pub mod password;

pub use encryption::{EncryptedPayload, Encryptor, Envelope};
pub use hashing::digest;
