pub mod config;
pub mod crypto;
pub mod error;
pub mod storage;
pub mod vault;


mod types;

pub use config::VaultConfig;
pub use error::{Result, VaultError};
pub use types::*;
pub use vault::Vault;
