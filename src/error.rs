use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Decryption failed: wrong password or tampered ciphertext")]
    Authentication,
    #[error("Encryption error: {0}")]
    Crypto(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// HTTP status an API surface should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            VaultError::Validation(_) => 400,
            VaultError::Conflict(_) => 409,
            VaultError::NotFound(_) => 404,
            VaultError::Authentication
            | VaultError::Crypto(_)
            | VaultError::Io(_)
            | VaultError::Internal(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(VaultError::Validation("no file".into()).status_code(), 400);
        assert_eq!(VaultError::Conflict("dup".into()).status_code(), 409);
        assert_eq!(VaultError::NotFound("gone".into()).status_code(), 404);
        assert_eq!(VaultError::Internal("boom".into()).status_code(), 500);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(VaultError::from(io).status_code(), 500);
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = VaultError::Validation("No file provided".into());
        assert_eq!(err.to_string(), "No file provided");
    }
}
