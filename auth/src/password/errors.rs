use thiserror::Error;

/// Error type for password hash operations.
///
/// A parse or decode failure on a stored hash is always an error, distinct
/// from a wrong password (which verifies to `false` without an error).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HashError {
    #[error("invalid password hash format")]
    InvalidFormat,

    #[error("unsupported hash algorithm `{0}`")]
    AlgorithmMismatch(String),

    #[error("unsupported key derivation version `{0}`")]
    VersionMismatch(u32),

    #[error("invalid hash parameters: {0}")]
    InvalidParams(String),

    #[error("key derivation failed: {0}")]
    DerivationFailed(String),
}
