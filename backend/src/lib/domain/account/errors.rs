use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for unknown role strings
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role `{0}`")]
    Unknown(String),
}

/// Error for unknown account status strings
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountStatusError {
    #[error("Unknown account status `{0}`")]
    Unknown(String),
}

/// Error for credential and permission store operations.
///
/// Always an infrastructure failure; "row not found" is an `Option`, not an
/// error.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("stored row is invalid: {0}")]
    InvalidRow(String),
}

/// Top-level error for authentication flows.
///
/// Authentication outcomes (unknown email, wrong password, stale token) are
/// never represented here; they surface as empty results so callers cannot
/// tell them apart. These variants are genuine infrastructure failures or
/// data corruption.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("stored password hash is invalid: {0}")]
    Hash(#[from] auth::HashError),

    #[error("local credential file error: {0}")]
    CredentialFile(#[from] auth::CredentialFileError),
}
