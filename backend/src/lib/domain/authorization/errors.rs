use thiserror::Error;

/// Error for unknown permission level strings
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PermissionLevelError {
    #[error("Unknown permission level `{0}`")]
    Unknown(String),
}

/// Outcome signals for failed authorization checks.
///
/// The two variants are deliberately distinct so callers can tell "log in
/// first" from "you may not do this". Neither says which permission was
/// missing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("insufficient permissions")]
    InsufficientPermissions,
}
