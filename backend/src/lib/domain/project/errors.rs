use thiserror::Error;

use crate::domain::account::errors::StoreError;
use crate::domain::authorization::errors::AccessError;

/// Error for ProjectId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for unknown visibility strings
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VisibilityError {
    #[error("Unknown project visibility `{0}`")]
    Unknown(String),
}

/// Top-level error for project operations.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("project store error: {0}")]
    Store(#[from] StoreError),
}
