use thiserror::Error;

use crate::domain::account::errors::StoreError;
use crate::domain::account::models::AccountId;
use crate::domain::authorization::errors::AccessError;

/// Error type for mail delivery.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    #[error("mail settings unavailable: {0}")]
    Settings(String),

    #[error("invalid mail address: {0}")]
    InvalidAddress(String),

    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// Top-level error for account management operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("password hashing failed: {0}")]
    Hash(#[from] auth::HashError),

    /// The account exists and can log in; only the notification failed.
    #[error("welcome mail not sent for account {account_id}: {reason}")]
    WelcomeMailNotSent {
        account_id: AccountId,
        reason: String,
    },
}
