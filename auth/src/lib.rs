//! Authentication utilities library
//!
//! Provides the credential primitives for the benchdb backend:
//! - Password hashing (Argon2id with a self-describing encoded form)
//! - Remember-me session tokens and the local credential file
//!
//! The backend defines its own ports around these implementations; this crate
//! carries no database or application types.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let encoded = hasher.encode("my_password").unwrap();
//! assert!(hasher.verify("my_password", &encoded).unwrap());
//! assert!(!hasher.verify("not_my_password", &encoded).unwrap());
//! ```
//!
//! ## Remember-Me Tokens
//! ```no_run
//! use auth::{CredentialFile, RememberedSession, TokenIssuer};
//!
//! let issuer = TokenIssuer::new();
//! let token = issuer.issue();
//!
//! let file = CredentialFile::new("/tmp/user_auth.toml");
//! file.store(&RememberedSession {
//!     account_id: "f6a8…".to_string(),
//!     token,
//! })
//! .unwrap();
//! let resumed = file.load().unwrap();
//! assert!(resumed.is_some());
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::HashError;
pub use password::HashParams;
pub use password::PasswordHasher;
pub use token::CredentialFile;
pub use token::CredentialFileError;
pub use token::RememberedSession;
pub use token::SessionToken;
pub use token::TokenIssuer;
