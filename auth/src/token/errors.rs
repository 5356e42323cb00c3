use thiserror::Error;

/// Error type for the local remember-me credential file.
///
/// Absence of the file is not represented here; it is a normal "no session"
/// result on load and a success on remove.
#[derive(Debug, Error)]
pub enum CredentialFileError {
    #[error("credential file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential file is malformed: {0}")]
    Malformed(String),

    #[error("could not serialize credential file: {0}")]
    Serialize(String),
}
