use std::fs;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tempfile::NamedTempFile;

use super::errors::CredentialFileError;
use super::issuer::SessionToken;

/// On-disk shape of the remembered session: exactly one account/token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RememberedSession {
    pub account_id: String,
    pub token: SessionToken,
}

/// The single local remember-me credential file.
///
/// Signing in again with remember enabled replaces the file wholesale; there
/// is never more than one remembered session per machine.
pub struct CredentialFile {
    path: PathBuf,
}

impl CredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file with the given session.
    ///
    /// The document is written to a temp file in the destination directory
    /// and renamed into place, so a partially written file can never be read
    /// back as a valid session.
    ///
    /// # Errors
    /// * `Serialize` - Session could not be encoded as TOML
    /// * `Io` - Temp file creation, write, or rename failed
    pub fn store(&self, session: &RememberedSession) -> Result<(), CredentialFileError> {
        let document =
            toml::to_string(session).map_err(|e| CredentialFileError::Serialize(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(document.as_bytes())?;
        file.persist(&self.path)
            .map_err(|e| CredentialFileError::Io(e.error))?;
        Ok(())
    }

    /// Read the remembered session, if any.
    ///
    /// # Returns
    /// `None` when the file does not exist; that is the normal "no session
    /// to resume" state, not an error.
    ///
    /// # Errors
    /// * `Malformed` - File exists but is not a valid session document
    /// * `Io` - File exists but could not be read
    pub fn load(&self) -> Result<Option<RememberedSession>, CredentialFileError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CredentialFileError::Io(e)),
        };

        let session =
            toml::from_str(&raw).map_err(|e| CredentialFileError::Malformed(e.to_string()))?;
        Ok(Some(session))
    }

    /// Delete the file. Absence is not an error.
    pub fn remove(&self) -> Result<(), CredentialFileError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CredentialFileError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::token::TokenIssuer;

    fn session(account_id: &str) -> RememberedSession {
        RememberedSession {
            account_id: account_id.to_string(),
            token: TokenIssuer::new().issue(),
        }
    }

    #[test]
    fn test_store_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let file = CredentialFile::new(dir.path().join("user_auth.toml"));

        let stored = session("account-1");
        file.store(&stored).expect("store failed");

        let loaded = file.load().expect("load failed").expect("file missing");
        assert_eq!(loaded.account_id, stored.account_id);
        assert_eq!(loaded.token, stored.token);
    }

    #[test]
    fn test_load_absent_file_is_no_session() {
        let dir = TempDir::new().unwrap();
        let file = CredentialFile::new(dir.path().join("user_auth.toml"));
        assert!(file.load().expect("load failed").is_none());
    }

    #[test]
    fn test_store_replaces_previous_session() {
        let dir = TempDir::new().unwrap();
        let file = CredentialFile::new(dir.path().join("user_auth.toml"));

        file.store(&session("account-1")).unwrap();
        let replacement = session("account-2");
        file.store(&replacement).unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.account_id, "account-2");
        assert_eq!(loaded.token, replacement.token);
    }

    #[test]
    fn test_malformed_content_is_distinct_from_absence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("user_auth.toml");
        fs::write(&path, "account_id = \"dangling").unwrap();

        let result = CredentialFile::new(&path).load();
        assert!(matches!(result, Err(CredentialFileError::Malformed(_))));
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("user_auth.toml");
        fs::write(&path, "account_id = \"account-1\"\n").unwrap();

        let result = CredentialFile::new(&path).load();
        assert!(matches!(result, Err(CredentialFileError::Malformed(_))));
    }

    #[test]
    fn test_remove_absent_file_is_ok() {
        let dir = TempDir::new().unwrap();
        let file = CredentialFile::new(dir.path().join("user_auth.toml"));
        file.remove().expect("remove of absent file errored");
    }

    #[test]
    fn test_remove_deletes_file() {
        let dir = TempDir::new().unwrap();
        let file = CredentialFile::new(dir.path().join("user_auth.toml"));
        file.store(&session("account-1")).unwrap();

        file.remove().unwrap();
        assert!(file.load().unwrap().is_none());
    }
}
