use std::fmt;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Deserialize;
use serde::Serialize;

/// Raw entropy per token, in bytes.
const TOKEN_LENGTH: usize = 64;

/// An opaque remember-me session token.
///
/// Unpadded standard base64 over CSPRNG bytes. Valid for login only while it
/// is both in the local credential file and in the account's server-side
/// token list.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a token read back from storage.
    pub fn from_string(raw: String) -> Self {
        Self(raw)
    }

    /// Get the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume self and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

// Only a prefix ever reaches logs or panics.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = &self.0[..self.0.len().min(8)];
        write!(f, "SessionToken({prefix}…)")
    }
}

/// Generator for remember-me session tokens.
pub struct TokenIssuer;

impl TokenIssuer {
    pub fn new() -> Self {
        Self
    }

    /// Issue a fresh unguessable token.
    ///
    /// Fills a fixed-length buffer from the OS CSPRNG; always succeeds
    /// barring source exhaustion, which panics inside the RNG.
    pub fn issue(&self) -> SessionToken {
        let mut raw = [0u8; TOKEN_LENGTH];
        OsRng.fill_bytes(&mut raw);
        SessionToken(STANDARD_NO_PAD.encode(raw))
    }
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self::new()
    }
}
