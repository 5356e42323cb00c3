pub mod errors;
pub mod file;
pub mod issuer;

pub use errors::CredentialFileError;
pub use file::CredentialFile;
pub use file::RememberedSession;
pub use issuer::SessionToken;
pub use issuer::TokenIssuer;
