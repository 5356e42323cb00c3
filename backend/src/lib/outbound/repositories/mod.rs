pub mod credential;
pub mod permission;
pub mod project;

pub use credential::PostgresCredentialStore;
pub use permission::PostgresPermissionStore;
pub use project::PostgresProjectRepository;
