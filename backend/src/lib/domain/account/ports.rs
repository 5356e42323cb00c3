use async_trait::async_trait;
use auth::SessionToken;

use crate::domain::account::errors::StoreError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountUpdate;
use crate::domain::account::models::CredentialRecord;

/// Port for durable account and credential storage.
///
/// Implementations must use parameterized queries only. "Not found" is an
/// `Option`, never an error; `StoreError` always means the store itself
/// failed.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Resolve an account by exact email match.
    ///
    /// # Returns
    /// Account if one exists with exactly this email, None otherwise
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Resolve an account by id.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, StoreError>;

    /// Fetch the credential record owned by an account.
    async fn credential(&self, id: &AccountId) -> Result<Option<CredentialRecord>, StoreError>;

    /// Append a token to the account's server-side token list.
    ///
    /// Never replaces existing tokens; each remembered device appends its
    /// own. A single-row atomic update.
    async fn append_token(&self, id: &AccountId, token: &SessionToken) -> Result<(), StoreError>;

    /// Remove one token from the server-side list.
    ///
    /// Removing a token that is not in the list is a no-op, not an error.
    async fn remove_token(&self, id: &AccountId, token: &SessionToken) -> Result<(), StoreError>;

    /// Insert the account row and its credential record as one atomic unit.
    ///
    /// Neither row exists if the transaction fails.
    async fn create_account(
        &self,
        account: &Account,
        password_hash: &str,
    ) -> Result<(), StoreError>;

    /// Replace the stored password hash.
    async fn set_password_hash(
        &self,
        id: &AccountId,
        password_hash: &str,
    ) -> Result<(), StoreError>;

    /// Update profile, role, and status in place.
    async fn update_account(&self, update: &AccountUpdate) -> Result<(), StoreError>;

    /// Disable the account and clear its token list, atomically.
    ///
    /// The account row is retained; only its ability to authenticate goes.
    async fn deactivate_account(&self, id: &AccountId) -> Result<(), StoreError>;

    /// All accounts ordered by id.
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;
}
