use async_trait::async_trait;

use crate::domain::account::errors::StoreError;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::Role;
use crate::domain::authorization::models::PermissionLevel;
use crate::domain::project::models::ProjectId;

/// Port for role and per-resource permission lookups.
#[async_trait]
pub trait PermissionStore: Send + Sync + 'static {
    /// The account's application-level role.
    ///
    /// Missing and disabled accounts both resolve to `None`; a disabled
    /// account holds no effective role.
    async fn role(&self, account: &AccountId) -> Result<Option<Role>, StoreError>;

    /// The permission the account holds on the project, if any.
    ///
    /// A nonexistent project and an account with no grant both resolve to
    /// `None`.
    async fn resource_permission(
        &self,
        project: &ProjectId,
        account: &AccountId,
    ) -> Result<Option<PermissionLevel>, StoreError>;
}
