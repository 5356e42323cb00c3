use async_trait::async_trait;

use crate::domain::account::errors::StoreError;
use crate::domain::account::models::AccountId;
use crate::domain::authorization::models::PermissionLevel;
use crate::domain::project::models::NewSample;
use crate::domain::project::models::Project;
use crate::domain::project::models::ProjectId;

/// Persistence operations for projects and their permission grants.
#[async_trait]
pub trait ProjectRepository: Send + Sync + 'static {
    /// Insert the project and grant its creator `Owner`, in one transaction.
    ///
    /// Guarantees every project has at least one owner from creation.
    async fn create_with_owner(&self, project: &Project) -> Result<(), StoreError>;

    /// Insert samples into a project, all in one transaction.
    async fn insert_samples(
        &self,
        project: &ProjectId,
        creator: &AccountId,
        samples: &[NewSample],
    ) -> Result<(), StoreError>;

    /// Grant or update an account's permission on a project.
    async fn set_permission(
        &self,
        project: &ProjectId,
        account: &AccountId,
        level: PermissionLevel,
    ) -> Result<(), StoreError>;

    /// Fetch a project by id.
    async fn find(&self, id: &ProjectId) -> Result<Option<Project>, StoreError>;

    /// All projects created by the account, ordered by id.
    async fn list_created_by(&self, account: &AccountId) -> Result<Vec<Project>, StoreError>;
}
