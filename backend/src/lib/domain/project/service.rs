use std::sync::Arc;

use crate::domain::account::models::AccountId;
use crate::domain::authorization::errors::AccessError;
use crate::domain::authorization::guard::AuthorizationGuard;
use crate::domain::authorization::models::PermissionLevel;
use crate::domain::authorization::ports::PermissionStore;
use crate::domain::project::errors::ProjectError;
use crate::domain::project::models::NewProject;
use crate::domain::project::models::NewSample;
use crate::domain::project::models::Project;
use crate::domain::project::models::ProjectId;
use crate::domain::project::models::ProjectWithPermission;
use crate::domain::project::ports::ProjectRepository;

/// Permission levels allowed to add content to a project.
const WRITE_LEVELS: [PermissionLevel; 3] = [
    PermissionLevel::Owner,
    PermissionLevel::Admin,
    PermissionLevel::ReadWrite,
];

/// Permission levels allowed to manage other accounts' grants.
const GRANT_LEVELS: [PermissionLevel; 2] = [PermissionLevel::Owner, PermissionLevel::Admin];

/// Project operations, each gated by the authorization guard before any
/// mutating work happens.
pub struct ProjectService<PR, PS>
where
    PR: ProjectRepository,
    PS: PermissionStore,
{
    repository: Arc<PR>,
    guard: Arc<AuthorizationGuard<PS>>,
}

impl<PR, PS> ProjectService<PR, PS>
where
    PR: ProjectRepository,
    PS: PermissionStore,
{
    pub fn new(repository: Arc<PR>, guard: Arc<AuthorizationGuard<PS>>) -> Self {
        Self { repository, guard }
    }

    /// Create a project owned by the current account.
    ///
    /// The project row and the creator's `Owner` grant are written in one
    /// transaction by the repository.
    ///
    /// # Errors
    /// * `Access(NotAuthenticated)` - No one is logged in
    /// * `Store` - Repository failure; nothing was created
    pub async fn create_project(&self, new: NewProject) -> Result<ProjectId, ProjectError> {
        let creator = self.guard.require_authenticated().await?;

        let project = Project {
            id: ProjectId::new(),
            creator,
            label: new.label,
            description: new.description,
            visibility: new.visibility,
        };
        self.repository.create_with_owner(&project).await?;

        tracing::info!(project = %project.id, creator = %creator, "project created");
        Ok(project.id)
    }

    /// Add samples to a project.
    ///
    /// The permission check resolves before any write; an empty batch is a
    /// no-op after the check.
    ///
    /// # Errors
    /// * `Access` - Not authenticated, or no write-level grant on the project
    /// * `Store` - Repository failure; no partial batch is left behind
    pub async fn create_samples(
        &self,
        project: &ProjectId,
        samples: Vec<NewSample>,
    ) -> Result<(), ProjectError> {
        let creator = self.guard.require_permission(project, &WRITE_LEVELS).await?;

        if samples.is_empty() {
            return Ok(());
        }

        self.repository
            .insert_samples(project, &creator, &samples)
            .await?;

        tracing::info!(project = %project, count = samples.len(), "samples created");
        Ok(())
    }

    /// Grant or update another account's permission on a project.
    ///
    /// # Errors
    /// * `Access` - Not authenticated, or caller holds neither owner nor
    ///   admin on the project
    /// * `Store` - Repository failure
    pub async fn grant_permission(
        &self,
        project: &ProjectId,
        account: &AccountId,
        level: PermissionLevel,
    ) -> Result<(), ProjectError> {
        self.guard.require_permission(project, &GRANT_LEVELS).await?;

        self.repository
            .set_permission(project, account, level)
            .await?;

        tracing::info!(project = %project, account = %account, level = %level, "permission granted");
        Ok(())
    }

    /// Fetch a project together with the caller's permission on it.
    ///
    /// # Returns
    /// `None` when no such project exists
    ///
    /// # Errors
    /// * `Access` - Not authenticated, or the caller holds no grant on an
    ///   existing project
    /// * `Store` - Repository failure
    pub async fn project_with_permission(
        &self,
        id: &ProjectId,
    ) -> Result<Option<ProjectWithPermission>, ProjectError> {
        self.guard.require_authenticated().await?;

        let Some(project) = self.repository.find(id).await? else {
            return Ok(None);
        };

        let Some(permission) = self.guard.permission_on(id).await? else {
            return Err(ProjectError::Access(AccessError::InsufficientPermissions));
        };

        Ok(Some(ProjectWithPermission {
            project,
            permission,
        }))
    }

    /// All projects created by the current account.
    pub async fn my_projects(&self) -> Result<Vec<Project>, ProjectError> {
        let account = self.guard.require_authenticated().await?;
        Ok(self.repository.list_created_by(&account).await?)
    }
}
