use std::sync::Arc;

use crate::domain::account::models::AccountId;
use crate::domain::account::models::Role;
use crate::domain::authorization::errors::AccessError;
use crate::domain::authorization::models::PermissionLevel;
use crate::domain::authorization::ports::PermissionStore;
use crate::domain::project::models::ProjectId;
use crate::domain::session::Session;

/// Gatekeeper for protected operations.
///
/// Every check resolves to one of three outcomes: granted (with the acting
/// account id), `NotAuthenticated`, or `InsufficientPermissions`. Lookup
/// failures and missing rows fail closed: they are logged and reported as
/// insufficient permissions, never as granted.
pub struct AuthorizationGuard<PS>
where
    PS: PermissionStore,
{
    permissions: Arc<PS>,
    session: Arc<Session>,
}

impl<PS> AuthorizationGuard<PS>
where
    PS: PermissionStore,
{
    pub fn new(permissions: Arc<PS>, session: Arc<Session>) -> Self {
        Self {
            permissions,
            session,
        }
    }

    /// Require a logged-in identity, without any role check.
    pub async fn require_authenticated(&self) -> Result<AccountId, AccessError> {
        self.session
            .current()
            .await
            .ok_or(AccessError::NotAuthenticated)
    }

    /// Require the current identity to hold one of the allowed roles.
    ///
    /// Membership check over the explicit allowed set; no ordering between
    /// roles is inferred.
    pub async fn require_role(&self, allowed: &[Role]) -> Result<AccountId, AccessError> {
        let account_id = self.require_authenticated().await?;

        match self.permissions.role(&account_id).await {
            Ok(Some(role)) if allowed.contains(&role) => Ok(account_id),
            Ok(Some(role)) => {
                tracing::warn!(account = %account_id, role = %role, "insufficient role");
                Err(AccessError::InsufficientPermissions)
            }
            Ok(None) => {
                tracing::warn!(account = %account_id, "no account row for role check");
                Err(AccessError::InsufficientPermissions)
            }
            Err(e) => {
                tracing::error!(account = %account_id, error = %e, "role lookup failed");
                Err(AccessError::InsufficientPermissions)
            }
        }
    }

    /// Require the current identity to hold one of the allowed permission
    /// levels on the project.
    ///
    /// Runs before any mutating work on the resource; a missing grant, a
    /// nonexistent project, and a lookup failure all deny.
    pub async fn require_permission(
        &self,
        project: &ProjectId,
        allowed: &[PermissionLevel],
    ) -> Result<AccountId, AccessError> {
        let account_id = self.require_authenticated().await?;

        match self
            .permissions
            .resource_permission(project, &account_id)
            .await
        {
            Ok(Some(level)) if allowed.contains(&level) => Ok(account_id),
            Ok(Some(level)) => {
                tracing::warn!(
                    account = %account_id,
                    project = %project,
                    level = %level,
                    "insufficient project permission"
                );
                Err(AccessError::InsufficientPermissions)
            }
            Ok(None) => {
                tracing::warn!(account = %account_id, project = %project, "no permission grant");
                Err(AccessError::InsufficientPermissions)
            }
            Err(e) => {
                tracing::error!(
                    account = %account_id,
                    project = %project,
                    error = %e,
                    "permission lookup failed"
                );
                Err(AccessError::InsufficientPermissions)
            }
        }
    }

    /// The caller's permission on the project, if authenticated.
    ///
    /// Lookup failures fail closed to `None`.
    pub async fn permission_on(
        &self,
        project: &ProjectId,
    ) -> Result<Option<PermissionLevel>, AccessError> {
        let account_id = self.require_authenticated().await?;

        match self
            .permissions
            .resource_permission(project, &account_id)
            .await
        {
            Ok(level) => Ok(level),
            Err(e) => {
                tracing::error!(
                    account = %account_id,
                    project = %project,
                    error = %e,
                    "permission lookup failed"
                );
                Ok(None)
            }
        }
    }
}
