use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::account::errors::AccountStatusError;
use crate::domain::account::errors::RoleError;
use crate::domain::account::errors::StoreError;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountStatus;
use crate::domain::account::models::Role;
use crate::domain::authorization::errors::PermissionLevelError;
use crate::domain::authorization::models::PermissionLevel;
use crate::domain::authorization::ports::PermissionStore;
use crate::domain::project::models::ProjectId;

pub struct PostgresPermissionStore {
    pool: PgPool,
}

impl PostgresPermissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

#[async_trait]
impl PermissionStore for PostgresPermissionStore {
    async fn role(&self, account: &AccountId) -> Result<Option<Role>, StoreError> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT role, account_status FROM accounts WHERE id = $1")
                .bind(account.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        let Some((role, status)) = row else {
            return Ok(None);
        };

        // A disabled account holds no effective role.
        let status: AccountStatus = status
            .parse()
            .map_err(|e: AccountStatusError| StoreError::InvalidRow(e.to_string()))?;
        if status != AccountStatus::Active {
            return Ok(None);
        }

        role.parse()
            .map(Some)
            .map_err(|e: RoleError| StoreError::InvalidRow(e.to_string()))
    }

    async fn resource_permission(
        &self,
        project: &ProjectId,
        account: &AccountId,
    ) -> Result<Option<PermissionLevel>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT permission FROM project_permissions WHERE project_id = $1 AND account_id = $2",
        )
        .bind(project.0)
        .bind(account.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(|(permission,)| {
            permission
                .parse()
                .map_err(|e: PermissionLevelError| StoreError::InvalidRow(e.to_string()))
        })
        .transpose()
    }
}
