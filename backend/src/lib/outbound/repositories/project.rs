use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::account::errors::StoreError;
use crate::domain::account::models::AccountId;
use crate::domain::authorization::models::PermissionLevel;
use crate::domain::project::errors::VisibilityError;
use crate::domain::project::models::NewSample;
use crate::domain::project::models::Project;
use crate::domain::project::models::ProjectId;
use crate::domain::project::ports::ProjectRepository;

type ProjectRow = (Uuid, Uuid, String, String, String);

const SELECT_PROJECT: &str = "SELECT id, creator, label, description, visibility FROM projects";

pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn project_from_row(row: ProjectRow) -> Result<Project, StoreError> {
    let (id, creator, label, description, visibility) = row;
    Ok(Project {
        id: ProjectId(id),
        creator: AccountId(creator),
        label,
        description,
        visibility: visibility
            .parse()
            .map_err(|e: VisibilityError| StoreError::InvalidRow(e.to_string()))?,
    })
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn create_with_owner(&self, project: &Project) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query(
            "INSERT INTO projects (id, creator, label, description, visibility) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(project.id.0)
        .bind(project.creator.0)
        .bind(&project.label)
        .bind(&project.description)
        .bind(project.visibility.as_str())
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        sqlx::query(
            "INSERT INTO project_permissions (project_id, account_id, permission) \
             VALUES ($1, $2, $3)",
        )
        .bind(project.id.0)
        .bind(project.creator.0)
        .bind(PermissionLevel::Owner.as_str())
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        tracing::debug!(project = %project.id, "project and owner grant inserted");
        Ok(())
    }

    async fn insert_samples(
        &self,
        project: &ProjectId,
        creator: &AccountId,
        samples: &[NewSample],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for sample in samples {
            sqlx::query(
                "INSERT INTO samples (id, project_id, creator, label) VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::new_v4())
            .bind(project.0)
            .bind(creator.0)
            .bind(&sample.label)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;

        tracing::debug!(project = %project, count = samples.len(), "samples inserted");
        Ok(())
    }

    async fn set_permission(
        &self,
        project: &ProjectId,
        account: &AccountId,
        level: PermissionLevel,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO project_permissions (project_id, account_id, permission) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (project_id, account_id) DO UPDATE SET permission = EXCLUDED.permission",
        )
        .bind(project.0)
        .bind(account.0)
        .bind(level.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn find(&self, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        let row: Option<ProjectRow> = sqlx::query_as(&format!("{SELECT_PROJECT} WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(project_from_row).transpose()
    }

    async fn list_created_by(&self, account: &AccountId) -> Result<Vec<Project>, StoreError> {
        let rows: Vec<ProjectRow> =
            sqlx::query_as(&format!("{SELECT_PROJECT} WHERE creator = $1 ORDER BY id"))
                .bind(account.0)
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;

        rows.into_iter().map(project_from_row).collect()
    }
}
