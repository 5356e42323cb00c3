use async_trait::async_trait;
use auth::SessionToken;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::account::errors::AccountStatusError;
use crate::domain::account::errors::RoleError;
use crate::domain::account::errors::StoreError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountUpdate;
use crate::domain::account::models::CredentialRecord;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::ports::CredentialStore;

type AccountRow = (Uuid, String, String, String, String);

const SELECT_ACCOUNT: &str = "SELECT id, email, name, role, account_status FROM accounts";

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: AccountRow) -> Result<Account, StoreError> {
    let (id, email, name, role, status) = row;
    Ok(Account {
        id: AccountId(id),
        email: EmailAddress::new(email).map_err(|e| StoreError::InvalidRow(e.to_string()))?,
        name,
        role: role
            .parse()
            .map_err(|e: RoleError| StoreError::InvalidRow(e.to_string()))?,
        status: status
            .parse()
            .map_err(|e: AccountStatusError| StoreError::InvalidRow(e.to_string()))?,
    })
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> =
            sqlx::query_as(&format!("{SELECT_ACCOUNT} WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        row.map(account_from_row).transpose()
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!("{SELECT_ACCOUNT} WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(account_from_row).transpose()
    }

    async fn credential(&self, id: &AccountId) -> Result<Option<CredentialRecord>, StoreError> {
        let row: Option<(String, Vec<String>)> = sqlx::query_as(
            "SELECT password_hash, tokens FROM account_credentials WHERE account_id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(|(password_hash, tokens)| CredentialRecord {
            password_hash,
            tokens: tokens.into_iter().map(SessionToken::from_string).collect(),
        }))
    }

    async fn append_token(&self, id: &AccountId, token: &SessionToken) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE account_credentials SET tokens = ARRAY_APPEND(tokens, $1) WHERE account_id = $2",
        )
        .bind(token.as_str())
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        tracing::debug!(account = %id, "session token appended");
        Ok(())
    }

    async fn remove_token(&self, id: &AccountId, token: &SessionToken) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE account_credentials SET tokens = ARRAY_REMOVE(tokens, $1) WHERE account_id = $2",
        )
        .bind(token.as_str())
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        tracing::debug!(account = %id, "session token removed");
        Ok(())
    }

    async fn create_account(
        &self,
        account: &Account,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query(
            "INSERT INTO accounts (id, email, name, role, account_status) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(account.id.0)
        .bind(account.email.as_str())
        .bind(&account.name)
        .bind(account.role.as_str())
        .bind(account.status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        sqlx::query(
            "INSERT INTO account_credentials (account_id, password_hash) VALUES ($1, $2)",
        )
        .bind(account.id.0)
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        tracing::debug!(account = %account.id, "account and credential rows inserted");
        Ok(())
    }

    async fn set_password_hash(
        &self,
        id: &AccountId,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE account_credentials SET password_hash = $1 WHERE account_id = $2")
            .bind(password_hash)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn update_account(&self, update: &AccountUpdate) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE accounts SET email = $2, name = $3, role = $4, account_status = $5 \
             WHERE id = $1",
        )
        .bind(update.id.0)
        .bind(update.email.as_str())
        .bind(&update.name)
        .bind(update.role.as_str())
        .bind(update.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn deactivate_account(&self, id: &AccountId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("UPDATE accounts SET account_status = 'disabled' WHERE id = $1")
            .bind(id.0)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        sqlx::query("UPDATE account_credentials SET tokens = '{}' WHERE account_id = $1")
            .bind(id.0)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        tracing::debug!(account = %id, "account disabled and tokens cleared");
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let rows: Vec<AccountRow> = sqlx::query_as(&format!("{SELECT_ACCOUNT} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(account_from_row).collect()
    }
}
