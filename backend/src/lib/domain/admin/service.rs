use std::sync::Arc;

use auth::PasswordHasher;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountStatus;
use crate::domain::account::models::AccountUpdate;
use crate::domain::account::models::CreateAccountCommand;
use crate::domain::account::models::Role;
use crate::domain::account::ports::CredentialStore;
use crate::domain::admin::errors::AdminError;
use crate::domain::admin::ports::MailSender;
use crate::domain::authorization::guard::AuthorizationGuard;
use crate::domain::authorization::ports::PermissionStore;

/// Roles allowed to manage accounts.
const MANAGE_ROLES: [Role; 2] = [Role::Owner, Role::Admin];

/// Roles allowed to list every account.
const LIST_ROLES: [Role; 1] = [Role::Owner];

/// Account management: provisioning, deactivation, profile updates, password
/// changes, and listing. Every operation is gated by the authorization guard
/// before it touches the store.
pub struct AdminService<CS, PS, MS>
where
    CS: CredentialStore,
    PS: PermissionStore,
    MS: MailSender,
{
    store: Arc<CS>,
    guard: Arc<AuthorizationGuard<PS>>,
    mailer: Arc<MS>,
    hasher: PasswordHasher,
}

impl<CS, PS, MS> AdminService<CS, PS, MS>
where
    CS: CredentialStore,
    PS: PermissionStore,
    MS: MailSender,
{
    pub fn new(store: Arc<CS>, guard: Arc<AuthorizationGuard<PS>>, mailer: Arc<MS>) -> Self {
        Self {
            store,
            guard,
            mailer,
            hasher: PasswordHasher::new(),
        }
    }

    /// Provision a new account.
    ///
    /// The account row and its credential record are created as one atomic
    /// unit, then a welcome mail with the initial password goes out.
    ///
    /// # Errors
    /// * `Access` - Caller is not an owner or admin
    /// * `Hash` / `Store` - Nothing was created
    /// * `WelcomeMailNotSent` - The account was created and can log in, only
    ///   the notification failed; the id is carried in the error
    pub async fn create_account(
        &self,
        command: CreateAccountCommand,
    ) -> Result<AccountId, AdminError> {
        self.guard.require_role(&MANAGE_ROLES).await?;

        let account = Account {
            id: AccountId::new(),
            email: command.email,
            name: command.name,
            role: command.role,
            status: AccountStatus::Active,
        };
        let password_hash = self.hasher.encode(&command.password)?;

        self.store.create_account(&account, &password_hash).await?;
        tracing::info!(account = %account.id, role = %account.role, "account created");

        let body = format!(
            "Welcome to benchdb. You can log in with this email and the password:\n{}\n\n\
             You can change your password once you log in.",
            command.password
        );
        if let Err(e) = self
            .mailer
            .send(account.email.as_str(), "benchdb | Welcome!", &body)
            .await
        {
            tracing::error!(account = %account.id, error = %e, "could not send welcome mail");
            return Err(AdminError::WelcomeMailNotSent {
                account_id: account.id,
                reason: e.to_string(),
            });
        }

        Ok(account.id)
    }

    /// Deactivate an account.
    ///
    /// Retains all information about the account; only its ability to
    /// authenticate is removed. Status flip and token-list clear happen in
    /// one transaction in the store.
    pub async fn deactivate_account(&self, id: &AccountId) -> Result<(), AdminError> {
        self.guard.require_role(&MANAGE_ROLES).await?;

        self.store.deactivate_account(id).await?;
        tracing::info!(account = %id, "account deactivated");
        Ok(())
    }

    /// Update an account's profile, role, and status.
    pub async fn update_account(&self, update: AccountUpdate) -> Result<(), AdminError> {
        self.guard.require_role(&MANAGE_ROLES).await?;

        self.store.update_account(&update).await?;
        tracing::info!(account = %update.id, "account updated");
        Ok(())
    }

    /// Replace the current account's own password hash.
    pub async fn change_password(&self, new_password: &str) -> Result<(), AdminError> {
        let account_id = self.guard.require_authenticated().await?;

        let password_hash = self.hasher.encode(new_password)?;
        self.store
            .set_password_hash(&account_id, &password_hash)
            .await?;
        tracing::info!(account = %account_id, "password changed");
        Ok(())
    }

    /// List every account.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AdminError> {
        self.guard.require_role(&LIST_ROLES).await?;
        Ok(self.store.list_accounts().await?)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use auth::SessionToken;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::account::errors::StoreError;
    use crate::domain::account::models::CredentialRecord;
    use crate::domain::account::models::EmailAddress;
    use crate::domain::admin::errors::MailError;
    use crate::domain::authorization::errors::AccessError;
    use crate::domain::authorization::models::PermissionLevel;
    use crate::domain::project::models::ProjectId;
    use crate::domain::session::Session;

    mock! {
        pub TestCredentialStore {}

        #[async_trait]
        impl CredentialStore for TestCredentialStore {
            async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
            async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, StoreError>;
            async fn credential(&self, id: &AccountId) -> Result<Option<CredentialRecord>, StoreError>;
            async fn append_token(&self, id: &AccountId, token: &SessionToken) -> Result<(), StoreError>;
            async fn remove_token(&self, id: &AccountId, token: &SessionToken) -> Result<(), StoreError>;
            async fn create_account(&self, account: &Account, password_hash: &str) -> Result<(), StoreError>;
            async fn set_password_hash(&self, id: &AccountId, password_hash: &str) -> Result<(), StoreError>;
            async fn update_account(&self, update: &AccountUpdate) -> Result<(), StoreError>;
            async fn deactivate_account(&self, id: &AccountId) -> Result<(), StoreError>;
            async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;
        }
    }

    mock! {
        pub TestPermissionStore {}

        #[async_trait]
        impl PermissionStore for TestPermissionStore {
            async fn role(&self, account: &AccountId) -> Result<Option<Role>, StoreError>;
            async fn resource_permission(
                &self,
                project: &ProjectId,
                account: &AccountId,
            ) -> Result<Option<PermissionLevel>, StoreError>;
        }
    }

    mock! {
        pub TestMailSender {}

        #[async_trait]
        impl MailSender for TestMailSender {
            async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
        }
    }

    async fn guard_with_role(
        role: Option<Role>,
    ) -> Arc<AuthorizationGuard<MockTestPermissionStore>> {
        let session = Arc::new(Session::new());
        {
            let mut slot = session.slot().await;
            *slot = Some(AccountId::new());
        }
        let mut permissions = MockTestPermissionStore::new();
        permissions.expect_role().returning(move |_| Ok(role));
        Arc::new(AuthorizationGuard::new(Arc::new(permissions), session))
    }

    fn create_command() -> CreateAccountCommand {
        CreateAccountCommand {
            email: EmailAddress::new("new@example.com".to_string()).unwrap(),
            name: "New Person".to_string(),
            role: Role::User,
            password: "initial-password".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_account_hashes_password_and_sends_mail() {
        let mut store = MockTestCredentialStore::new();
        store
            .expect_create_account()
            .withf(|account, password_hash| {
                account.email.as_str() == "new@example.com"
                    && account.status == AccountStatus::Active
                    && password_hash.starts_with("$argon2id$v=19$")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut mailer = MockTestMailSender::new();
        mailer
            .expect_send()
            .with(eq("new@example.com"), always(), always())
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = AdminService::new(
            Arc::new(store),
            guard_with_role(Some(Role::Admin)).await,
            Arc::new(mailer),
        );

        let result = service.create_account(create_command()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_account_survives_mail_failure() {
        let mut store = MockTestCredentialStore::new();
        store
            .expect_create_account()
            .times(1)
            .returning(|_, _| Ok(()));

        let mut mailer = MockTestMailSender::new();
        mailer
            .expect_send()
            .times(1)
            .returning(|_, _, _| Err(MailError::Transport("connection refused".to_string())));

        let service = AdminService::new(
            Arc::new(store),
            guard_with_role(Some(Role::Owner)).await,
            Arc::new(mailer),
        );

        let result = service.create_account(create_command()).await;
        // The account was stored; only the notification failed.
        assert!(matches!(
            result,
            Err(AdminError::WelcomeMailNotSent { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_account_denied_for_plain_users() {
        let mut store = MockTestCredentialStore::new();
        store.expect_create_account().times(0);

        let service = AdminService::new(
            Arc::new(store),
            guard_with_role(Some(Role::User)).await,
            Arc::new(MockTestMailSender::new()),
        );

        let result = service.create_account(create_command()).await;
        assert!(matches!(
            result,
            Err(AdminError::Access(AccessError::InsufficientPermissions))
        ));
    }

    #[tokio::test]
    async fn test_deactivate_account_is_gated_and_delegated() {
        let target = AccountId::new();
        let mut store = MockTestCredentialStore::new();
        store
            .expect_deactivate_account()
            .with(eq(target))
            .times(1)
            .returning(|_| Ok(()));

        let service = AdminService::new(
            Arc::new(store),
            guard_with_role(Some(Role::Owner)).await,
            Arc::new(MockTestMailSender::new()),
        );

        assert!(service.deactivate_account(&target).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_accounts_requires_owner() {
        let mut store = MockTestCredentialStore::new();
        store.expect_list_accounts().times(0);

        let service = AdminService::new(
            Arc::new(store),
            guard_with_role(Some(Role::Admin)).await,
            Arc::new(MockTestMailSender::new()),
        );

        let result = service.list_accounts().await;
        assert!(matches!(
            result,
            Err(AdminError::Access(AccessError::InsufficientPermissions))
        ));
    }

    #[tokio::test]
    async fn test_change_password_replaces_hash_for_current_account() {
        let session = Arc::new(Session::new());
        let account_id = AccountId::new();
        {
            let mut slot = session.slot().await;
            *slot = Some(account_id);
        }
        let guard = Arc::new(AuthorizationGuard::new(
            Arc::new(MockTestPermissionStore::new()),
            session,
        ));

        let mut store = MockTestCredentialStore::new();
        store
            .expect_set_password_hash()
            .withf(move |id, hash| *id == account_id && hash.starts_with("$argon2id$"))
            .times(1)
            .returning(|_, _| Ok(()));

        let service = AdminService::new(Arc::new(store), guard, Arc::new(MockTestMailSender::new()));
        assert!(service.change_password("fresh-password").await.is_ok());
    }
}
