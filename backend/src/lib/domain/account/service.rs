use std::sync::Arc;

use auth::CredentialFile;
use auth::CredentialFileError;
use auth::PasswordHasher;
use auth::RememberedSession;
use auth::TokenIssuer;

use crate::domain::account::errors::AuthError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountStatus;
use crate::domain::account::ports::CredentialStore;
use crate::domain::session::Session;

/// Authentication flows: login by password, login by remembered token, and
/// logout.
///
/// Authentication outcomes are `Ok(None)`: unknown email, wrong password,
/// disabled account, and stale token are all externally indistinguishable.
/// The specific reason is logged, never returned. Errors are reserved for
/// infrastructure failures and corrupted stored data.
pub struct AuthenticationService<CS>
where
    CS: CredentialStore,
{
    store: Arc<CS>,
    session: Arc<Session>,
    credential_file: CredentialFile,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
}

impl<CS> AuthenticationService<CS>
where
    CS: CredentialStore,
{
    /// Create a new authentication service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential persistence implementation
    /// * `session` - The process-wide identity slot
    /// * `credential_file` - Local remember-me credential file
    pub fn new(store: Arc<CS>, session: Arc<Session>, credential_file: CredentialFile) -> Self {
        Self {
            store,
            session,
            credential_file,
            hasher: PasswordHasher::new(),
            issuer: TokenIssuer::new(),
        }
    }

    /// Authenticate with email and password.
    ///
    /// On success the identity slot is set to this account and, if `remember`
    /// is true, a fresh session token is appended to the account's
    /// server-side list and persisted locally. With `remember` false any
    /// existing local credential file is removed (best effort) so a prior
    /// remembered session does not linger.
    ///
    /// # Returns
    /// The account on success; `None` for any failed authentication, with no
    /// externally visible reason
    ///
    /// # Errors
    /// * `Store` - Credential store unreachable or failing
    /// * `Hash` - Stored hash is malformed (data corruption, not a wrong
    ///   password)
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<Option<Account>, AuthError> {
        // Hold the identity slot for the whole read-modify-write so
        // concurrent logins serialize.
        let mut slot = self.session.slot().await;

        let Some(account) = self.store.find_by_email(email).await? else {
            tracing::debug!("login rejected: no account for email");
            return Ok(None);
        };

        let Some(credential) = self.store.credential(&account.id).await? else {
            tracing::warn!(account = %account.id, "login rejected: no credential record");
            return Ok(None);
        };

        if !self.hasher.verify(password, &credential.password_hash)? {
            tracing::debug!(account = %account.id, "login rejected: password mismatch");
            return Ok(None);
        }

        if account.status != AccountStatus::Active {
            tracing::warn!(account = %account.id, "login rejected: account disabled");
            return Ok(None);
        }

        *slot = Some(account.id);

        if remember {
            self.remember_session(&account.id).await;
        } else if let Err(e) = self.credential_file.remove() {
            tracing::warn!(error = %e, "could not remove local credential file");
        }

        tracing::info!(account = %account.id, "authenticated with password");
        Ok(Some(account))
    }

    /// Issue a token, append it server-side, then persist it locally.
    ///
    /// Best effort: the login already succeeded, so failures here are logged
    /// and the session stays established. The local file is only written
    /// after the server-side append, so it never names a token the server
    /// does not know.
    async fn remember_session(&self, account_id: &AccountId) {
        let token = self.issuer.issue();

        if let Err(e) = self.store.append_token(account_id, &token).await {
            tracing::error!(account = %account_id, error = %e, "could not store session token");
            return;
        }

        let remembered = RememberedSession {
            account_id: account_id.to_string(),
            token,
        };
        if let Err(e) = self.credential_file.store(&remembered) {
            tracing::error!(account = %account_id, error = %e, "could not persist credential file");
        }
    }

    /// Resume the session remembered in the local credential file.
    ///
    /// The persisted token must still be a member of the account's
    /// server-side token list; a revoked or replaced list makes the local
    /// file stale. No password is re-checked.
    ///
    /// # Returns
    /// The account on success; `None` when there is no file (nothing to
    /// resume) or the token is no longer valid
    ///
    /// # Errors
    /// * `CredentialFile` - File exists but is malformed
    /// * `Store` - Credential store unreachable or failing
    pub async fn login_with_remembered_token(&self) -> Result<Option<Account>, AuthError> {
        let mut slot = self.session.slot().await;

        let Some(remembered) = self.credential_file.load()? else {
            tracing::debug!("no local credential file, nothing to resume");
            return Ok(None);
        };

        let account_id = AccountId::from_string(&remembered.account_id).map_err(|e| {
            AuthError::CredentialFile(CredentialFileError::Malformed(e.to_string()))
        })?;

        let Some(credential) = self.store.credential(&account_id).await? else {
            tracing::debug!(account = %account_id, "token rejected: no credential record");
            return Ok(None);
        };

        if !credential.contains(&remembered.token) {
            tracing::debug!(account = %account_id, "token rejected: not in server-side list");
            return Ok(None);
        }

        let Some(account) = self.store.find_by_id(&account_id).await? else {
            tracing::warn!(account = %account_id, "token rejected: account row missing");
            return Ok(None);
        };

        if account.status != AccountStatus::Active {
            tracing::warn!(account = %account_id, "token rejected: account disabled");
            return Ok(None);
        }

        *slot = Some(account.id);
        tracing::info!(account = %account.id, "authenticated with remembered token");
        Ok(Some(account))
    }

    /// End the current session.
    ///
    /// Revokes the remembered token from the server-side list, removes the
    /// local credential file, and clears the identity slot. Revocation and
    /// removal are best effort; the slot is always cleared.
    pub async fn logout(&self) {
        let mut slot = self.session.slot().await;

        match self.credential_file.load() {
            Ok(Some(remembered)) => match AccountId::from_string(&remembered.account_id) {
                Ok(account_id) => {
                    if let Err(e) = self.store.remove_token(&account_id, &remembered.token).await {
                        tracing::error!(account = %account_id, error = %e, "could not revoke session token");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "credential file names an invalid account id");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "could not read credential file during logout");
            }
        }

        if let Err(e) = self.credential_file.remove() {
            tracing::warn!(error = %e, "could not remove local credential file");
        }

        *slot = None;
        tracing::info!("session ended");
    }
}

#[cfg(test)]
mod tests {
    use auth::HashParams;
    use auth::SessionToken;
    use mockall::mock;
    use mockall::predicate::*;
    use tempfile::TempDir;

    use super::*;
    use crate::domain::account::errors::StoreError;
    use crate::domain::account::models::AccountUpdate;
    use crate::domain::account::models::CredentialRecord;
    use crate::domain::account::models::EmailAddress;
    use crate::domain::account::models::Role;

    mock! {
        pub TestCredentialStore {}

        #[async_trait::async_trait]
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

    fn test_account(status: AccountStatus) -> Account {
        Account {
            id: AccountId::new(),
            email: EmailAddress::new("kim@example.com".to_string()).unwrap(),
            name: "Kim".to_string(),
            role: Role::User,
            status,
        }
    }

    /// Cheap hash parameters; verification recovers them from the string.
    fn hash_of(password: &str) -> String {
        PasswordHasher::with_params(HashParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
            output_length: 32,
        })
        .encode(password)
        .unwrap()
    }

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn credential_file(&self) -> CredentialFile {
            CredentialFile::new(self.dir.path().join("user_auth.toml"))
        }

        fn service(
            &self,
            store: MockTestCredentialStore,
        ) -> (AuthenticationService<MockTestCredentialStore>, Arc<Session>) {
            let session = Arc::new(Session::new());
            let service = AuthenticationService::new(
                Arc::new(store),
                Arc::clone(&session),
                self.credential_file(),
            );
            (service, session)
        }
    }

    #[tokio::test]
    async fn test_password_login_establishes_identity() {
        let fixture = Fixture::new();
        let account = test_account(AccountStatus::Active);
        let account_id = account.id;

        let mut store = MockTestCredentialStore::new();
        store
            .expect_find_by_email()
            .with(eq("kim@example.com"))
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));
        store.expect_credential().times(1).returning(|_| {
            Ok(Some(CredentialRecord {
                password_hash: hash_of("correct horse"),
                tokens: vec![],
            }))
        });

        let (service, session) = fixture.service(store);
        let result = service
            .login_with_password("kim@example.com", "correct horse", false)
            .await
            .unwrap();

        assert_eq!(result.map(|a| a.id), Some(account_id));
        assert_eq!(session.current().await, Some(account_id));
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_are_indistinguishable() {
        let fixture = Fixture::new();

        let mut no_account = MockTestCredentialStore::new();
        no_account
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        let (service, session) = fixture.service(no_account);
        let unknown = service
            .login_with_password("nope@example.com", "anything", false)
            .await
            .unwrap();
        assert!(unknown.is_none());
        assert_eq!(session.current().await, None);

        let mut wrong_password = MockTestCredentialStore::new();
        let account = test_account(AccountStatus::Active);
        wrong_password
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));
        wrong_password.expect_credential().times(1).returning(|_| {
            Ok(Some(CredentialRecord {
                password_hash: hash_of("correct horse"),
                tokens: vec![],
            }))
        });
        let (service, session) = fixture.service(wrong_password);
        let mismatch = service
            .login_with_password("kim@example.com", "wrongpass", false)
            .await
            .unwrap();
        assert!(mismatch.is_none());
        assert_eq!(session.current().await, None);
    }

    #[tokio::test]
    async fn test_disabled_account_cannot_authenticate() {
        let fixture = Fixture::new();
        let account = test_account(AccountStatus::Disabled);

        let mut store = MockTestCredentialStore::new();
        store
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));
        store.expect_credential().times(1).returning(|_| {
            Ok(Some(CredentialRecord {
                password_hash: hash_of("correct horse"),
                tokens: vec![],
            }))
        });

        let (service, session) = fixture.service(store);
        let result = service
            .login_with_password("kim@example.com", "correct horse", false)
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(session.current().await, None);
    }

    #[tokio::test]
    async fn test_malformed_stored_hash_is_an_error_not_a_mismatch() {
        let fixture = Fixture::new();
        let account = test_account(AccountStatus::Active);

        let mut store = MockTestCredentialStore::new();
        store
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));
        store.expect_credential().times(1).returning(|_| {
            Ok(Some(CredentialRecord {
                password_hash: "$argon2id$v=19$m=65536,t=2,p=4$only-five-fields".to_string(),
                tokens: vec![],
            }))
        });

        let (service, session) = fixture.service(store);
        let result = service
            .login_with_password("kim@example.com", "anything", false)
            .await;

        assert!(matches!(result, Err(AuthError::Hash(_))));
        assert_eq!(session.current().await, None);
    }

    #[tokio::test]
    async fn test_remember_appends_token_and_persists_file() {
        let fixture = Fixture::new();
        let account = test_account(AccountStatus::Active);
        let account_id = account.id;

        let mut store = MockTestCredentialStore::new();
        store
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));
        store.expect_credential().times(1).returning(|_| {
            Ok(Some(CredentialRecord {
                password_hash: hash_of("correct horse"),
                tokens: vec![],
            }))
        });
        store
            .expect_append_token()
            .with(eq(account_id), always())
            .times(1)
            .returning(|_, _| Ok(()));

        let (service, _session) = fixture.service(store);
        service
            .login_with_password("kim@example.com", "correct horse", true)
            .await
            .unwrap();

        let remembered = fixture.credential_file().load().unwrap().unwrap();
        assert_eq!(remembered.account_id, account_id.to_string());
    }

    #[tokio::test]
    async fn test_login_without_remember_clears_stale_file() {
        let fixture = Fixture::new();
        fixture
            .credential_file()
            .store(&RememberedSession {
                account_id: AccountId::new().to_string(),
                token: TokenIssuer::new().issue(),
            })
            .unwrap();

        let account = test_account(AccountStatus::Active);
        let mut store = MockTestCredentialStore::new();
        store
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));
        store.expect_credential().times(1).returning(|_| {
            Ok(Some(CredentialRecord {
                password_hash: hash_of("correct horse"),
                tokens: vec![],
            }))
        });

        let (service, _session) = fixture.service(store);
        service
            .login_with_password("kim@example.com", "correct horse", false)
            .await
            .unwrap();

        assert!(fixture.credential_file().load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remembered_token_resumes_session() {
        let fixture = Fixture::new();
        let account = test_account(AccountStatus::Active);
        let account_id = account.id;
        let token = TokenIssuer::new().issue();

        fixture
            .credential_file()
            .store(&RememberedSession {
                account_id: account_id.to_string(),
                token: token.clone(),
            })
            .unwrap();

        let mut store = MockTestCredentialStore::new();
        let stored_token = token.clone();
        store
            .expect_credential()
            .with(eq(account_id))
            .times(1)
            .returning(move |_| {
                Ok(Some(CredentialRecord {
                    password_hash: hash_of("irrelevant"),
                    tokens: vec![TokenIssuer::new().issue(), stored_token.clone()],
                }))
            });
        store
            .expect_find_by_id()
            .with(eq(account_id))
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));

        let (service, session) = fixture.service(store);
        let result = service.login_with_remembered_token().await.unwrap();

        assert_eq!(result.map(|a| a.id), Some(account_id));
        assert_eq!(session.current().await, Some(account_id));
    }

    #[tokio::test]
    async fn test_absent_file_means_no_session_to_resume() {
        let fixture = Fixture::new();
        let store = MockTestCredentialStore::new();

        let (service, session) = fixture.service(store);
        let result = service.login_with_remembered_token().await.unwrap();

        assert!(result.is_none());
        assert_eq!(session.current().await, None);
    }

    #[tokio::test]
    async fn test_revoked_token_does_not_resume() {
        let fixture = Fixture::new();
        let account_id = AccountId::new();

        fixture
            .credential_file()
            .store(&RememberedSession {
                account_id: account_id.to_string(),
                token: TokenIssuer::new().issue(),
            })
            .unwrap();

        let mut store = MockTestCredentialStore::new();
        store.expect_credential().times(1).returning(|_| {
            // Server-side list no longer carries the persisted token.
            Ok(Some(CredentialRecord {
                password_hash: hash_of("irrelevant"),
                tokens: vec![TokenIssuer::new().issue()],
            }))
        });

        let (service, session) = fixture.service(store);
        let result = service.login_with_remembered_token().await.unwrap();

        assert!(result.is_none());
        assert_eq!(session.current().await, None);
    }

    #[tokio::test]
    async fn test_malformed_credential_file_is_an_error() {
        let fixture = Fixture::new();
        std::fs::write(
            fixture.dir.path().join("user_auth.toml"),
            "account_id = \"broken",
        )
        .unwrap();

        let store = MockTestCredentialStore::new();
        let (service, _session) = fixture.service(store);
        let result = service.login_with_remembered_token().await;

        assert!(matches!(result, Err(AuthError::CredentialFile(_))));
    }

    #[tokio::test]
    async fn test_logout_revokes_token_and_clears_identity() {
        let fixture = Fixture::new();
        let account_id = AccountId::new();
        let token = TokenIssuer::new().issue();

        fixture
            .credential_file()
            .store(&RememberedSession {
                account_id: account_id.to_string(),
                token: token.clone(),
            })
            .unwrap();

        let mut store = MockTestCredentialStore::new();
        store
            .expect_remove_token()
            .with(eq(account_id), eq(token))
            .times(1)
            .returning(|_, _| Ok(()));

        let (service, session) = fixture.service(store);
        {
            let mut slot = session.slot().await;
            *slot = Some(account_id);
        }

        service.logout().await;

        assert_eq!(session.current().await, None);
        assert!(fixture.credential_file().load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_without_remembered_session_just_clears_identity() {
        let fixture = Fixture::new();
        let store = MockTestCredentialStore::new();

        let (service, session) = fixture.service(store);
        service.logout().await;

        assert_eq!(session.current().await, None);
    }
}
