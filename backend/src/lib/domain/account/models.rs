use std::fmt;
use std::str::FromStr;

use auth::SessionToken;
use uuid::Uuid;

use crate::domain::account::errors::AccountIdError;
use crate::domain::account::errors::AccountStatusError;
use crate::domain::account::errors::EmailError;
use crate::domain::account::errors::RoleError;

/// Account aggregate entity.
///
/// Accounts are provisioned administratively and never physically deleted;
/// deactivation flips the status and clears the server-side token list.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub name: String,
    pub role: Role,
    pub status: AccountStatus,
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }

    /// Get a reference to the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates format using an RFC 5322 compliant parser. Stored and compared
/// exactly as given; lookups are exact matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Application-level role held by an account.
///
/// Role checks are set-membership over explicit allowed sets; no ordering
/// between roles is inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Admin,
    User,
}

impl Role {
    /// Stable storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(RoleError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an account may authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Disabled,
}

impl AccountStatus {
    /// Stable storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Disabled => "disabled",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = AccountStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "disabled" => Ok(AccountStatus::Disabled),
            other => Err(AccountStatusError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Password hash and currently-valid session tokens for one account.
///
/// Owned 1:1 by an account, created with it, and replaced as a whole when
/// the password changes.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub password_hash: String,
    pub tokens: Vec<SessionToken>,
}

impl CredentialRecord {
    /// Membership test over the full token list.
    pub fn contains(&self, token: &SessionToken) -> bool {
        self.tokens.iter().any(|t| t == token)
    }
}

/// Command to provision a new account with validated fields.
#[derive(Debug)]
pub struct CreateAccountCommand {
    pub email: EmailAddress,
    pub name: String,
    pub role: Role,
    /// Plain text initial password; hashed by the service.
    pub password: String,
}

/// Full-row account update (profile, role, status).
#[derive(Debug)]
pub struct AccountUpdate {
    pub id: AccountId,
    pub email: EmailAddress,
    pub name: String,
    pub role: Role,
    pub status: AccountStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_storage_roundtrip() {
        for role in [Role::Owner, Role::Admin, Role::User] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!(matches!("root".parse::<Role>(), Err(RoleError::Unknown(_))));
    }

    #[test]
    fn test_status_storage_roundtrip() {
        for status in [AccountStatus::Active, AccountStatus::Disabled] {
            assert_eq!(status.as_str().parse::<AccountStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(EmailAddress::new("kim@example.com".to_string()).is_ok());
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }

    #[test]
    fn test_account_id_parse_rejects_garbage() {
        assert!(AccountId::from_string("not-a-uuid").is_err());
        let id = AccountId::new();
        assert_eq!(AccountId::from_string(&id.to_string()).unwrap(), id);
    }
}
