use tokio::sync::Mutex;
use tokio::sync::MutexGuard;

use crate::domain::account::models::AccountId;

/// The single per-process authenticated identity.
///
/// There is exactly one current-account slot, set by a successful login and
/// cleared by logout or process end. Login and logout hold the slot's lock
/// across their whole read-modify-write, so concurrent attempts serialize;
/// there is no intermediate state between unauthenticated and authenticated.
#[derive(Debug, Default)]
pub struct Session {
    current: Mutex<Option<AccountId>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    /// The currently authenticated account, if any.
    pub async fn current(&self) -> Option<AccountId> {
        *self.current.lock().await
    }

    /// Exclusive access to the identity slot for a login/logout flow.
    pub(crate) async fn slot(&self) -> MutexGuard<'_, Option<AccountId>> {
        self.current.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_starts_unauthenticated() {
        assert_eq!(Session::new().current().await, None);
    }

    #[tokio::test]
    async fn test_slot_mutation_is_visible() {
        let session = Session::new();
        let id = AccountId::new();
        {
            let mut slot = session.slot().await;
            *slot = Some(id);
        }
        assert_eq!(session.current().await, Some(id));
    }
}
