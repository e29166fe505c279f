use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::client::SecureString;

/// Storage for the single bearer credential of a session.
///
/// The store is the only owner of the credential. The client reads it before
/// every authenticated call and clears it when the session expires; the
/// embedding application writes it after login and clears it on logout.
///
/// # Example
///
/// ```rust
/// use portfolio_client::{CredentialStore, SessionStorage};
///
/// let storage = SessionStorage::new();
/// storage.write(Some("jwt-token"));
/// assert!(storage.read().is_some_and(|token| token.equals_str("jwt-token")));
///
/// storage.write(Some(""));
/// assert!(storage.read().is_none());
/// ```
pub trait CredentialStore: Send + Sync {
    /// Returns the current token, if any.
    fn read(&self) -> Option<SecureString>;

    /// Stores a token. An empty or absent token clears the store.
    fn write(&self, token: Option<&str>);

    /// Removes the stored token. Calling it on an empty store is a no-op.
    fn clear(&self);
}

/// In-memory credential store scoped to one session.
///
/// Clones share the same slot, so a token written through one handle is seen
/// by every other handle of the same session. Separate `SessionStorage::new()`
/// instances never see each other's token.
#[derive(Clone, Default)]
pub struct SessionStorage {
    slot: Arc<RwLock<Option<SecureString>>>,
}

impl SessionStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding a token.
    pub fn with_token(token: impl Into<SecureString>) -> Self {
        let storage = Self::new();
        let token = token.into();
        storage.write(Some(token.as_str()));
        storage
    }
}

impl CredentialStore for SessionStorage {
    fn read(&self) -> Option<SecureString> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self, token: Option<&str>) {
        let Some(token) = token.filter(|token| !token.is_empty()) else {
            self.clear();
            return;
        };
        debug!("storing session credential");
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    fn clear(&self) {
        let previous = self
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            debug!("session credential cleared");
        }
    }
}

impl fmt::Debug for SessionStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present = self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        f.debug_struct("SessionStorage")
            .field("token", &present.then_some("[REDACTED]"))
            .finish()
    }
}
