use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::warn;

use super::credential::CredentialStore;
use super::location::Location;

/// Query component characters left as is: the RFC 3986 unreserved set.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Forced logout on session expiry.
///
/// When an authenticated call receives a 401 the guard clears the stored
/// credential and sends the page to the login route, carrying the expiry
/// reason in a `message` query parameter. If the page already is the login
/// page the location is replaced in place instead, so several concurrent 401s
/// cause a single navigation.
#[derive(Clone)]
pub struct SessionGuard {
    credentials: Arc<dyn CredentialStore>,
    location: Arc<dyn Location>,
    login_path: String,
    expiry_message: String,
    redirect_lock: Arc<Mutex<()>>,
}

impl SessionGuard {
    /// Creates a guard redirecting to `login_path` with `expiry_message`.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        location: Arc<dyn Location>,
        login_path: impl Into<String>,
        expiry_message: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            location,
            login_path: login_path.into(),
            expiry_message: expiry_message.into(),
            redirect_lock: Arc::default(),
        }
    }

    /// The URL of the login page carrying the expiry reason.
    pub fn login_target(&self) -> String {
        login_target(&self.login_path, &self.expiry_message)
    }

    /// Ends the session: clears the credential and redirects to login.
    pub fn expire(&self) {
        self.credentials.clear();

        let target = self.login_target();
        let _redirect = self
            .redirect_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.location.current_path() == self.login_path {
            self.location.replace(&target);
        } else {
            warn!(%target, "session expired, redirecting to login");
            self.location.assign(&target);
        }
    }
}

impl fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionGuard")
            .field("login_path", &self.login_path)
            .field("expiry_message", &self.expiry_message)
            .finish_non_exhaustive()
    }
}

/// Builds `{login_path}?message={reason}`, or just the path for a blank reason.
pub fn login_target(login_path: &str, reason: &str) -> String {
    if reason.trim().is_empty() {
        return login_path.to_string();
    }
    let message = utf8_percent_encode(reason, QUERY_VALUE);
    format!("{login_path}?message={message}")
}
