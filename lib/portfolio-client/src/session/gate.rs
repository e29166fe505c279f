use super::credential::CredentialStore;
use super::location::path_of;

/// Page access rule based on the stored credential.
///
/// Pages other than login need a credential; the login page is skipped when a
/// credential is already present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGate {
    login_path: String,
    home_path: String,
}

impl Default for RouteGate {
    fn default() -> Self {
        Self::new("/login", "/rulesets")
    }
}

impl RouteGate {
    /// Creates a gate with the given login and home pages.
    pub fn new(login_path: impl Into<String>, home_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            home_path: home_path.into(),
        }
    }

    /// Returns where to go instead of `target`, or `None` to allow it.
    pub fn check(&self, target: &str, credentials: &dyn CredentialStore) -> Option<String> {
        let on_login = path_of(target) == self.login_path;
        let authenticated = credentials.read().is_some();

        match (on_login, authenticated) {
            (false, false) => Some(self.login_path.clone()),
            (true, true) => Some(self.home_path.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::session::SessionStorage;

    #[rstest]
    #[case::anonymous_page("/rulesets", None, Some("/login"))]
    #[case::anonymous_login("/login", None, None)]
    #[case::anonymous_login_with_message("/login?message=bye", None, None)]
    #[case::authenticated_page("/advisor/history", Some("jwt"), None)]
    #[case::authenticated_login("/login", Some("jwt"), Some("/rulesets"))]
    fn test_check(
        #[case] target: &str,
        #[case] token: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let storage = SessionStorage::new();
        storage.write(token);

        let redirect = RouteGate::default().check(target, &storage);

        assert_eq!(redirect.as_deref(), expected);
    }
}
