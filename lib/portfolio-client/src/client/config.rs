use serde::{Deserialize, Serialize};

/// Default prefix of the authenticated API.
pub const DEFAULT_API_BASE_PATH: &str = "/api";

/// Default prefix of the unauthenticated token endpoints.
pub const DEFAULT_AUTH_BASE_PATH: &str = "/auth";

/// Default login page.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Reason shown on the login page after a forced logout.
pub const DEFAULT_EXPIRY_MESSAGE: &str = "Session expired; please log in again.";

/// Serializable client settings.
///
/// Every field has a default, so a partial document is enough:
///
/// ```rust
/// use portfolio_client::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(r#"{"host": "portfolio.local", "port": 8080}"#)?;
/// assert_eq!(config.api_base_path, "/api");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// URI scheme of the backend, `http` or `https`.
    pub scheme: String,
    /// Host name or address of the backend.
    pub host: String,
    /// Port of the backend.
    pub port: u16,
    /// Prefix of the authenticated API.
    pub api_base_path: String,
    /// Prefix of the token endpoints.
    pub auth_base_path: String,
    /// Page the session guard redirects to.
    pub login_path: String,
    /// Reason passed to the login page on expiry.
    pub expiry_message: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port: 80,
            api_base_path: DEFAULT_API_BASE_PATH.to_string(),
            auth_base_path: DEFAULT_AUTH_BASE_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            expiry_message: DEFAULT_EXPIRY_MESSAGE.to_string(),
        }
    }
}
