use std::sync::Arc;

use http::Uri;
use http::uri::{PathAndQuery, Scheme};

use super::config::ClientConfig;
use super::{ApiClient, ApiClientError};
use crate::session::{CredentialStore, Location, MemoryLocation, SessionGuard, SessionStorage};

/// Builder for creating [`ApiClient`] instances.
///
/// # Default Configuration
///
/// - **Scheme**: HTTP
/// - **Host**: 127.0.0.1
/// - **Port**: 80
/// - **API base path**: `/api`
/// - **Auth base path**: `/auth`
/// - **Login path**: `/login`
/// - **Credential store**: a fresh [`SessionStorage`]
/// - **Location**: a [`MemoryLocation`] at `/`
///
/// # Example
///
/// ```rust
/// use http::uri::Scheme;
/// use portfolio_client::{ApiClient, MemoryLocation, SessionStorage};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let storage = SessionStorage::new();
/// let location = MemoryLocation::new("/rulesets");
///
/// let client = ApiClient::builder()
///     .with_scheme(Scheme::HTTPS)
///     .with_host("portfolio.example.com")
///     .with_port(443)
///     .with_api_base_path("/api")?
///     .with_credentials(storage.clone())
///     .with_location(location.clone())
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_more::Debug)]
pub struct ApiClientBuilder {
    client: reqwest::Client,
    config: ClientConfig,
    #[debug(skip)]
    credentials: Option<Arc<dyn CredentialStore>>,
    #[debug(skip)]
    location: Option<Arc<dyn Location>>,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            config: ClientConfig::default(),
            credentials: None,
            location: None,
        }
    }
}

impl ApiClientBuilder {
    /// Builds the final `ApiClient`.
    ///
    /// # Errors
    ///
    /// Fails if the scheme, host and port do not form a valid URI, or if a base
    /// path configured through [`with_config`](Self::with_config) is invalid.
    pub fn build(self) -> Result<ApiClient, ApiClientError> {
        let Self {
            client,
            config,
            credentials,
            location,
        } = self;

        let base_uri = Uri::builder()
            .scheme(config.scheme.as_str())
            .authority(format!("{}:{}", config.host, config.port))
            .path_and_query("/")
            .build()?;
        let api_base_path = normalize_base_path(&config.api_base_path)?;
        let auth_base_path = normalize_base_path(&config.auth_base_path)?;

        let credentials = credentials.unwrap_or_else(|| Arc::new(SessionStorage::new()));
        let location = location.unwrap_or_else(|| Arc::new(MemoryLocation::default()));
        let guard = SessionGuard::new(
            Arc::clone(&credentials),
            location,
            config.login_path,
            config.expiry_message,
        );

        Ok(ApiClient {
            client,
            base_uri,
            api_base_path,
            auth_base_path,
            credentials,
            guard,
        })
    }

    /// Replaces every setting with the given configuration.
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses a preconfigured `reqwest::Client`, for instance one with a timeout.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Sets the HTTP scheme. Defaults to `Scheme::HTTP`.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.config.scheme = scheme.to_string();
        self
    }

    /// Sets the backend host. Defaults to `127.0.0.1`.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the backend port. Defaults to `80`.
    pub fn with_port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the prefix of authenticated API calls. Defaults to `/api`.
    ///
    /// # Errors
    ///
    /// Returns `ApiClientError::InvalidBasePath` if the path contains invalid
    /// characters (such as spaces) or a query string.
    pub fn with_api_base_path(mut self, base_path: &str) -> Result<Self, ApiClientError> {
        self.config.api_base_path = normalize_base_path(base_path)?;
        Ok(self)
    }

    /// Sets the prefix of token endpoint calls. Defaults to `/auth`.
    ///
    /// # Errors
    ///
    /// Returns `ApiClientError::InvalidBasePath` for an invalid path.
    pub fn with_auth_base_path(mut self, base_path: &str) -> Result<Self, ApiClientError> {
        self.config.auth_base_path = normalize_base_path(base_path)?;
        Ok(self)
    }

    /// Sets the page the session guard redirects to. Defaults to `/login`.
    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.config.login_path = login_path.into();
        self
    }

    /// Sets the reason passed to the login page after a forced logout.
    pub fn with_expiry_message(mut self, message: impl Into<String>) -> Self {
        self.config.expiry_message = message.into();
        self
    }

    /// Uses the given credential store.
    pub fn with_credentials(mut self, credentials: impl CredentialStore + 'static) -> Self {
        self.credentials = Some(Arc::new(credentials));
        self
    }

    /// Uses the given page location for login redirects.
    pub fn with_location(mut self, location: impl Location + 'static) -> Self {
        self.location = Some(Arc::new(location));
        self
    }
}

/// Validates a base path and returns it with a leading and no trailing slash.
///
/// The root path normalizes to an empty string.
fn normalize_base_path(base_path: &str) -> Result<String, ApiClientError> {
    let trimmed = base_path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    let candidate = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };
    let parsed = PathAndQuery::try_from(candidate.as_str()).map_err(|err| {
        ApiClientError::InvalidBasePath {
            error: format!("{err:?}"),
        }
    })?;
    if parsed.query().is_some() {
        return Err(ApiClientError::InvalidBasePath {
            error: format!("query string not allowed in base path '{base_path}'"),
        });
    }

    Ok(candidate)
}
