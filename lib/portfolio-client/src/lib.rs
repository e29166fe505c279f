//! # Portfolio Client
//!
//! HTTP API client and session lifecycle for the portfolio manager backend.
//!
//! Every request goes through [`ApiClient`], which:
//! - attaches the stored bearer credential to authenticated calls,
//! - decodes JSON, empty, plain text and HTML bodies without failing,
//! - reports failures as [`ApiClientError::RequestFailed`] carrying a readable
//!   detail,
//! - ends the session on a 401 from an authenticated call: the credential is
//!   cleared and the page is sent to the login route.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use http::Method;
//! use portfolio_client::{ApiClient, Credentials, RequestOptions, SessionStorage};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = SessionStorage::new();
//! let client = ApiClient::builder()
//!     .with_host("localhost")
//!     .with_port(8080)
//!     .with_credentials(storage.clone())
//!     .build()?;
//!
//! // POST /auth/token, the token lands in the storage
//! client.login(&Credentials::new("admin", "secret")).await?;
//!
//! // GET /api/rulesets with `Authorization: Bearer <token>`
//! let rulesets = client.api_request("/rulesets", RequestOptions::new()).await?;
//!
//! // 204 No Content is `None`
//! let deleted = client
//!     .api_request("/rulesets/3", RequestOptions::new().with_method(Method::DELETE))
//!     .await?;
//! assert!(deleted.is_none());
//!
//! let created = client
//!     .api_request(
//!         "/rulesets",
//!         RequestOptions::new()
//!             .with_method(Method::POST)
//!             .with_json(&json!({"name": "default"}))?,
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Entry points
//!
//! | Method                          | Base path | Credential | Session guard |
//! |---------------------------------|-----------|------------|---------------|
//! | [`ApiClient::api_request`]      | `/api`    | yes        | yes           |
//! | [`ApiClient::auth_request`]     | `/auth`   | no         | no            |
//! | [`ApiClient::api_upload`]       | `/api`    | yes        | yes           |
//! | [`ApiClient::api_download`]     | `/api`    | yes        | yes           |
//!
//! A 401 from `auth_request` means the submitted credentials were wrong, it
//! never logs anybody out.
//!
//! ## Session expiry
//!
//! The credential lives in a [`CredentialStore`] and the page in a
//! [`Location`]; both are injected through the builder. On expiry the client
//! clears the store and navigates to
//! `/login?message=Session%20expired%3B%20please%20log%20in%20again.`, or
//! replaces the location in place when it already is the login page.
//!
//! ```rust
//! use portfolio_client::{CredentialStore, RouteGate, SessionStorage};
//!
//! let storage = SessionStorage::new();
//! let gate = RouteGate::default();
//!
//! assert_eq!(gate.check("/rulesets", &storage).as_deref(), Some("/login"));
//! storage.write(Some("jwt"));
//! assert_eq!(gate.check("/rulesets", &storage), None);
//! assert_eq!(gate.check("/login", &storage).as_deref(), Some("/rulesets"));
//! ```

mod client;
pub use self::client::{
    ApiClient, ApiClientBuilder, ApiClientError, AuthToken, AuthenticationError, ClientConfig,
    Credentials, DEFAULT_API_BASE_PATH, DEFAULT_AUTH_BASE_PATH, DEFAULT_EXPIRY_MESSAGE,
    DEFAULT_LOGIN_PATH, Outcome, ParsedBody, RequestOptions, SecureString,
};

pub mod session;
pub use self::session::{
    CredentialStore, Location, MemoryLocation, RouteGate, SessionGuard, SessionStorage,
};

pub use reqwest::multipart;
