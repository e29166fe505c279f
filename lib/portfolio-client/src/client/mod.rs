use std::sync::Arc;

use http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use http::{Method, StatusCode, Uri};
use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::session::{CredentialStore, SessionGuard};

mod builder;
pub use self::builder::ApiClientBuilder;

mod config;
pub use self::config::{
    ClientConfig, DEFAULT_API_BASE_PATH, DEFAULT_AUTH_BASE_PATH, DEFAULT_EXPIRY_MESSAGE,
    DEFAULT_LOGIN_PATH,
};

mod options;
pub use self::options::RequestOptions;

mod response;
pub use self::response::{Outcome, ParsedBody};

mod auth;
pub use self::auth::{AuthToken, AuthenticationError, Credentials, SecureString};
use self::auth::bearer_header;

mod error;
pub use self::error::ApiClientError;

/// Path of the token endpoint, relative to the auth base path.
const TOKEN_PATH: &str = "/token";

/// The two backends a call can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    /// Authenticated API, guarded against session expiry.
    Api,
    /// Token endpoint, a 401 there means bad credentials.
    Auth,
}

impl Endpoint {
    fn is_guarded(self) -> bool {
        matches!(self, Self::Api)
    }
}

/// HTTP client for the portfolio manager backend.
///
/// Every call goes through this type. It attaches the stored bearer credential,
/// decodes JSON, empty, text and HTML bodies without failing, and turns
/// failures into [`ApiClientError`]. A 401 on an authenticated call ends the
/// session: the credential is cleared and the page is sent to the login route
/// before [`ApiClientError::SessionExpired`] is returned.
///
/// Cloning is cheap, clones share the credential store and the location.
///
/// # Example
///
/// ```rust,no_run
/// use portfolio_client::{ApiClient, Credentials, RequestOptions};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::builder()
///     .with_host("localhost")
///     .with_port(8080)
///     .build()?;
///
/// client.login(&Credentials::new("admin", "secret")).await?;
/// let rulesets = client.api_request("/rulesets", RequestOptions::new()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_more::Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_uri: Uri,
    api_base_path: String,
    auth_base_path: String,
    #[debug(skip)]
    credentials: Arc<dyn CredentialStore>,
    guard: SessionGuard,
}

// Create
impl ApiClient {
    /// Returns a builder with the default configuration.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }
}

// Session
impl ApiClient {
    /// The credential store used by this client.
    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    /// Returns `true` while a credential is stored.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.read().is_some()
    }

    /// Exchanges a username and password for a token and stores it.
    ///
    /// The store is left untouched when the server rejects the credentials.
    ///
    /// # Errors
    ///
    /// [`ApiClientError::RequestFailed`] with the server detail on rejection,
    /// [`ApiClientError::JsonError`] if the response carries no token.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ApiClientError> {
        let options = RequestOptions::new()
            .with_method(Method::POST)
            .with_json(credentials)?;
        let payload = self
            .auth_request(TOKEN_PATH, options)
            .await?
            .unwrap_or(Value::Null);

        let token = decode::<AuthToken>(payload)?;
        self.credentials.write(Some(token.token.as_str()));
        info!(username = %credentials.username, "logged in");
        Ok(token)
    }

    /// Forgets the stored credential. No request is sent.
    pub fn logout(&self) {
        self.credentials.clear();
        info!("logged out");
    }
}

// Calls
impl ApiClient {
    /// Authenticated JSON call to the API.
    ///
    /// Sends `Content-Type: application/json` and the bearer credential when
    /// one is stored; headers in `options` take precedence. The method
    /// defaults to `GET`.
    ///
    /// Returns `None` for a 204 and the decoded payload for any other 2xx. A
    /// 2xx body that is not JSON decodes to an empty object.
    ///
    /// # Errors
    ///
    /// - [`ApiClientError::SessionExpired`] on 401, after the forced logout
    /// - [`ApiClientError::RequestFailed`] on any other non-2xx status
    /// - transport and request building errors
    pub async fn api_request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<Value>, ApiClientError> {
        let request = self.json_request(Endpoint::Api, path, options)?;
        self.exchange(Endpoint::Api, request).await
    }

    /// Like [`api_request`](Self::api_request), decoding the payload into `T`.
    ///
    /// # Errors
    ///
    /// Same as `api_request`, plus [`ApiClientError::JsonError`] when the
    /// payload does not match `T`.
    pub async fn api_request_as<T>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, ApiClientError>
    where
        T: DeserializeOwned,
    {
        self.api_request(path, options)
            .await?
            .map(decode)
            .transpose()
    }

    /// Unauthenticated JSON call to the token endpoints.
    ///
    /// No credential is attached and the session guard is not involved: a
    /// 401 here means the submitted credentials were rejected.
    ///
    /// # Errors
    ///
    /// [`ApiClientError::RequestFailed`] on any non-2xx status, including 401.
    pub async fn auth_request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<Value>, ApiClientError> {
        let request = self.json_request(Endpoint::Auth, path, options)?;
        self.exchange(Endpoint::Auth, request).await
    }

    /// Authenticated multipart upload.
    ///
    /// The method defaults to `POST`. No JSON content type is sent, the
    /// transport sets the multipart boundary. A body set in `options` is
    /// ignored, the form is the body.
    ///
    /// # Errors
    ///
    /// Same as [`api_request`](Self::api_request).
    pub async fn api_upload(
        &self,
        path: &str,
        form: Form,
        options: RequestOptions,
    ) -> Result<Option<Value>, ApiClientError> {
        let url = self.url(Endpoint::Api, path)?;
        let mut headers = HeaderMap::new();
        self.authorize(&mut headers)?;
        options.apply_headers(&mut headers)?;

        let request = self
            .client
            .request(options.method_or(Method::POST), url)
            .headers(headers)
            .multipart(form);
        self.exchange(Endpoint::Api, request).await
    }

    /// Authenticated `GET` returning the raw response for streaming.
    ///
    /// Returns `None` for a 204. Failed responses are decoded for an error
    /// detail like any other call.
    ///
    /// # Errors
    ///
    /// Same as [`api_request`](Self::api_request).
    pub async fn api_download(&self, path: &str) -> Result<Option<Response>, ApiClientError> {
        let url = self.url(Endpoint::Api, path)?;
        let mut headers = HeaderMap::new();
        self.authorize(&mut headers)?;

        let request = self.client.get(url).headers(headers);
        let response = self.dispatch(request).await?;

        let status = response.status();
        if status.is_success() {
            return Ok((status != StatusCode::NO_CONTENT).then_some(response));
        }

        let outcome = Outcome::read(response, Endpoint::Api.is_guarded()).await;
        self.settle(status, outcome)?;
        Ok(None)
    }
}

// Internals
impl ApiClient {
    fn json_request(
        &self,
        endpoint: Endpoint,
        path: &str,
        options: RequestOptions,
    ) -> Result<RequestBuilder, ApiClientError> {
        let url = self.url(endpoint, path)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if endpoint.is_guarded() {
            self.authorize(&mut headers)?;
        }
        options.apply_headers(&mut headers)?;

        let request = self
            .client
            .request(options.method_or(Method::GET), url)
            .headers(headers);
        let request = match &options.body {
            Some(body) => request.body(serde_json::to_vec(body)?),
            None => request,
        };
        Ok(request)
    }

    fn url(&self, endpoint: Endpoint, path: &str) -> Result<Url, ApiClientError> {
        let base_path = match endpoint {
            Endpoint::Api => &self.api_base_path,
            Endpoint::Auth => &self.auth_base_path,
        };
        let base_uri = self.base_uri.to_string();
        let url = format!(
            "{}{base_path}/{}",
            base_uri.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(url.parse::<Url>()?)
    }

    fn authorize(&self, headers: &mut HeaderMap) -> Result<(), ApiClientError> {
        if let Some(token) = self.credentials.read().filter(|token| !token.is_blank()) {
            let (name, value) = bearer_header(&token)?;
            headers.insert(name, value);
        }
        Ok(())
    }

    async fn dispatch(&self, request: RequestBuilder) -> Result<Response, ApiClientError> {
        let request = request.build()?;
        debug!(method = %request.method(), url = %request.url(), "sending...");
        let response = self.client.execute(request).await?;
        debug!(status = %response.status(), "...receiving");
        Ok(response)
    }

    async fn exchange(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<Option<Value>, ApiClientError> {
        let response = self.dispatch(request).await?;
        let status = response.status();
        let outcome = Outcome::read(response, endpoint.is_guarded()).await;
        self.settle(status, outcome)
    }

    fn settle(&self, status: StatusCode, outcome: Outcome) -> Result<Option<Value>, ApiClientError> {
        debug!(%status, ?outcome, "response classified");
        match outcome {
            Outcome::Success(value) => Ok(Some(value)),
            Outcome::Empty => Ok(None),
            Outcome::Failure(detail) => Err(ApiClientError::RequestFailed {
                status: status.as_u16(),
                detail,
            }),
            Outcome::SessionExpired => {
                self.guard.expire();
                Err(ApiClientError::SessionExpired)
            }
        }
    }
}

/// Decodes a payload, reporting the JSON path of the first mismatch.
fn decode<T>(value: Value) -> Result<T, ApiClientError>
where
    T: DeserializeOwned,
{
    serde_path_to_error::deserialize(&value).map_err(|err| ApiClientError::JsonError {
        path: err.path().to_string(),
        body: value.to_string(),
        error: err.into_inner(),
    })
}
