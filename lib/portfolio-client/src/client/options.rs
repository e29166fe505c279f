use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde::Serialize;
use serde_json::Value;

use super::ApiClientError;

/// Per-call request options: method, extra headers and JSON body.
///
/// Headers given here override the defaults set by the client, names are
/// compared case-insensitively.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use portfolio_client::RequestOptions;
/// use serde_json::json;
///
/// # fn example() -> Result<(), portfolio_client::ApiClientError> {
/// let options = RequestOptions::new()
///     .with_method(Method::PUT)
///     .with_header("X-Request-Id", "abc-123")
///     .with_json(&json!({"name": "Core"}))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub(super) method: Option<Method>,
    pub(super) headers: Vec<(String, String)>,
    pub(super) body: Option<Value>,
}

impl RequestOptions {
    /// Creates empty options: default method, no extra header, no body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Adds a header. A later header with the same name wins.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the JSON body from any serializable value.
    pub fn with_json<T>(mut self, body: &T) -> Result<Self, ApiClientError>
    where
        T: Serialize + ?Sized,
    {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Sets an already built JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub(super) fn method_or(&self, default: Method) -> Method {
        self.method.clone().unwrap_or(default)
    }

    /// Writes the caller headers over `headers`.
    pub(super) fn apply_headers(&self, headers: &mut HeaderMap) -> Result<(), ApiClientError> {
        for (name, value) in &self.headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
        Ok(())
    }
}
