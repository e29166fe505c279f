use super::auth::AuthenticationError;

/// Errors that can occur when using the [`ApiClient`](super::ApiClient).
///
/// Only two variants describe server outcomes: [`SessionExpired`](Self::SessionExpired)
/// and [`RequestFailed`](Self::RequestFailed). The others report problems while
/// building or transporting the request.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ApiClientError {
    /// HTTP client error from the underlying reqwest library.
    ///
    /// Occurs when network requests fail, timeouts occur, or connection issues arise.
    ReqwestError(reqwest::Error),

    /// URL parsing error when constructing request URLs.
    UrlError(url::ParseError),

    /// HTTP protocol error from the http crate.
    HttpError(http::Error),

    /// Invalid HTTP header name.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// The request body could not be serialized to JSON.
    JsonValueError(serde_json::Error),

    /// The stored credential cannot be sent as a header.
    Authentication(AuthenticationError),

    /// Invalid base path configuration.
    #[display("Invalid base path: {error}")]
    #[from(skip)]
    InvalidBasePath {
        /// Description of why the base path is invalid.
        error: String,
    },

    /// An authenticated call was rejected with HTTP 401.
    ///
    /// The stored credential has already been cleared and the login redirect
    /// performed when this error is returned.
    #[display("Session expired")]
    #[from(skip)]
    SessionExpired,

    /// The server answered with a non-success status.
    ///
    /// The display is the human readable detail only, so it can be shown as is.
    #[display("{detail}")]
    #[from(skip)]
    RequestFailed {
        /// The HTTP status code of the response.
        status: u16,
        /// Detail extracted from the response body or synthesized from the status.
        detail: String,
    },

    /// A success payload does not match the requested type.
    #[display("Failed to deserialize JSON at '{path}': {error}\n{body}")]
    #[from(skip)]
    JsonError {
        /// The JSON path where the mismatch occurred.
        path: String,
        /// The underlying JSON error.
        error: serde_json::Error,
        /// The payload that failed to decode.
        body: String,
    },
}

impl ApiClientError {
    /// Returns `true` if the error is a forced logout.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Returns the HTTP status of a server-side failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::SessionExpired => Some(401),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<ApiClientError>();
        assert_sync::<ApiClientError>();
    }

    #[test]
    fn test_request_failed_displays_detail_only() {
        let error = ApiClientError::RequestFailed {
            status: 404,
            detail: "Not Found (HTTP 404)".to_string(),
        };

        assert_eq!(error.to_string(), "Not Found (HTTP 404)");
        assert_eq!(error.status(), Some(404));
        assert!(!error.is_session_expired());
    }

    #[test]
    fn test_session_expired_display() {
        let error = ApiClientError::SessionExpired;

        assert_eq!(error.to_string(), "Session expired");
        assert!(error.is_session_expired());
    }

    #[test]
    fn test_authentication_error_converts() {
        let error = ApiClientError::from(AuthenticationError::InvalidBearerToken {
            message: "contains newline".to_string(),
        });

        insta::assert_snapshot!(error, @"Bearer token contains invalid characters: contains newline");
    }
}
