//! Response normalization.
//!
//! Every response goes through a single decode step, [`ParsedBody::parse`],
//! which never fails: an empty or malformed body degrades to an empty JSON
//! object while the raw text is kept for error reporting. The decoded body is
//! then classified into an [`Outcome`].

use http::StatusCode;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Fields checked, in order, for a server-provided error detail.
const DETAIL_FIELDS: [&str; 2] = ["detail", "message"];

/// Markers of an HTML document that must not be shown to the user.
const HTML_MARKERS: [&str; 2] = ["<!doctype", "<html"];

/// Classified result of a single call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 2xx with a payload.
    Success(Value),
    /// 204 No Content.
    Empty,
    /// Non-success status, with a human readable detail.
    Failure(String),
    /// 401 on an authenticated call.
    SessionExpired,
}

/// Decoded response body along with its raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody {
    value: Value,
    raw: String,
}

impl Default for ParsedBody {
    fn default() -> Self {
        Self {
            value: Value::Object(Map::new()),
            raw: String::new(),
        }
    }
}

impl ParsedBody {
    /// Decodes a response body.
    ///
    /// Blank text yields an empty object and empty raw text. Text that is not
    /// valid JSON yields an empty object and keeps the raw text.
    pub fn parse(text: impl Into<String>) -> Self {
        let raw = text.into();
        if raw.trim().is_empty() {
            return Self::default();
        }

        let value = match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value,
            Err(error) => {
                debug!(%error, "response body is not JSON, keeping raw text");
                Value::Object(Map::new())
            }
        };
        Self { value, raw }
    }

    /// Reads and decodes the body of a response.
    ///
    /// A transport failure while reading is treated as an empty body.
    pub(crate) async fn read(response: reqwest::Response) -> Self {
        match response.text().await {
            Ok(text) => Self::parse(text),
            Err(error) => {
                warn!(%error, "unable to read response body");
                Self::default()
            }
        }
    }

    /// The decoded value, an empty object when the body was blank or malformed.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The raw body text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Consumes the body and returns the decoded value.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Extracts a human readable error detail for a failed response.
    ///
    /// Prefers a non-empty `detail` or `message` field, then the raw text
    /// unless it is an HTML page, then a message built from the status.
    pub fn error_detail(&self, status: StatusCode) -> String {
        if let Some(detail) = self.detail_field() {
            return detail.to_string();
        }

        let text = self.raw.trim();
        if !text.is_empty() && !looks_like_html(text) {
            return text.to_string();
        }

        status_detail(status)
    }

    fn detail_field(&self) -> Option<&str> {
        DETAIL_FIELDS.iter().find_map(|field| {
            self.value
                .get(field)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|detail| !detail.is_empty())
        })
    }
}

impl Outcome {
    /// Classifies a status and its decoded body.
    ///
    /// When `guarded` is set a 401 means the session expired; otherwise it is
    /// an ordinary failure. A 204 is always [`Outcome::Empty`].
    pub fn classify(status: StatusCode, body: ParsedBody, guarded: bool) -> Self {
        if status == StatusCode::NO_CONTENT {
            return Self::Empty;
        }
        if guarded && status == StatusCode::UNAUTHORIZED {
            return Self::SessionExpired;
        }
        if status.is_success() {
            return Self::Success(body.into_value());
        }
        Self::Failure(body.error_detail(status))
    }

    /// Classifies a response, reading its body only when needed.
    ///
    /// A 204, or a 401 on a guarded call, is decided from the status alone.
    pub(crate) async fn read(response: reqwest::Response, guarded: bool) -> Self {
        let status = response.status();
        if status == StatusCode::NO_CONTENT || (guarded && status == StatusCode::UNAUTHORIZED) {
            return Self::classify(status, ParsedBody::default(), guarded);
        }
        Self::classify(status, ParsedBody::read(response).await, guarded)
    }
}

/// Returns `true` for text starting like an HTML document.
pub(crate) fn looks_like_html(text: &str) -> bool {
    let head = text
        .trim_start()
        .chars()
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    HTML_MARKERS.iter().any(|marker| head.starts_with(marker))
}

/// Builds a detail such as `Not Found (HTTP 404)`.
pub(crate) fn status_detail(status: StatusCode) -> String {
    let reason = status.canonical_reason().unwrap_or("Request failed");
    format!("{reason} (HTTP {})", status.as_u16())
}
