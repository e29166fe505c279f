use std::fmt;

use http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Errors that can occur while turning a stored credential into a request header.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum AuthenticationError {
    /// Bearer token contains invalid characters for HTTP headers.
    #[display("Bearer token contains invalid characters: {message}")]
    InvalidBearerToken {
        /// Description of the invalid characters or format issue.
        message: String,
    },
}

/// Secure wrapper for sensitive string data that automatically zeroes memory on drop.
///
/// Bearer tokens and passwords are held in this wrapper so they never show up
/// in `Debug` output and are only partially displayed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    ///
    /// # Security Note
    /// The returned reference should not be stored for extended periods
    /// to minimize exposure time of sensitive data.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the secret is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Checks if the secure string equals the given string slice.
    pub fn equals_str(&self, other: &str) -> bool {
        self.0 == other
    }

    fn mask_sensitive(value: &str) -> String {
        if value.len() <= 8 {
            "***".to_string()
        } else {
            let head = value.chars().take(4).collect::<String>();
            let tail = value.chars().rev().take(4).collect::<Vec<_>>();
            let tail = tail.into_iter().rev().collect::<String>();
            format!("{head}...{tail}")
        }
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl Serialize for SecureString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Builds the `Authorization: Bearer <token>` header for a stored credential.
///
/// The header value is flagged as sensitive so it is redacted from the
/// transport's debug output.
pub(crate) fn bearer_header(
    token: &SecureString,
) -> Result<(HeaderName, HeaderValue), AuthenticationError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str())).map_err(|e| {
        AuthenticationError::InvalidBearerToken {
            message: e.to_string(),
        }
    })?;
    value.set_sensitive(true);
    Ok((AUTHORIZATION, value))
}

/// Username and password sent to the token endpoint.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// The account name.
    pub username: String,
    /// The account password.
    pub password: SecureString,
}

impl Credentials {
    /// Creates login credentials.
    pub fn new(username: impl Into<String>, password: impl Into<SecureString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Token issued by the authentication endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    /// The bearer credential.
    pub token: SecureString,
    /// Token scheme, `Bearer` for this backend.
    #[serde(default = "AuthToken::default_token_type")]
    pub token_type: String,
    /// Lifetime of the token in seconds, when the server reports it.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl AuthToken {
    fn default_token_type() -> String {
        "Bearer".to_string()
    }
}
