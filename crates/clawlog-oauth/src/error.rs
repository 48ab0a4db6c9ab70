//! Error types for the OAuth login flow.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, OAuthError>;

/// Errors that can occur during login, token exchange, or refresh.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// The callback port is already bound by another process.
    #[error("callback port {port} is already in use; close the other process and retry")]
    PortInUse { port: u16 },

    /// The callback listener could not bind for a reason other than a busy port.
    #[error("failed to bind callback listener on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// No callback arrived within the wait budget.
    #[error("timed out after {timeout:?} waiting for the browser login to complete")]
    CallbackTimeout { timeout: std::time::Duration },

    /// The callback arrived but carried no authorization code.
    #[error("callback did not contain an authorization code{}", provider_error_suffix(.error))]
    MissingCode { error: Option<String> },

    /// The echoed `state` did not match the one we sent.
    #[error("state mismatch on callback, possible CSRF attempt; login aborted")]
    StateMismatch,

    /// Token endpoint answered with a non-success status.
    #[error("token exchange failed ({status}): {body}")]
    TokenExchange { status: u16, body: String },

    /// Token endpoint answered 2xx without an access token.
    #[error("token response did not contain an access_token")]
    MissingAccessToken,

    /// Refresh was needed but no refresh token is stored.
    #[error("access token expired and no refresh token is available; run `claw-log auth login`")]
    RefreshUnavailable,

    /// The refresh exchange itself failed.
    #[error("token refresh failed: {0}")]
    RefreshFailed(Box<OAuthError>),

    /// Network/HTTP transport error.
    #[error("network error: {0}")]
    Network(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Token file could not be written or removed.
    #[error("token storage error: {0}")]
    Storage(String),

    /// The system browser could not be launched.
    #[error("failed to open browser: {0}")]
    Browser(String),
}

fn provider_error_suffix(error: &Option<String>) -> String {
    match error {
        Some(e) => format!(" (provider error: {e})"),
        None => String::new(),
    }
}

impl From<reqwest::Error> for OAuthError {
    fn from(e: reqwest::Error) -> Self {
        OAuthError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for OAuthError {
    fn from(e: serde_json::Error) -> Self {
        OAuthError::Serialization(e.to_string())
    }
}
