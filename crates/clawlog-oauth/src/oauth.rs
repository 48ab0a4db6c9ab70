//! Provider identity and authorization request construction.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::pkce::{PkceChallenge, generate_state};

/// Fixed callback path registered with the identity provider.
pub const CALLBACK_PATH: &str = "/auth/callback";

/// How long a login attempt waits for the browser redirect.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Default connect/read timeout for token endpoint requests.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable provider configuration handed to the login flow.
///
/// The callback port is dictated by the redirect URI registered with the
/// provider, so it is part of the provider identity rather than a user
/// setting.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub authorize_url: String,
    pub token_url: String,
    pub scope: String,
    pub callback_host: IpAddr,
    pub callback_port: u16,
    /// Provider-specific flags appended to the authorization URL.
    pub extra_authorize_params: Vec<(String, String)>,
    pub callback_timeout: Duration,
    pub http_timeout: Duration,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self::openai_codex()
    }
}

impl OAuthConfig {
    /// Public client used by the ChatGPT subscription backend.
    pub fn openai_codex() -> Self {
        Self {
            client_id: "app_EMoamEEZ73f0CkXaXp7hrann".to_string(),
            authorize_url: "https://auth.openai.com/oauth/authorize".to_string(),
            token_url: "https://auth.openai.com/oauth/token".to_string(),
            scope: "openid profile email offline_access".to_string(),
            callback_host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            callback_port: 1455,
            extra_authorize_params: vec![
                ("id_token_add_organizations".to_string(), "true".to_string()),
                ("codex_cli_simplified_flow".to_string(), "true".to_string()),
            ],
            callback_timeout: CALLBACK_TIMEOUT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_callback_port(mut self, port: u16) -> Self {
        self.callback_port = port;
        self
    }

    pub fn with_callback_timeout(mut self, timeout: Duration) -> Self {
        self.callback_timeout = timeout;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Redirect URI the provider sends the browser back to.
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}{}", self.callback_port, CALLBACK_PATH)
    }

    /// Socket address the callback listener binds.
    pub fn callback_addr(&self) -> SocketAddr {
        SocketAddr::new(self.callback_host, self.callback_port)
    }
}

/// Per-attempt request material. Never persisted.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub verifier: String,
    pub challenge: String,
    pub state: String,
    pub redirect_uri: String,
}

impl AuthorizationRequest {
    /// Fresh PKCE pair and state for one login attempt.
    pub fn new(config: &OAuthConfig) -> Self {
        let pkce = PkceChallenge::generate();
        Self {
            verifier: pkce.verifier,
            challenge: pkce.challenge,
            state: generate_state(),
            redirect_uri: config.redirect_uri(),
        }
    }

    /// Build the authorization URL for this request.
    pub fn authorization_url(&self, config: &OAuthConfig) -> String {
        let mut params: Vec<(&str, &str)> = vec![
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", config.scope.as_str()),
            ("state", self.state.as_str()),
            ("code_challenge", self.challenge.as_str()),
            ("code_challenge_method", "S256"),
        ];
        params.extend(
            config
                .extra_authorize_params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", config.authorize_url, query)
    }
}
