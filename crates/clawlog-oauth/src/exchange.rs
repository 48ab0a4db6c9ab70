//! Token endpoint exchanges: authorization code and refresh token grants.

use async_trait::async_trait;

use crate::error::{OAuthError, Result};
use crate::oauth::OAuthConfig;
use crate::types::{TokenRecord, TokenResponse, now_epoch_secs};

/// Maximum number of characters of an error body kept in [`OAuthError::TokenExchange`].
const ERROR_BODY_LIMIT: usize = 200;

/// Parameter sets accepted by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenGrant {
    AuthorizationCode {
        client_id: String,
        code: String,
        redirect_uri: String,
        code_verifier: String,
    },
    RefreshToken {
        client_id: String,
        refresh_token: String,
    },
}

impl TokenGrant {
    /// Form fields for the `application/x-www-form-urlencoded` body.
    pub fn form_params(&self) -> Vec<(&'static str, &str)> {
        match self {
            TokenGrant::AuthorizationCode {
                client_id,
                code,
                redirect_uri,
                code_verifier,
            } => vec![
                ("grant_type", "authorization_code"),
                ("client_id", client_id.as_str()),
                ("code", code.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("code_verifier", code_verifier.as_str()),
            ],
            TokenGrant::RefreshToken {
                client_id,
                refresh_token,
            } => vec![
                ("grant_type", "refresh_token"),
                ("client_id", client_id.as_str()),
                ("refresh_token", refresh_token.as_str()),
            ],
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            TokenGrant::AuthorizationCode { .. } => "authorization_code",
            TokenGrant::RefreshToken { .. } => "refresh_token",
        }
    }
}

/// Performs a single exchange against the token endpoint. No retries.
#[async_trait]
pub trait TokenExchanger: Send + Sync + std::fmt::Debug {
    async fn exchange(&self, grant: &TokenGrant) -> Result<TokenRecord>;
}

/// reqwest-backed exchanger.
#[derive(Debug, Clone)]
pub struct HttpTokenExchanger {
    client: reqwest::Client,
    token_url: String,
}

impl HttpTokenExchanger {
    pub fn new(config: &OAuthConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.http_timeout)
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            client,
            token_url: config.token_url.clone(),
        })
    }
}

#[async_trait]
impl TokenExchanger for HttpTokenExchanger {
    async fn exchange(&self, grant: &TokenGrant) -> Result<TokenRecord> {
        tracing::debug!(grant = grant.kind(), "Requesting token");

        let response = self
            .client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&grant.form_params())
            .send()
            .await
            .map_err(|e| OAuthError::Network(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OAuthError::TokenExchange {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let now = now_epoch_secs();
        let parsed: TokenResponse = response.json().await.map_err(|e| {
            OAuthError::Serialization(format!("failed to parse token response: {}", e))
        })?;

        parsed.into_record(now).ok_or(OAuthError::MissingAccessToken)
    }
}

/// Keep at most [`ERROR_BODY_LIMIT`] characters of an error body.
fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
