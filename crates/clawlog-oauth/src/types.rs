//! Persisted credential record and display helpers.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

/// Seconds before `expires_at` at which a token is considered stale.
pub const REFRESH_MARGIN_SECS: u64 = 5 * 60;

/// Current time as epoch seconds.
pub fn now_epoch_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// OAuth credential as returned by the token endpoint and stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: u64,
    /// Derived locally as exchange time + `expires_in`; zero when unknown.
    #[serde(default)]
    pub expires_at: u64,
    #[serde(default)]
    pub saved_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Raw token endpoint response. Every field is optional so a missing
/// access token can be reported distinctly from malformed JSON.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    id_token: Option<String>,
    expires_in: Option<u64>,
    token_type: Option<String>,
    scope: Option<String>,
}

impl TokenResponse {
    /// Convert into a record, stamping `expires_at` relative to `now`.
    pub(crate) fn into_record(self, now: u64) -> Option<TokenRecord> {
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        let expires_in = self.expires_in.unwrap_or(0);
        let expires_at = match self.expires_in {
            Some(secs) => now.saturating_add(secs),
            None => 0,
        };

        Some(TokenRecord {
            access_token,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            id_token: self.id_token,
            expires_in,
            expires_at,
            saved_at: 0,
            token_type: self.token_type,
            scope: self.scope,
        })
    }
}

impl TokenRecord {
    /// True when the token should be refreshed before use at time `now`.
    pub fn needs_refresh_at(&self, now: u64) -> bool {
        now.saturating_add(REFRESH_MARGIN_SECS) >= self.expires_at
    }

    /// True when the token should be refreshed before use.
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh_at(now_epoch_secs())
    }

    /// Unverified claims from the `id_token` payload, for display only.
    pub fn id_token_claims(&self) -> Option<IdTokenClaims> {
        let payload = self.id_token.as_deref()?.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Summary for status output.
    pub fn info(&self) -> TokenInfo {
        let now = now_epoch_secs();
        TokenInfo {
            saved_at: self.saved_at,
            expires_in_secs: self.expires_at.saturating_sub(now),
            is_expired: self.needs_refresh_at(now),
            has_refresh_token: self.refresh_token.is_some(),
            scope: self.scope.clone().unwrap_or_default(),
            email: self.id_token_claims().and_then(|c| c.email),
        }
    }
}

/// Subset of OpenID Connect claims shown to the user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdTokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Information about a stored token for display.
#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    pub saved_at: u64,
    pub expires_in_secs: u64,
    pub is_expired: bool,
    pub has_refresh_token: bool,
    pub scope: String,
    pub email: Option<String>,
}

impl TokenInfo {
    pub fn expires_in_display(&self) -> String {
        if self.is_expired {
            "Expired (will refresh on next use)".to_string()
        } else {
            let hours = self.expires_in_secs / 3600;
            let minutes = (self.expires_in_secs % 3600) / 60;
            format!("{}h {}m", hours, minutes)
        }
    }

    /// `saved_at` rendered as RFC 3339, if set.
    pub fn saved_at_display(&self) -> Option<String> {
        if self.saved_at == 0 {
            return None;
        }
        chrono::DateTime::from_timestamp(self.saved_at as i64, 0).map(|dt| dt.to_rfc3339())
    }
}
