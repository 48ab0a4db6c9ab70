//! Lazy token refresh.
//!
//! Refresh is attempted only when a caller asks for a usable credential and
//! the stored one is within five minutes of expiry. Failures are never fatal:
//! the stale record is handed back and the downstream API call reports the
//! expired credential.

use std::sync::Arc;

use crate::error::{OAuthError, Result};
use crate::exchange::{TokenExchanger, TokenGrant};
use crate::token_store::TokenStore;
use crate::types::TokenRecord;

/// Result of a refresh check that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Still valid; returned unchanged.
    Fresh(TokenRecord),
    /// Exchanged for a new token.
    Refreshed(TokenRecord),
}

impl RefreshOutcome {
    pub fn into_record(self) -> TokenRecord {
        match self {
            RefreshOutcome::Fresh(record) | RefreshOutcome::Refreshed(record) => record,
        }
    }
}

/// Applies the refresh policy against a token endpoint and store.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    client_id: String,
    exchanger: Arc<dyn TokenExchanger>,
    store: Arc<dyn TokenStore>,
}

impl TokenRefresher {
    pub fn new(
        client_id: impl Into<String>,
        exchanger: Arc<dyn TokenExchanger>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            exchanger,
            store,
        }
    }

    /// Return a usable record, refreshing if needed. Never fails.
    pub async fn ensure_fresh(&self, record: TokenRecord) -> TokenRecord {
        match self.try_refresh(&record).await {
            Ok(outcome) => outcome.into_record(),
            Err(e) => {
                tracing::warn!(error = %e, "Continuing with stale OAuth token");
                record
            }
        }
    }

    /// Refresh check that reports why a stale token could not be refreshed.
    ///
    /// Errors are [`OAuthError::RefreshUnavailable`] or [`OAuthError::RefreshFailed`].
    pub async fn try_refresh(&self, record: &TokenRecord) -> Result<RefreshOutcome> {
        if !record.needs_refresh() {
            return Ok(RefreshOutcome::Fresh(record.clone()));
        }

        let refresh_token = record
            .refresh_token
            .clone()
            .ok_or(OAuthError::RefreshUnavailable)?;

        tracing::info!("Token expired, refreshing...");
        let grant = TokenGrant::RefreshToken {
            client_id: self.client_id.clone(),
            refresh_token: refresh_token.clone(),
        };
        let mut refreshed = self
            .exchanger
            .exchange(&grant)
            .await
            .map_err(|e| OAuthError::RefreshFailed(Box::new(e)))?;

        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = Some(refresh_token);
        }

        // A save failure does not discard the refreshed token.
        let refreshed = match self.store.save(&refreshed).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "Refreshed token could not be saved");
                refreshed
            }
        };

        tracing::info!("Token refreshed successfully");
        Ok(RefreshOutcome::Refreshed(refreshed))
    }
}
