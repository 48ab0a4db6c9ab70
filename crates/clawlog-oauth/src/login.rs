//! End-to-end browser login.
//!
//! One call to [`LoginFlow::login`] is one attempt:
//!
//! ```text
//! INIT → LISTENER_STARTED → BROWSER_OPENED → AWAITING_CALLBACK
//!      → CODE_RECEIVED → STATE_VALIDATED → EXCHANGED → PERSISTED
//! ```
//!
//! Any step may exit with an [`OAuthError`]. The browser is opened only after
//! the listener is bound, and the code is exchanged only after `state` matches.

use std::sync::Arc;

use crate::callback::CallbackListener;
use crate::error::{OAuthError, Result};
use crate::exchange::{HttpTokenExchanger, TokenExchanger, TokenGrant};
use crate::oauth::{AuthorizationRequest, OAuthConfig};
use crate::refresh::TokenRefresher;
use crate::token_store::TokenStore;
use crate::types::TokenRecord;

/// Opens the authorization URL for the user.
pub trait BrowserLauncher: Send + Sync + std::fmt::Debug {
    fn open(&self, url: &str) -> Result<()>;
}

/// Launches the platform's default browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        open::that(url).map_err(|e| OAuthError::Browser(e.to_string()))
    }
}

/// Does nothing; the user copies the printed URL by hand.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualBrowser;

impl BrowserLauncher for ManualBrowser {
    fn open(&self, _url: &str) -> Result<()> {
        Ok(())
    }
}

type UrlHook = Box<dyn Fn(&str) + Send + Sync>;

/// Login orchestrator bound to one provider configuration.
pub struct LoginFlow {
    config: OAuthConfig,
    exchanger: Arc<dyn TokenExchanger>,
    store: Arc<dyn TokenStore>,
    browser: Arc<dyn BrowserLauncher>,
    on_authorize_url: Option<UrlHook>,
}

impl std::fmt::Debug for LoginFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginFlow")
            .field("config", &self.config)
            .field("exchanger", &self.exchanger)
            .field("store", &self.store)
            .field("browser", &self.browser)
            .finish_non_exhaustive()
    }
}

impl LoginFlow {
    /// Flow using the HTTP exchanger and the system browser.
    pub fn new(config: OAuthConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let exchanger = Arc::new(HttpTokenExchanger::new(&config)?);
        Ok(Self::with_parts(
            config,
            exchanger,
            store,
            Arc::new(SystemBrowser),
        ))
    }

    /// Flow with every collaborator supplied explicitly.
    pub fn with_parts(
        config: OAuthConfig,
        exchanger: Arc<dyn TokenExchanger>,
        store: Arc<dyn TokenStore>,
        browser: Arc<dyn BrowserLauncher>,
    ) -> Self {
        Self {
            config,
            exchanger,
            store,
            browser,
            on_authorize_url: None,
        }
    }

    pub fn with_browser(mut self, browser: Arc<dyn BrowserLauncher>) -> Self {
        self.browser = browser;
        self
    }

    /// Called with the authorization URL once the listener is ready, so the
    /// caller can show it for manual copy.
    pub fn on_authorize_url(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_authorize_url = Some(Box::new(hook));
        self
    }

    /// Refresher sharing this flow's exchanger and store.
    pub fn refresher(&self) -> TokenRefresher {
        TokenRefresher::new(
            self.config.client_id.clone(),
            self.exchanger.clone(),
            self.store.clone(),
        )
    }

    /// Run one login attempt.
    pub async fn login(&self) -> Result<TokenRecord> {
        let request = AuthorizationRequest::new(&self.config);
        let auth_url = request.authorization_url(&self.config);

        let listener = CallbackListener::bind(self.config.callback_addr()).await?;
        tracing::debug!(port = self.config.callback_port, "Login: listener started");

        if let Some(hook) = &self.on_authorize_url {
            hook(&auth_url);
        }
        if let Err(e) = self.browser.open(&auth_url) {
            tracing::warn!(error = %e, "Could not open browser automatically");
        }
        tracing::debug!("Login: awaiting callback");

        let callback = listener.wait(self.config.callback_timeout).await?;
        tracing::debug!("Login: callback received");

        let code = callback
            .code
            .filter(|c| !c.is_empty())
            .ok_or(OAuthError::MissingCode {
                error: callback.error,
            })?;

        if callback.state.as_deref() != Some(request.state.as_str()) {
            tracing::warn!("Login: state mismatch, discarding authorization code");
            return Err(OAuthError::StateMismatch);
        }
        tracing::debug!("Login: state validated");

        let grant = TokenGrant::AuthorizationCode {
            client_id: self.config.client_id.clone(),
            code,
            redirect_uri: request.redirect_uri.clone(),
            code_verifier: request.verifier.clone(),
        };
        let record = self.exchanger.exchange(&grant).await?;
        tracing::debug!("Login: code exchanged");

        let stored = self.store.save(&record).await?;
        tracing::info!("OAuth login complete");
        Ok(stored)
    }
}
