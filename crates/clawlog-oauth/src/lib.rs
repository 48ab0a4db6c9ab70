//! OAuth 2.0 Authorization Code + PKCE login for the ChatGPT subscription backend.
//!
//! Obtains a bearer credential without a client secret and keeps it usable.
//! Collaborators call two entry points:
//!
//! - [`LoginFlow::login`]: run one browser login attempt, returning the stored record
//! - [`TokenRefresher::ensure_fresh`]: turn a possibly stale record into a usable one
//!
//! # Components
//!
//! - [`pkce`]: verifier/challenge pairs and `state` nonces
//! - [`oauth`]: provider configuration and authorization URL
//! - [`callback`]: single-use localhost redirect listener
//! - [`exchange`]: code and refresh grants against the token endpoint
//! - [`token_store`]: owner-only JSON token file
//! - [`refresh`]: lazy refresh policy
//! - [`login`]: the orchestrator

pub mod callback;
pub mod error;
pub mod exchange;
pub mod login;
pub mod oauth;
pub mod pkce;
pub mod refresh;
pub mod token_store;
pub mod types;

pub use callback::{CallbackListener, CallbackResult};
pub use error::{OAuthError, Result};
pub use exchange::{HttpTokenExchanger, TokenExchanger, TokenGrant};
pub use login::{BrowserLauncher, LoginFlow, ManualBrowser, SystemBrowser};
pub use oauth::{AuthorizationRequest, OAuthConfig};
pub use pkce::{PkceChallenge, generate_state};
pub use refresh::{RefreshOutcome, TokenRefresher};
pub use token_store::{FileTokenStore, InMemoryTokenStore, TokenStore};
pub use types::{IdTokenClaims, TokenInfo, TokenRecord, now_epoch_secs};
