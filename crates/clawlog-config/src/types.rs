//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [auth]
//! open_browser = true
//!
//! [http]
//! timeout_secs = 30
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
///
/// Every section is optional; a missing file or section falls back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClawLogConfig {
    /// Browser login settings.
    pub auth: AuthConfig,

    /// Outbound HTTP settings.
    pub http: HttpConfig,
}

impl ClawLogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// `[auth]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Launch the system browser during login.
    /// Default: true. Set to false on headless machines and open the
    /// printed URL elsewhere (the redirect still has to reach this host).
    pub open_browser: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { open_browser: true }
    }
}

/// `[http]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Connect/read timeout for token endpoint requests, in seconds.
    /// Default: 30
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
