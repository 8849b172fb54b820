//! Client configuration schema.
//!
//! Every field has a default, so an empty document is a valid config:
//!
//! ```toml
//! api_base_url = "https://medlens.example.org/api"
//! frontend_base = "/frontend"
//! session_ttl_hours = 24
//! session_file = "/home/dana/.medlens/session.json"
//!
//! login_redirect_delay_ms = 1500
//! register_login_delay_ms = 2000
//! register_failure_redirect_delay_ms = 2000
//!
//! store_records = false
//! icd_map = false
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use medlens_contracts::error::{MedlensError, MedlensResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Root of the analysis API, without a trailing slash.
    pub api_base_url: String,

    /// Path prefix of the frontend pages redirects point into.
    pub frontend_base: String,

    /// Pause between a successful login and the dashboard redirect.
    pub login_redirect_delay_ms: u64,

    /// Pause between registration and the automatic login.
    pub register_login_delay_ms: u64,

    /// Pause before sending the user to the login page when the automatic
    /// login after registration fails.
    pub register_failure_redirect_delay_ms: u64,

    /// Hours a session stays valid after login.
    pub session_ttl_hours: i64,

    /// Where the file-backed session storage lives. `None` keeps the session
    /// in memory only.
    pub session_file: Option<PathBuf>,

    /// Ask the server to persist analysis results.
    pub store_records: bool,

    /// Ask the server to map diseases to ICD codes.
    pub icd_map: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            frontend_base: "/frontend".to_string(),
            login_redirect_delay_ms: 1500,
            register_login_delay_ms: 2000,
            register_failure_redirect_delay_ms: 2000,
            session_ttl_hours: 24,
            session_file: None,
            store_records: false,
            icd_map: false,
        }
    }
}

impl ClientConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `MedlensError::Config` if the TOML is malformed, carries an
    /// unknown key, or fails validation.
    pub fn from_toml_str(s: &str) -> MedlensResult<Self> {
        let config: ClientConfig = toml::from_str(s).map_err(|e| MedlensError::Config {
            reason: format!("failed to parse client config TOML: {}", e),
        })?;
        config.validate()?;
        debug!(api_base_url = %config.api_base_url, "client config loaded");
        Ok(config)
    }

    /// Read the file at `path` and parse it as a client config.
    pub fn from_file(path: &Path) -> MedlensResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| MedlensError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> MedlensResult<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(MedlensError::Config {
                reason: format!(
                    "api_base_url must start with http:// or https://, got '{}'",
                    self.api_base_url
                ),
            });
        }
        if self.session_ttl_hours <= 0 {
            return Err(MedlensError::Config {
                reason: format!(
                    "session_ttl_hours must be positive, got {}",
                    self.session_ttl_hours
                ),
            });
        }
        Ok(())
    }

    /// `api_base_url` without trailing slashes.
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn login_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.login_redirect_delay_ms)
    }

    pub fn register_login_delay(&self) -> Duration {
        Duration::from_millis(self.register_login_delay_ms)
    }

    pub fn register_failure_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.register_failure_redirect_delay_ms)
    }

    /// Zero every delay. Useful for scripted front ends and tests.
    pub fn without_delays(mut self) -> Self {
        self.login_redirect_delay_ms = 0;
        self.register_login_delay_ms = 0;
        self.register_failure_redirect_delay_ms = 0;
        self
    }
}
