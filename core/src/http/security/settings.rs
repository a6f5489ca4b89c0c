//! TOML configuration surface.
//!
//! Every field has a default, so an empty file is a valid configuration
//! and reproduces the stock deployment:
//!
//! ```toml
//! login_url = "/api/v1/authc/nologin"
//! unauthorized_url = "/api/v1/authc/unauthorized"
//! logout_redirect_url = "/"
//! redirect_mode = "found"
//! store_failure_policy = "fail-closed"
//!
//! [session]
//! timeout_secs = 1800
//! lookup_timeout_ms = 2000
//! cookie_name = "GKSESSIONID"
//! key_prefix = "user_sessions:"
//! # redis_url = "redis://127.0.0.1:6379"
//!
//! [credentials]
//! algorithm = "SHA-256"
//! iterations = 1024
//!
//! [[filter_chain]]
//! pattern = "/static/**"
//! rules = "anon"
//! ```
//!
//! A `[[filter_chain]]` list in the file replaces the default chain as a
//! whole; entries are evaluated in file order.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::http::error::ConfigError;
use crate::http::security::crypto::{HashedCredentialsMatcher, DEFAULT_HASH_ITERATIONS};
use crate::http::security::filter_chain::FilterChain;
use crate::http::security::manager::{RedirectMode, StoreFailurePolicy};
use crate::http::security::session::{
    MemorySessionStore, SessionCookie, SessionStore, DEFAULT_COOKIE_NAME, DEFAULT_KEY_PREFIX,
    DEFAULT_LOOKUP_TIMEOUT, DEFAULT_SESSION_TIMEOUT,
};

pub const DEFAULT_LOGIN_URL: &str = "/api/v1/authc/nologin";
pub const DEFAULT_UNAUTHORIZED_URL: &str = "/api/v1/authc/unauthorized";
pub const DEFAULT_LOGOUT_REDIRECT_URL: &str = "/";

/// One `pattern = rules` line of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDefinition {
    pub pattern: String,
    pub rules: String,
}

impl ChainDefinition {
    pub fn new(pattern: &str, rules: &str) -> Self {
        ChainDefinition {
            pattern: pattern.to_string(),
            rules: rules.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub timeout_secs: u64,
    pub lookup_timeout_ms: u64,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub key_prefix: String,
    /// When set, sessions live in Redis instead of process memory.
    pub redis_url: Option<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            timeout_secs: DEFAULT_SESSION_TIMEOUT.as_secs(),
            lookup_timeout_ms: DEFAULT_LOOKUP_TIMEOUT.as_millis() as u64,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_secure: false,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            redis_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsSettings {
    pub algorithm: String,
    pub iterations: u32,
}

impl Default for CredentialsSettings {
    fn default() -> Self {
        CredentialsSettings {
            algorithm: "SHA-256".to_string(),
            iterations: DEFAULT_HASH_ITERATIONS,
        }
    }
}

/// Root of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub login_url: String,
    pub unauthorized_url: String,
    pub logout_redirect_url: String,
    pub redirect_mode: RedirectMode,
    pub store_failure_policy: StoreFailurePolicy,
    pub case_insensitive_paths: bool,
    pub session: SessionSettings,
    pub credentials: CredentialsSettings,
    pub filter_chain: Vec<ChainDefinition>,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        SecuritySettings {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            unauthorized_url: DEFAULT_UNAUTHORIZED_URL.to_string(),
            logout_redirect_url: DEFAULT_LOGOUT_REDIRECT_URL.to_string(),
            redirect_mode: RedirectMode::default(),
            store_failure_policy: StoreFailurePolicy::default(),
            case_insensitive_paths: false,
            session: SessionSettings::default(),
            credentials: CredentialsSettings::default(),
            filter_chain: default_chain(),
        }
    }
}

fn default_chain() -> Vec<ChainDefinition> {
    [
        ("/", "anon"),
        ("/static/**", "anon"),
        ("/api/v1/authc/**", "anon"),
        ("/error", "anon"),
        ("/swagger-ui.html", "anon"),
        ("/webjars/springfox-swagger-ui/**", "anon"),
        ("/swagger-resources/**", "anon"),
        ("/v2/api-docs", "anon"),
        ("/**", "authc"),
    ]
    .into_iter()
    .map(|(pattern, rules)| ChainDefinition::new(pattern, rules))
    .collect()
}

impl SecuritySettings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: SecuritySettings =
            toml::from_str(content).map_err(|e| ConfigError::Settings {
                reason: e.to_string(),
            })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Settings {
            reason: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks the scalar fields. Patterns and rules are checked by
    /// [`build_filter_chain`](Self::build_filter_chain).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.timeout_secs == 0 {
            return Err(ConfigError::invalid_setting(
                "session.timeout_secs",
                "must be greater than 0",
            ));
        }
        if self.session.lookup_timeout_ms == 0 {
            return Err(ConfigError::invalid_setting(
                "session.lookup_timeout_ms",
                "must be greater than 0",
            ));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(ConfigError::invalid_setting(
                "session.cookie_name",
                "must not be empty",
            ));
        }
        if self.filter_chain.is_empty() {
            return Err(ConfigError::invalid_setting(
                "filter_chain",
                "at least one entry is required",
            ));
        }
        Ok(())
    }

    pub fn build_filter_chain(&self) -> Result<FilterChain, ConfigError> {
        FilterChain::builder()
            .login_url(&self.login_url)
            .unauthorized_url(&self.unauthorized_url)
            .logout_redirect_url(&self.logout_redirect_url)
            .case_insensitive(self.case_insensitive_paths)
            .definitions(
                self.filter_chain
                    .iter()
                    .map(|d| (d.pattern.as_str(), d.rules.as_str())),
            )
            .build()
    }

    pub fn build_credentials_matcher(&self) -> Result<HashedCredentialsMatcher, ConfigError> {
        HashedCredentialsMatcher::from_name(&self.credentials.algorithm, self.credentials.iterations)
    }

    pub fn build_session_cookie(&self) -> SessionCookie {
        SessionCookie::new(&self.session.cookie_name).secure(self.session.cookie_secure)
    }

    /// Redis when `session.redis_url` is set, process memory otherwise.
    pub fn session_store(&self) -> Result<Arc<dyn SessionStore>, ConfigError> {
        match &self.session.redis_url {
            None => Ok(Arc::new(MemorySessionStore::new())),
            #[cfg(feature = "redis-store")]
            Some(url) => {
                let store = crate::http::security::session::RedisSessionStore::open(url)?
                    .key_prefix(&self.session.key_prefix);
                Ok(Arc::new(store))
            }
            #[cfg(not(feature = "redis-store"))]
            Some(_) => Err(ConfigError::invalid_setting(
                "session.redis_url",
                "built without the `redis-store` feature",
            )),
        }
    }
}
