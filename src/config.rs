use figment::{Figment, providers::Env};
use serde::Deserialize;
use std::sync::LazyLock;

/// Process-wide configuration, read once from the environment.
///
/// Variables use the `WAYPOST_` prefix with `__` separating nested
/// sections, e.g. `WAYPOST_AUTH__ENABLED=true` or
/// `WAYPOST_THROTTLE__MAX_ATTEMPTS=5`. Every field has a default so an
/// empty environment yields a working (auth-disabled) instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("invalid WAYPOST_* environment configuration")
});

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub listen: String,
    /// sqlx connection string, e.g. `sqlite:waypost.sqlite`.
    pub database_url: String,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub loglevel: String,
    /// Drop the `Secure` attribute from cookies (plain-HTTP deployments).
    pub insecure_cookie: bool,
    pub auth: AuthConfig,
    pub throttle: ThrottleConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Master switch. When off, every request is treated as authorized
    /// and login hands out short-lived guest tokens.
    pub enabled: bool,
    pub username: String,
    /// bcrypt hash of the password; generate one with `mkpasswd`.
    pub password_hash: String,
    /// HMAC secret for session tokens.
    pub secret: String,
    /// Gate reads as well as writes.
    pub required_for_read: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub max_attempts: u32,
    pub window_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:waypost.sqlite".to_string(),
            loglevel: "info".to_string(),
            insecure_cookie: false,
            auth: AuthConfig::default(),
            throttle: ThrottleConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            username: String::new(),
            password_hash: String::new(),
            secret: "default-secret".to_string(),
            required_for_read: false,
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_secs: 15 * 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Env::prefixed("WAYPOST_").split("__"))
            .extract()
    }
}
