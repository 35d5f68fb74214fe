//! Process-wide configuration, read once at startup.
//!
//! Values come from environment variables. [`PortalConfig::from_lookup`]
//! takes any `key -> value` function so tests don't have to touch the
//! real process environment.

use std::fmt;

use hrportal_session::{
    DEFAULT_MAX_AGE_SECS, REMEMBER_MAX_AGE_SECS, SessionCookieConfig, SessionSecret,
};

use crate::ConfigError;

pub const ENV_BIND: &str = "PORTAL_BIND";
pub const ENV_ENVIRONMENT: &str = "PORTAL_ENV";
pub const ENV_AUTH_SECRET: &str = "AUTH_SECRET";
pub const ENV_MAX_AGE: &str = "SESSION_MAX_AGE_SECS";
pub const ENV_REMEMBER_MAX_AGE: &str = "SESSION_REMEMBER_MAX_AGE_SECS";
pub const ENV_EMBED_EXPIRY: &str = "SESSION_EMBED_EXPIRY";

/// Shortest secret accepted in production, in bytes.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Well-known development secrets that must never sign production tokens.
const KNOWN_DEFAULT_SECRETS: &[&str] = &["dev_secret", "secret", "changeme"];

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Deployment environment. Decides how strict secret handling is and
/// whether cookies get the `Secure` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_ENVIRONMENT,
                value: raw.to_string(),
            }),
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

// ---------------------------------------------------------------------------
// PortalConfig
// ---------------------------------------------------------------------------

/// Everything the portal reads from its environment.
#[derive(Clone)]
pub struct PortalConfig {
    /// Address to listen on (`PORTAL_BIND`, default `127.0.0.1:3000`).
    pub bind_addr: String,
    /// `PORTAL_ENV`, default development.
    pub environment: Environment,
    /// `AUTH_SECRET`. Required in production.
    pub auth_secret: Option<String>,
    /// Normal session lifetime in seconds (`SESSION_MAX_AGE_SECS`, 8h).
    pub session_max_age_secs: u64,
    /// "Remember me" lifetime in seconds (`SESSION_REMEMBER_MAX_AGE_SECS`, 7d).
    pub remember_max_age_secs: u64,
    /// Whether to sign an expiry into each token (`SESSION_EMBED_EXPIRY`,
    /// default on). When off, expiry is left entirely to the cookie's
    /// `Max-Age`.
    pub embed_expiry: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            environment: Environment::Development,
            auth_secret: None,
            session_max_age_secs: DEFAULT_MAX_AGE_SECS,
            remember_max_age_secs: REMEMBER_MAX_AGE_SECS,
            embed_expiry: true,
        }
    }
}

impl fmt::Debug for PortalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalConfig")
            .field("bind_addr", &self.bind_addr)
            .field("environment", &self.environment)
            .field("auth_secret", &self.auth_secret.as_ref().map(|_| "<redacted>"))
            .field("session_max_age_secs", &self.session_max_age_secs)
            .field("remember_max_age_secs", &self.remember_max_age_secs)
            .field("embed_expiry", &self.embed_expiry)
            .finish()
    }
}

impl PortalConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Unset and empty values fall
    /// back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let environment = match get(ENV_ENVIRONMENT) {
            Some(raw) => Environment::parse(&raw)?,
            None => defaults.environment,
        };

        Ok(Self {
            bind_addr: get(ENV_BIND).unwrap_or(defaults.bind_addr),
            environment,
            auth_secret: get(ENV_AUTH_SECRET),
            session_max_age_secs: parse_or(
                get(ENV_MAX_AGE),
                ENV_MAX_AGE,
                defaults.session_max_age_secs,
            )?,
            remember_max_age_secs: parse_or(
                get(ENV_REMEMBER_MAX_AGE),
                ENV_REMEMBER_MAX_AGE,
                defaults.remember_max_age_secs,
            )?,
            embed_expiry: match get(ENV_EMBED_EXPIRY) {
                Some(raw) => parse_bool(&raw, ENV_EMBED_EXPIRY)?,
                None => defaults.embed_expiry,
            },
        })
    }

    /// Produces the signing secret.
    ///
    /// - Production: `AUTH_SECRET` must be set, must not be a known
    ///   default, and must be at least [`MIN_PRODUCTION_SECRET_LEN`] bytes.
    /// - Development: `AUTH_SECRET` if set, otherwise a random secret for
    ///   this process only.
    pub fn resolve_secret(&self) -> Result<SessionSecret, ConfigError> {
        match (&self.auth_secret, self.environment) {
            (Some(secret), Environment::Production) => {
                if KNOWN_DEFAULT_SECRETS.contains(&secret.as_str()) {
                    return Err(ConfigError::WeakSecret {
                        reason: "known default value",
                    });
                }
                if secret.len() < MIN_PRODUCTION_SECRET_LEN {
                    return Err(ConfigError::WeakSecret {
                        reason: "shorter than 32 bytes",
                    });
                }
                Ok(SessionSecret::new(secret)?)
            }
            (Some(secret), Environment::Development) => Ok(SessionSecret::new(secret)?),
            (None, Environment::Production) => Err(ConfigError::MissingSecret {
                environment: self.environment.to_string(),
            }),
            (None, Environment::Development) => {
                tracing::warn!(
                    "{ENV_AUTH_SECRET} not set; using a random secret, sessions will not survive a restart"
                );
                Ok(SessionSecret::generate())
            }
        }
    }

    /// Session cookie attributes for this deployment. `Secure` is set in
    /// production.
    pub fn cookie_config(&self) -> SessionCookieConfig {
        SessionCookieConfig {
            secure: self.environment.is_production(),
            max_age_secs: self.session_max_age_secs,
            remember_max_age_secs: self.remember_max_age_secs,
            ..SessionCookieConfig::default()
        }
    }
}

fn parse_or(raw: Option<String>, key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str, key: &'static str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}
