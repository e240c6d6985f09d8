//! Process configuration loaded from the environment.

use std::net::SocketAddr;

use anyhow::{Context, anyhow};

use bazaar_observability::LogFormat;

pub const DEV_SECRET: &str = "dev-secret";

/// Credentials for an admin account created at startup if missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub secret_key: String,
    pub token_ttl: chrono::Duration,
    pub bind_addr: SocketAddr,
    pub permission_cache_capacity: usize,
    pub log_level: String,
    pub log_format: LogFormat,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (the environment in prod,
    /// a map in tests). Unset keys fall back to dev defaults; malformed values
    /// are errors naming the key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ttl_minutes: i64 = parse_or(&get, "ACCESS_TOKEN_EXPIRE_MINUTES", 60)?;
        if ttl_minutes <= 0 {
            return Err(anyhow!("ACCESS_TOKEN_EXPIRE_MINUTES must be positive"));
        }

        let bootstrap_admin = match (get("BAZAAR_ADMIN_EMAIL"), get("BAZAAR_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                email,
                username: get("BAZAAR_ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
                password,
            }),
            (None, None) => None,
            _ => {
                return Err(anyhow!(
                    "BAZAAR_ADMIN_EMAIL and BAZAAR_ADMIN_PASSWORD must be set together"
                ));
            }
        };

        let log_format = match get("LOG_FORMAT") {
            Some(v) => v.parse().map_err(|e: String| anyhow!("LOG_FORMAT: {e}"))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            secret_key: get("SECRET_KEY").unwrap_or_else(|| DEV_SECRET.to_string()),
            token_ttl: chrono::Duration::minutes(ttl_minutes),
            bind_addr: parse_or(&get, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            permission_cache_capacity: parse_or(
                &get,
                "PERMISSION_CACHE_CAPACITY",
                bazaar_auth::cache::DEFAULT_CAPACITY,
            )?,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format,
            bootstrap_admin,
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: core::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: '{raw}'")),
        None => Ok(default),
    }
}
