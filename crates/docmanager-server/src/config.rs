//! Server configuration loaded from `DOCMANAGER_*` environment variables.

use docmanager_auth::config::ResetConfig;
use docmanager_db::DbConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub reset: ResetConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        };
        set(&mut config.db.url, "DOCMANAGER_DB_URL");
        set(&mut config.db.namespace, "DOCMANAGER_DB_NAMESPACE");
        set(&mut config.db.database, "DOCMANAGER_DB_DATABASE");
        set(&mut config.db.username, "DOCMANAGER_DB_USER");
        set(&mut config.db.password, "DOCMANAGER_DB_PASSWORD");
        set(&mut config.reset.base_url, "DOCMANAGER_BASE_URL");
        set(&mut config.reset.mail_from, "DOCMANAGER_MAIL_FROM");

        if let Some(raw) = lookup("DOCMANAGER_RESET_RETENTION_DAYS") {
            config.reset.retention_days = match raw.parse::<i64>() {
                Ok(days) if days > 0 => days,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "DOCMANAGER_RESET_RETENTION_DAYS",
                        value: raw,
                    });
                }
            };
        }

        Ok(config)
    }
}
