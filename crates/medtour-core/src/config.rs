//! Engine configuration and logging setup.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::models::{Actor, Role};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub const DB_PATH_VAR: &str = "MEDTOUR_DB_PATH";
pub const AUTO_REPLY_DELAY_VAR: &str = "MEDTOUR_AUTO_REPLY_DELAY_MS";
pub const LOG_VAR: &str = "MEDTOUR_LOG";

const DEFAULT_DB_PATH: &str = "medtour.db";
const DEFAULT_LOG_FILTER: &str = "medtour_core=info";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub database_path: PathBuf,
    /// Pause before the automated reply to a client quick-reply. Taken by
    /// `MedtourCore` with the store unlocked.
    pub auto_reply_delay: Duration,
    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
    /// Identity automated replies are posted under
    pub system_persona: Actor,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            auto_reply_delay: Duration::ZERO,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            system_persona: Actor::new("system", "Care Coordinator", Role::Admin),
        }
    }
}

impl EngineConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        tracing::info!(
            database = %config.database_path.display(),
            auto_reply_ms = config.auto_reply_delay.as_millis() as u64,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Build from any key lookup. Missing keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(DB_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(AUTO_REPLY_DELAY_VAR) {
            let millis: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: AUTO_REPLY_DELAY_VAR,
                value: raw.clone(),
            })?;
            config.auto_reply_delay = Duration::from_millis(millis);
        }

        if let Some(filter) = lookup(LOG_VAR).filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }

        Ok(config)
    }
}

/// Install a fmt subscriber filtered by `filter`. Later calls are no-ops.
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
