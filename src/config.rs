use crate::adaptive::config::EngineConfig;
use crate::db::config::{DbConfig, DbConfigError};

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub database: DbConfig,
    pub engine: EngineConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, DbConfigError> {
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            log_level,
            database: DbConfig::from_env()?,
            engine: EngineConfig::from_env(),
        })
    }
}
