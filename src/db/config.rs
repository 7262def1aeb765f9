use std::time::Duration;

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/pdp.db";

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub busy_timeout: Duration,
    pub journal_mode: SqliteJournalMode,
    pub foreign_keys: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            busy_timeout: Duration::from_millis(5000),
            journal_mode: SqliteJournalMode::Wal,
            foreign_keys: true,
        }
    }
}

impl DbConfig {
    pub fn from_env() -> Result<Self, DbConfigError> {
        let url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        if !url.starts_with("sqlite:") {
            return Err(DbConfigError::Invalid {
                key: "DATABASE_URL",
                value: url,
            });
        }

        let journal_mode = match std::env::var("SQLITE_JOURNAL_MODE") {
            Ok(raw) => SqliteJournalMode::parse(&raw).ok_or(DbConfigError::Invalid {
                key: "SQLITE_JOURNAL_MODE",
                value: raw,
            })?,
            Err(_) => SqliteJournalMode::Wal,
        };

        Ok(Self {
            url,
            max_connections: env_u32("DB_MAX_CONNECTIONS", 5).max(1),
            busy_timeout: Duration::from_millis(env_u64("SQLITE_BUSY_TIMEOUT_MS", 5000)),
            journal_mode,
            foreign_keys: env_bool("SQLITE_FOREIGN_KEYS", true),
        })
    }

    /// Private in-memory database on a single connection.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            journal_mode: SqliteJournalMode::Memory,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqliteJournalMode {
    Wal,
    Delete,
    Truncate,
    Memory,
}

impl SqliteJournalMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "wal" => Some(Self::Wal),
            "delete" => Some(Self::Delete),
            "truncate" => Some(Self::Truncate),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }

    pub fn to_sqlx(self) -> sqlx::sqlite::SqliteJournalMode {
        match self {
            Self::Wal => sqlx::sqlite::SqliteJournalMode::Wal,
            Self::Delete => sqlx::sqlite::SqliteJournalMode::Delete,
            Self::Truncate => sqlx::sqlite::SqliteJournalMode::Truncate,
            Self::Memory => sqlx::sqlite::SqliteJournalMode::Memory,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
