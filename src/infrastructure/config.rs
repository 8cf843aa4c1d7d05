use crate::infrastructure::logging::LoggingConfig;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    InMemory,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in_memory" | "in-memory" => Ok(StorageBackend::InMemory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("DATABASE_URL is required when STORAGE_BACKEND is postgres")]
    MissingDatabaseUrl,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub database_pool_size: u32,
    pub allowed_origins: Vec<String>,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            storage: StorageBackend::Postgres,
            database_url: None,
            database_pool_size: 10,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_or(&lookup, "PORT", defaults.port)?;
        let storage = parse_or(&lookup, "STORAGE_BACKEND", defaults.storage)?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let database_pool_size =
            parse_or(&lookup, "DATABASE_POOL_SIZE", defaults.database_pool_size)?;
        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|raw| split_origins(&raw))
            .unwrap_or(defaults.allowed_origins);

        let log_level = parse_or(&lookup, "LOG_LEVEL", defaults.logging.log_level)?;
        let log_dir = lookup("LOG_DIR").filter(|dir| !dir.trim().is_empty());

        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        Ok(Self {
            host,
            port,
            storage,
            database_url,
            database_pool_size,
            allowed_origins,
            logging: LoggingConfig {
                log_level,
                enable_file: log_dir.is_some(),
                log_dir: log_dir.unwrap_or(defaults.logging.log_dir),
                ..defaults.logging
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tracing::Level;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let config = AppConfig::from_lookup(lookup_from(&[("STORAGE_BACKEND", "memory")])).unwrap();
        assert_eq!(config.storage, StorageBackend::InMemory);
        assert_eq!(config.port, 8080);
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000"]);
        assert!(!config.logging.enable_file);
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingDatabaseUrl);
    }

    #[test]
    fn reads_all_values() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("DATABASE_URL", "postgres://localhost/ledger"),
            ("DATABASE_POOL_SIZE", "4"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example,,"),
            ("LOG_LEVEL", "debug"),
            ("LOG_DIR", "/tmp/ledger-logs"),
        ]))
        .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/ledger"));
        assert_eq!(config.database_pool_size, 4);
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.logging.log_level, Level::DEBUG);
        assert!(config.logging.enable_file);
        assert_eq!(config.logging.log_dir, "/tmp/ledger-logs");
    }

    #[test]
    fn bad_numbers_are_reported_with_their_key() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "PORT",
                value: "eighty".to_string()
            }
        );
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("STORAGE_BACKEND", "redis")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "STORAGE_BACKEND", .. }));
    }
}
