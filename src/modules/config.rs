use std::env;

use dotenvy::dotenv;
use log::LevelFilter;

use crate::errors::{CustomResult, Error};

const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_LOG_FILE: &str = "program.log";

/// which of the two configured databases the api reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Default,
    External,
}

impl DataSource {
    /// the environment variable holding the connection string
    pub fn url_var(&self) -> &'static str {
        match self {
            DataSource::Default => "DATABASE_URL",
            DataSource::External => "EXTERNAL_DATABASE_URL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub data_source: DataSource,
    pub url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: LevelFilter,
    pub file: String,
}

impl DatabaseConfig {
    /// read the database settings from the environment and `.env`
    pub fn from_env() -> CustomResult<DatabaseConfig> {
        dotenv().ok();
        DatabaseConfig::from_lookup(|key| env::var(key).ok())
    }

    /// # read the database settings
    ///
    /// ## Arguments
    /// * `lookup` - resolves a variable name to its value
    ///
    /// ## Returns
    /// * `DatabaseConfig` - the settings, or an error when the selected
    ///   connection string is missing or a value does not parse
    pub fn from_lookup<F>(lookup: F) -> CustomResult<DatabaseConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_source = match lookup("DATA_SOURCE").as_deref().map(str::trim) {
            None | Some("") | Some("default") => DataSource::Default,
            Some("external") => DataSource::External,
            Some(other) => {
                return Err(Error::InvalidConfigError {
                    var: "DATA_SOURCE".to_string(),
                    value: other.to_string(),
                })
            }
        };

        let url = match lookup(data_source.url_var()) {
            Some(url) if !url.trim().is_empty() => url,
            _ => {
                return Err(Error::MissingConfigError {
                    var: data_source.url_var().to_string(),
                })
            }
        };

        let pool_size = match lookup("DATABASE_POOL_SIZE") {
            None => DEFAULT_POOL_SIZE,
            Some(value) => match value.trim().parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(Error::InvalidConfigError {
                        var: "DATABASE_POOL_SIZE".to_string(),
                        value,
                    })
                }
            },
        };

        Ok(DatabaseConfig {
            data_source,
            url,
            pool_size,
        })
    }
}

impl LoggingConfig {
    pub fn from_env() -> LoggingConfig {
        dotenv().ok();
        LoggingConfig::from_lookup(|key| env::var(key).ok())
    }

    /// unknown levels fall back to info, logging config never fails
    pub fn from_lookup<F>(lookup: F) -> LoggingConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = match lookup("LOGGING_LEVEL").unwrap_or_default().as_str() {
            "OFF" => LevelFilter::Off,
            "ERROR" => LevelFilter::Error,
            "WARN" => LevelFilter::Warn,
            "DEBUG" => LevelFilter::Debug,
            "TRACE" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        };

        LoggingConfig {
            level,
            file: lookup("LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn test_default_source_uses_database_url() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "postgres://localhost/boatrace",
        )]))
        .unwrap();

        assert_eq!(config.data_source, DataSource::Default);
        assert_eq!(config.url, "postgres://localhost/boatrace");
        assert_eq!(config.pool_size, 10);
    }

    #[test]
    fn test_external_source_uses_external_url() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            ("DATA_SOURCE", "external"),
            ("DATABASE_URL", "postgres://localhost/default"),
            ("EXTERNAL_DATABASE_URL", "postgres://render/boatrace"),
            ("DATABASE_POOL_SIZE", "4"),
        ]))
        .unwrap();

        assert_eq!(config.data_source, DataSource::External);
        assert_eq!(config.url, "postgres://render/boatrace");
        assert_eq!(config.pool_size, 4);
    }

    #[test]
    fn test_missing_url_is_a_config_error() {
        let error = DatabaseConfig::from_lookup(lookup_from(&[("DATA_SOURCE", "external")]))
            .unwrap_err();

        match error {
            Error::MissingConfigError { var } => assert_eq!(var, "EXTERNAL_DATABASE_URL"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(DatabaseConfig::from_lookup(lookup_from(&[
            ("DATA_SOURCE", "mysql"),
            ("DATABASE_URL", "postgres://localhost/boatrace"),
        ]))
        .is_err());

        assert!(DatabaseConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/boatrace"),
            ("DATABASE_POOL_SIZE", "0"),
        ]))
        .is_err());
    }

    #[test]
    fn test_logging_defaults() {
        let config = LoggingConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.level, LevelFilter::Info);
        assert_eq!(config.file, "program.log");

        let config = LoggingConfig::from_lookup(lookup_from(&[("LOGGING_LEVEL", "DEBUG")]));
        assert_eq!(config.level, LevelFilter::Debug);
    }
}
