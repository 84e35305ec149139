use crate::auth::{MAX_COST, MIN_COST};
use std::env;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Reasons the process environment cannot be turned into a [`Config`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub database_max_connections: u32,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, which keeps the
    /// parsing rules testable without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let server_port = parse_or(&lookup, "SERVER_PORT", DEFAULT_PORT)?;
        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let database_max_connections =
            parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if database_max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                value: database_max_connections.to_string(),
                reason: "must be greater than zero".into(),
            });
        }

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(MIN_COST..=MAX_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
                reason: format!("must be between {} and {}", MIN_COST, MAX_COST),
            });
        }

        Ok(Self {
            database_url,
            server_port,
            server_host,
            database_max_connections,
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://test")]))
            .unwrap();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("DATABASE_MAX_CONNECTIONS", "20"),
            ("BCRYPT_COST", "4"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.database_max_connections, 20);
        assert_eq!(config.bcrypt_cost, 4);
    }

    #[test]
    fn test_config_requires_database_url() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert_eq!(result.err(), Some(ConfigError::Missing("DATABASE_URL")));

        let result = Config::from_lookup(lookup_from(&[("DATABASE_URL", "  ")]));
        assert_eq!(result.err(), Some(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_config_rejects_bad_numbers() {
        let port = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("SERVER_PORT", "eighty"),
        ]));
        assert!(matches!(
            port,
            Err(ConfigError::Invalid { key: "SERVER_PORT", .. })
        ));

        let cost = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("BCRYPT_COST", "40"),
        ]));
        assert!(matches!(
            cost,
            Err(ConfigError::Invalid { key: "BCRYPT_COST", .. })
        ));

        let pool = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]));
        assert!(matches!(
            pool,
            Err(ConfigError::Invalid { key: "DATABASE_MAX_CONNECTIONS", .. })
        ));
    }
}
