//! Runtime settings read from the environment.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::Level;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_STATIC_ROOT: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// holds `articles.json` and the `uploads/` directory
    pub data_dir: PathBuf,
    pub static_root: PathBuf,
    pub log_level: Level,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {value:?}")]
    InvalidPort { value: String },

    #[error("LOG_LEVEL must be one of trace, debug, info, warn, error, got {value:?}")]
    InvalidLogLevel { value: String },
}

impl Config {
    /// Reads `HOST`, `PORT`, `ARTICLES_DATA_DIR`, `STATIC_ROOT` and `LOG_LEVEL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());

        let port = match var("PORT") {
            Some(value) => u16::from_str(&value).ok().ok_or(ConfigError::InvalidPort { value })?,
            None => DEFAULT_PORT,
        };
        let log_level = match var("LOG_LEVEL") {
            Some(value) => Level::from_str(&value).ok().ok_or(ConfigError::InvalidLogLevel { value })?,
            None => Level::INFO,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            data_dir: var("ARTICLES_DATA_DIR").map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from),
            static_root: var("STATIC_ROOT").map_or_else(|| PathBuf::from(DEFAULT_STATIC_ROOT), PathBuf::from),
            log_level,
        })
    }

    /// `host:port`, with IPv6 literals bracketed.
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            static_root: PathBuf::from(DEFAULT_STATIC_ROOT),
            log_level: Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.address(), "127.0.0.1:8080");
    }

    #[test]
    fn reads_variables() {
        let config = Config::from_lookup(lookup(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("ARTICLES_DATA_DIR", "/var/lib/inkwell"),
            ("STATIC_ROOT", "public"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.address(), "0.0.0.0:9000");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/inkwell"));
        assert_eq!(config.static_root, PathBuf::from("public"));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn empty_values_fall_back() {
        let config = Config::from_lookup(lookup(&[("PORT", ""), ("HOST", "  ")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.host, DEFAULT_HOST);
    }

    #[test]
    fn invalid_values() {
        assert_eq!(
            Config::from_lookup(lookup(&[("PORT", "http")])),
            Err(ConfigError::InvalidPort { value: "http".into() })
        );
        assert_eq!(
            Config::from_lookup(lookup(&[("LOG_LEVEL", "loud")])),
            Err(ConfigError::InvalidLogLevel { value: "loud".into() })
        );
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        let config = Config { host: "::1".into(), ..Config::default() };
        assert_eq!(config.address(), "[::1]:8080");
    }
}
