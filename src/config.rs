//! Runtime configuration
//! Everything comes from environment variables, with defaults that work from a checkout

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub const DATA_FILE_VAR: &str = "CLUB_REGISTRY_DATA_FILE";
pub const ADDR_VAR: &str = "CLUB_REGISTRY_ADDR";
pub const STATIC_DIR_VAR: &str = "CLUB_REGISTRY_STATIC_DIR";
pub const INTAKE_PATH_VAR: &str = "CLUB_REGISTRY_INTAKE_PATH";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid listen address in {var}: {value}")]
    InvalidAddr { var: &'static str, value: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON file holding every registration
    pub data_file: PathBuf,
    pub listen_addr: SocketAddr,
    /// Directory served as-is for the intake page and its assets
    pub static_dir: PathBuf,
    /// Where non-POST hits on the submission endpoint get redirected
    pub intake_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_file: PathBuf::from("data/registrations.json"),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            static_dir: PathBuf::from("web"),
            intake_path: "/index.html".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_lookup(|key| env::var(key).ok())?;

        info!(
            "Configuration loaded: data_file={:?}, listen_addr={}, static_dir={:?}",
            config.data_file, config.listen_addr, config.static_dir
        );

        Ok(config)
    }

    /// Build from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let data_file = lookup(DATA_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or(defaults.data_file);

        let listen_addr = match lookup(ADDR_VAR) {
            Some(value) => value.parse::<SocketAddr>().map_err(|_| ConfigError::InvalidAddr {
                var: ADDR_VAR,
                value,
            })?,
            None => defaults.listen_addr,
        };

        let static_dir = lookup(STATIC_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let intake_path = lookup(INTAKE_PATH_VAR).unwrap_or(defaults.intake_path);
        if !intake_path.starts_with('/') {
            return Err(ConfigError::InvalidConfig(format!(
                "{} must start with '/', got {:?}",
                INTAKE_PATH_VAR, intake_path
            )));
        }

        Ok(Config {
            data_file,
            listen_addr,
            static_dir,
            intake_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (DATA_FILE_VAR, "/var/lib/clubs/registrations.json"),
            (ADDR_VAR, "127.0.0.1:8080"),
            (STATIC_DIR_VAR, "public"),
            (INTAKE_PATH_VAR, "/"),
        ]))
        .unwrap();

        assert_eq!(config.data_file, PathBuf::from("/var/lib/clubs/registrations.json"));
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.intake_path, "/");
    }

    #[test]
    fn test_bad_addr() {
        let err = Config::from_lookup(lookup_from(&[(ADDR_VAR, "localhost")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidAddr {
                var: ADDR_VAR,
                value: "localhost".to_string()
            }
        );
    }

    #[test]
    fn test_relative_intake_path_rejected() {
        let result = Config::from_lookup(lookup_from(&[(INTAKE_PATH_VAR, "index.html")]));
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }
}
