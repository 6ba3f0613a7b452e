//! Configuration for the `sha512crypt` tool. The file is JSON and every field
//! is optional, so an absent config simply means defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::salt::{DEFAULT_SALT_LEN, SALT_MAX_LEN, SALT_MIN_LEN};

/// Environment variable naming the config file used by the CLI.
pub const CONFIG_ENV: &str = "SHA512CRYPT_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(String),
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_salt_length() -> usize {
    DEFAULT_SALT_LEN
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CryptConfig {
    /// Length of generated salts, 1 to 16 characters.
    #[serde(rename = "saltLength", default = "default_salt_length")]
    pub salt_length: usize,
}

impl Default for CryptConfig {
    fn default() -> Self {
        Self {
            salt_length: default_salt_length(),
        }
    }
}

impl CryptConfig {
    /// Checks that `saltLength` is a length the salt generator accepts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(SALT_MIN_LEN..=SALT_MAX_LEN).contains(&self.salt_length) {
            return Err(ConfigError::Invalid(format!(
                "saltLength must be between {SALT_MIN_LEN} and {SALT_MAX_LEN}, got {}",
                self.salt_length
            )));
        }
        Ok(())
    }
}

/// Reads and validates a JSON config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<CryptConfig, ConfigError> {
    let raw_json = fs::read_to_string(&path).map_err(|e| ConfigError::Io(format!("{e}")))?;
    let config: CryptConfig =
        serde_json::from_str(&raw_json).map_err(|e| ConfigError::Parse(format!("{e}")))?;
    config.validate()?;
    log::debug!("loaded config from {}", path.as_ref().display());
    Ok(config)
}

/// Loads the file named by [`CONFIG_ENV`], falling back to defaults when the
/// variable is unset.
pub fn load_config_from_env() -> Result<CryptConfig, ConfigError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => load_config(path),
        None => Ok(CryptConfig::default()),
    }
}
