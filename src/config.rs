//! Runtime configuration
//!
//! Loaded from TOML, installed once per process. Readers go through `get()`,
//! which falls back to the defaults when the host never installed anything.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Environment variable naming a TOML config file
pub const CONFIG_ENV: &str = "WL_CONFIG";

static CONFIG: OnceCell<BridgeConfig> = OnceCell::new();

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub errors: ErrorConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub file: Option<String>,

    #[serde(default = "default_false")]
    pub json: bool,

    #[serde(default = "default_false")]
    pub spans: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorConfig {
    /// Warn when an unconsumed pending error gets replaced
    #[serde(default = "default_true")]
    pub warn_on_overwrite: bool,

    /// Exception name reported for native panics
    #[serde(default = "default_panic_exception")]
    pub panic_exception: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Call the native implementation when a flag is set but its slot is empty
    #[serde(default = "default_true")]
    pub fallback_on_empty_slot: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
            json: false,
            spans: false,
        }
    }
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self {
            warn_on_overwrite: true,
            panic_exception: default_panic_exception(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            fallback_on_empty_slot: true,
        }
    }
}

impl BridgeConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Config named by `WL_CONFIG`, defaults when unset
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path),
            Err(_) => Ok(Self::default()),
        }
    }
}

/// Install the process-wide configuration. Fails if one is already in place.
pub fn init(config: BridgeConfig) -> Result<(), ConfigError> {
    CONFIG.set(config).map_err(|_| ConfigError::AlreadyInstalled)
}

/// Active configuration
pub fn get() -> &'static BridgeConfig {
    CONFIG.get_or_init(BridgeConfig::default)
}

pub fn is_initialized() -> bool {
    CONFIG.get().is_some()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_panic_exception() -> String {
    "RuntimeError".to_string()
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.errors.warn_on_overwrite);
        assert_eq!(config.errors.panic_exception, "RuntimeError");
        assert!(config.dispatch.fallback_on_empty_slot);
    }

    #[test]
    fn test_partial_toml() {
        let config = BridgeConfig::from_toml_str(
            r#"
            [logging]
            level = "trace"
            json = true

            [dispatch]
            fallback_on_empty_slot = false
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.level, "trace");
        assert!(config.logging.json);
        assert!(!config.logging.spans);
        assert!(!config.dispatch.fallback_on_empty_slot);
        assert_eq!(config.errors, ErrorConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = BridgeConfig::from_toml_str("[errors]\nwarn_on_overwrite = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[errors]\npanic_exception = \"SystemError\"").unwrap();

        let config = BridgeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.errors.panic_exception, "SystemError");
    }

    #[test]
    fn test_missing_file() {
        let err = BridgeConfig::from_file("/nonexistent/wrapper_lib.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
