//! Error taxonomy for everything that can fail inside a boundary call.
//!
//! None of these ever unwind into the host: the boundary guard turns them
//! into a pending error (see `exception`) whose name the host maps onto its
//! own exception types.

use thiserror::Error;

/// Errors raised on the native side of the bridge
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// A C representation could not be turned into a native value
    #[error("cannot convert {from} to {to}: {reason}")]
    Conversion {
        from: &'static str,
        to: &'static str,
        reason: String,
    },

    /// A host override raised while native code was calling it
    #[error("{name}: {message}")]
    Host { name: String, message: String },

    #[error("allocation of {size} bytes failed")]
    Allocation { size: usize },

    /// Native code panicked inside an entry point
    #[error("native code panicked: {0}")]
    Panic(String),

    #[error("null instance pointer passed to {0}")]
    NullInstance(&'static str),

    /// Abstract classes and classes with protected constructors
    #[error("{0} cannot be instantiated")]
    Abstract(&'static str),

    #[error("slot {index} out of range for {class} ({len} slots)")]
    SlotOutOfRange {
        class: &'static str,
        index: usize,
        len: usize,
    },

    #[error("no object registered at {address:#x}")]
    NotRegistered { address: usize },
}

impl BridgeError {
    pub fn conversion(from: &'static str, to: &'static str, reason: impl Into<String>) -> Self {
        Self::Conversion {
            from,
            to,
            reason: reason.into(),
        }
    }

    /// Name the host uses to pick its exception type
    pub fn exception_name(&self) -> &str {
        match self {
            Self::Conversion { .. } | Self::Abstract(_) => "TypeError",
            Self::Host { name, .. } => name,
            Self::Allocation { .. } => "MemoryError",
            Self::Panic(_) => crate::config::get().errors.panic_exception.as_str(),
            Self::NullInstance(_) => "ValueError",
            Self::SlotOutOfRange { .. } => "IndexError",
            Self::NotRegistered { .. } => "KeyError",
        }
    }

    /// Message stored next to the name in the error channel
    pub fn message(&self) -> String {
        match self {
            Self::Host { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors while loading a `BridgeConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("configuration already installed")]
    AlreadyInstalled,
}

impl From<ConfigError> for BridgeError {
    fn from(err: ConfigError) -> Self {
        BridgeError::Host {
            name: "RuntimeError".to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_names() {
        assert_eq!(BridgeError::conversion("char*", "String", "null").exception_name(), "TypeError");
        assert_eq!(BridgeError::Allocation { size: 8 }.exception_name(), "MemoryError");
        assert_eq!(BridgeError::NullInstance("f").exception_name(), "ValueError");
        assert_eq!(BridgeError::NotRegistered { address: 16 }.exception_name(), "KeyError");
        assert_eq!(BridgeError::Panic("boom".into()).exception_name(), "RuntimeError");
    }

    #[test]
    fn test_host_error_keeps_message() {
        let err = BridgeError::Host {
            name: "ZeroDivisionError".into(),
            message: "division by zero".into(),
        };
        assert_eq!(err.exception_name(), "ZeroDivisionError");
        assert_eq!(err.message(), "division by zero");
        assert_eq!(err.to_string(), "ZeroDivisionError: division by zero");
    }

    #[test]
    fn test_config_error_reported_as_runtime_error() {
        let err: BridgeError = ConfigError::AlreadyInstalled.into();
        assert_eq!(err.exception_name(), "RuntimeError");
        assert_eq!(err.message(), "configuration already installed");
    }

    #[test]
    fn test_conversion_message() {
        let err = BridgeError::conversion("char*", "String", "null pointer");
        assert_eq!(err.message(), "cannot convert char* to String: null pointer");
    }
}
