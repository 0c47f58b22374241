//! Logging infrastructure - structured tracing across the bridge
//!
//! Design: Uses `tracing` for structured, contextual logging with:
//! - Configurable log level (env or `[logging]` config section)
//! - Zero-cost when disabled
//! - Optional span events around boundary calls
//! - Console or non-blocking file output, human-readable or JSON

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use std::io;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

// Re-export tracing macros for use throughout the crate
pub use tracing::{debug, error, info, trace, warn};

static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Keeps the file writer thread alive for the life of the process
static FILE_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    /// Log file path; console (stderr) when unset
    pub log_path: Option<String>,
    pub json_format: bool,
    /// Show span enter/close events
    pub show_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            log_path: None,
            json_format: false,
            show_spans: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // WL_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level) = std::env::var("WL_LOG_LEVEL") {
            config.level = parse_level(&level);
        }

        // WL_LOG_FILE: path to log file
        if let Ok(path) = std::env::var("WL_LOG_FILE") {
            config.log_path = Some(path);
        }

        config.json_format = std::env::var("WL_LOG_JSON").is_ok();
        config.show_spans = std::env::var("WL_LOG_SPANS").is_ok();

        config
    }

    /// Translate the `[logging]` section of a `BridgeConfig`
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self {
            level: parse_level(&settings.level),
            log_path: settings.file.clone(),
            json_format: settings.json,
            show_spans: settings.spans,
        }
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize logging from the environment
pub fn init() {
    init_with_config(LogConfig::from_env());
}

/// Initialize logging with custom configuration. Only the first call counts.
pub fn init_with_config(config: LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "wrapper_lib={}",
                config.level.as_str().to_lowercase()
            ))
        });

        let span_events = if config.show_spans {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let writer = match config.log_path.as_deref() {
            Some(path) => file_writer(path),
            None => BoxMakeWriter::new(io::stderr),
        };

        let layer = fmt::layer()
            .with_writer(writer)
            .with_span_events(span_events)
            .with_target(true)
            .with_thread_ids(cfg!(debug_assertions))
            .with_line_number(cfg!(debug_assertions));

        // Ignore error if the host already installed a global subscriber
        if config.json_format {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer.json())
                .try_init()
                .ok();
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .try_init()
                .ok();
        }
    });
}

fn file_writer(path: &str) -> BoxMakeWriter {
    let path = Path::new(path);
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_owned())
        .unwrap_or_else(|| "wrapper_lib.log".into());

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    *FILE_GUARD.lock() = Some(guard);
    BoxMakeWriter::new(writer)
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

/// Flush and stop the file writer, if any
pub fn shutdown() {
    FILE_GUARD.lock().take();
}

// ============================================================================
// Bridge-specific logging functions
// ============================================================================

/// Log entry into a boundary function
#[inline]
pub fn log_boundary_call(entry: &str) {
    trace!(target: "wrapper_lib::boundary", entry, "boundary call");
}

/// Log a boundary call that returned its failure value
#[inline]
pub fn log_boundary_failure(entry: &str, name: &str, message: &str) {
    debug!(
        target: "wrapper_lib::boundary",
        entry,
        exception = name,
        message,
        "boundary call failed"
    );
}

/// Log a refcount adjustment sent to the host
#[inline]
pub fn log_refcount(handle: *const core::ffi::c_void, delta: i32) {
    trace!(target: "wrapper_lib::handle", handle = ?handle, delta, "adjust refcount");
}

/// Log which side a virtual call went to
#[inline]
pub fn log_dispatch(class: &str, index: usize, overridden: bool) {
    trace!(
        target: "wrapper_lib::dispatch",
        class,
        index,
        overridden,
        "virtual dispatch"
    );
}

/// Log a failed value conversion
#[inline]
pub fn log_conversion_failure(from: &str, to: &str, reason: &str) {
    debug!(
        target: "wrapper_lib::convert",
        from,
        to,
        reason,
        "conversion failed"
    );
}
