//! Logging setup.
//!
//! Structured logging through `tracing`, written to stderr so command output
//! on stdout stays clean. `RUST_LOG` overrides the configured level.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration options
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to output
    pub level: Level,
    /// Show timestamps
    pub show_timestamps: bool,
    /// Show target/module name
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            show_timestamps: false,
            show_target: false,
        }
    }
}

impl LoggingConfig {
    /// Create config from CLI arguments
    pub fn from_args(quiet: bool, verbose: bool) -> Self {
        let level = if verbose {
            Level::DEBUG
        } else if quiet {
            Level::ERROR
        } else {
            Level::WARN
        };

        Self {
            level,
            show_timestamps: verbose,
            show_target: verbose,
        }
    }
}

/// Initialize the logging system. Safe to call more than once; later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("workhand={}", config.level)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.show_target);

    let registry = Registry::default().with(env_filter);
    let result = if config.show_timestamps {
        registry.with(layer).try_init()
    } else {
        registry.with(layer.without_time()).try_init()
    };
    if let Err(e) = result {
        tracing::debug!("Logging already initialised: {e}");
    }
}
