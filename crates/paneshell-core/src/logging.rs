#![forbid(unsafe_code)]

//! Structured logging setup.
//!
//! Components log through `tracing` with `paneshell.*` targets. Hosts call
//! [`init`] once at startup to install a subscriber; libraries never install
//! one themselves. `RUST_LOG` overrides the configured level when set.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Logging parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, e.g. `"info"` or `"paneshell=debug"`. Default: "info".
    pub level: String,
    /// Emit JSON lines on the console (needs the `tracing-json` feature).
    pub json: bool,
    /// Colorize console output. Default: true.
    pub ansi: bool,
    /// Also append plain-text logs to this file.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            ansi: true,
            file: None,
        }
    }
}

/// Errors raised while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("cannot open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("global subscriber already installed: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global `tracing` subscriber described by `config`.
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let mut layers: Vec<BoxedLayer> = vec![console_layer(config)];
    if let Some(path) = &config.file {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        layers.push(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file))
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    tracing::info!(
        target: "paneshell.logging",
        level = %config.level,
        file = ?config.file,
        "logging initialized"
    );
    Ok(())
}

#[cfg(feature = "tracing-json")]
fn console_layer(config: &LogConfig) -> BoxedLayer {
    if config.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer()
            .with_ansi(config.ansi)
            .with_target(true)
            .boxed()
    }
}

#[cfg(not(feature = "tracing-json"))]
fn console_layer(config: &LogConfig) -> BoxedLayer {
    fmt::layer()
        .with_ansi(config.ansi)
        .with_target(true)
        .boxed()
}
