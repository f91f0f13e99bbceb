#![forbid(unsafe_code)]

//! paneshell error model.
//!
//! Only setup can fail: loading configuration, installing the log
//! subscriber and spawning pool workers. Everything that happens while the
//! shell runs (missing sections, task panics, rejected submissions) is
//! logged and recovered where it happens.

use std::fmt;

use paneshell_core::ConfigError;
use paneshell_core::logging::LoggingError;

/// Top-level error type for paneshell hosts.
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
    /// The tracing subscriber could not be installed.
    Logging(LoggingError),
    /// A worker thread could not be spawned.
    Io(std::io::Error),
}

/// Standard result type for paneshell APIs.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Error type label for tracing.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Logging(_) => "logging",
            Self::Io(_) => "io",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "config: {err}"),
            Self::Logging(err) => write!(f, "logging: {err}"),
            Self::Io(err) => write!(f, "I/O: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<LoggingError> for Error {
    fn from(err: LoggingError) -> Self {
        Self::Logging(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn validation_error_converts_and_displays() {
        let err: Error = ConfigError::Validation(vec!["font_size must be > 0".into()]).into();
        assert_eq!(err.error_type(), "config");
        assert!(err.to_string().starts_with("config: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn io_error_converts() {
        let err: Error = std::io::Error::other("spawn failed").into();
        assert_eq!(err.error_type(), "io");
        assert!(err.to_string().contains("spawn failed"));
    }
}
