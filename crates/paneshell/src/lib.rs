#![forbid(unsafe_code)]

//! paneshell public facade crate.
//!
//! Re-exports the types a host needs from the internal crates, provides the
//! UI-thread [`ShellController`] and a small prelude.
//!
//! ```no_run
//! use paneshell::prelude::*;
//! use web_time::Instant;
//!
//! # fn main() -> paneshell::Result<()> {
//! let config = ShellConfig::from_file("shell.toml")?;
//! paneshell::init_logging(&config)?;
//!
//! let mut shell = ShellController::new(config, MonospaceMeasurer::default())?;
//! shell.update_status("Loading project");
//! shell.on_resize(Size::new(1280, 720), Instant::now());
//! let outcome = shell.tick(Instant::now());
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod error;

// --- Core re-exports -------------------------------------------------------

pub use paneshell_core::{
    Alignment, ConfigError, LogConfig, PoolConfig, Position, SectionConfig, SectionName,
    ShellConfig, Size, StatusConfig,
};

// --- Text re-exports -------------------------------------------------------

pub use paneshell_text::{
    CachedMeasurer, FitParams, FitResult, FitStop, FontFitter, MonospaceMeasurer, TextMeasurer,
};

// --- Layout re-exports -----------------------------------------------------

pub use paneshell_layout::{
    LabelState, LayoutScaler, LayoutSnapshot, Section, SectionHandle, SectionKind, ShellLayout,
    Splitter,
};

// --- Runtime re-exports ----------------------------------------------------

pub use paneshell_runtime::{
    CancelToken, ResizeDebouncer, StatusBar, StatusController, StatusEvent, Task, TaskHandle,
    TaskOutcome, TaskPool, TaskState,
};

// --- Facade ----------------------------------------------------------------

pub use controller::{ShellController, TickOutcome};
pub use error::{Error, Result};

/// Install the global tracing subscriber described by `config.logging`.
pub fn init_logging(config: &ShellConfig) -> Result<()> {
    paneshell_core::logging::init(&config.logging)?;
    Ok(())
}

/// Convenience prelude for paneshell hosts.
pub mod prelude {
    pub use crate::{
        Alignment, Error, MonospaceMeasurer, Result, SectionHandle, SectionName, ShellConfig,
        ShellController, Size, StatusBar, TextMeasurer, TickOutcome,
    };

    pub use crate::{core, layout, runtime, text};
}

pub use paneshell_core as core;
pub use paneshell_layout as layout;
pub use paneshell_runtime as runtime;
pub use paneshell_text as text;
