#![forbid(unsafe_code)]

//! Core: geometry, section identifiers, configuration and logging setup.
//!
//! # Role in paneshell
//! `paneshell-core` is the shared vocabulary. The text, layout and runtime
//! crates all speak in its [`Size`], [`SectionName`] and [`ShellConfig`]
//! types, and hosts use [`logging::init`] to install a subscriber.
//!
//! # Primary responsibilities
//! - **Geometry**: pixel sizes and window positions.
//! - **Sections**: the five named layout regions and their alignment tags.
//! - **Configuration**: [`ShellConfig`] loaded from TOML or JSON.
//! - **Logging**: `tracing-subscriber` setup with env-filter and file output.

pub mod config;
pub mod geometry;
pub mod logging;
pub mod section;

pub use config::{
    ConfigError, MAX_FONT_SIZE, PoolConfig, SectionConfig, ShellConfig, StatusConfig,
};
pub use geometry::{Position, Size};
pub use logging::LogConfig;
pub use section::{Alignment, SectionName, UnknownSection};
