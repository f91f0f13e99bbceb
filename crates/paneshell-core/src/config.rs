#![forbid(unsafe_code)]

//! Shell configuration as plain data.
//!
//! [`ShellConfig`] groups every tunable of the shell (fonts, window geometry,
//! enabled sections, worker pool, status bar, resize debounce and logging)
//! into a single value that can be loaded from TOML or JSON and passed
//! explicitly into the layout and runtime components.
//!
//! ```toml
//! font_face = "Helvetica"
//! font_size = 13
//! window_size = { width = 800, height = 600 }
//!
//! [sections.left]
//! text = "Files"
//!
//! [pool]
//! max_workers = 4
//! ```
//!
//! Every field has a default, so a partial file only overrides what it names.
//! The main content section is always present after loading.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geometry::{Position, Size};
use crate::logging::LogConfig;
use crate::section::{Alignment, SectionName};

/// Errors that can occur when loading a shell configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("unsupported config file extension: {path}")]
    UnsupportedFormat { path: String },
}

/// Per-section configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    pub text: String,
    pub alignment: Alignment,
}

impl SectionConfig {
    #[must_use]
    pub fn new(text: impl Into<String>, alignment: Alignment) -> Self {
        Self {
            text: text.into(),
            alignment,
        }
    }

    /// Default label for a section.
    #[must_use]
    pub fn default_for(name: SectionName) -> Self {
        Self::new(name.default_text(), Alignment::Center)
    }
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self::new(String::new(), Alignment::Center)
    }
}

/// Worker pool parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of concurrently running tasks. Default: 16.
    pub max_workers: usize,
    /// Prefix for worker thread names. Default: "paneshell-worker".
    pub thread_name: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: 16,
            thread_name: "paneshell-worker".into(),
        }
    }
}

/// Status bar parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Text shown before the first update. Default: "Ready".
    pub initial_text: String,
    /// Tag under which status jobs are submitted. Default: "status".
    pub tag: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            initial_text: "Ready".into(),
            tag: "status".into(),
        }
    }
}

/// Largest accepted `font_size`, in pixels.
pub const MAX_FONT_SIZE: u32 = 1_000;

/// Top-level shell configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Font family used by every section. Default: "Helvetica".
    pub font_face: String,
    /// Default (and maximum) font size in pixels. Default: 12.
    pub font_size: u32,
    /// Splitter handle width in pixels at the baseline window size. Default: 5.
    pub splitter_handle_width: u32,
    /// Initial window size. Default: 640x480.
    pub window_size: Size,
    /// Initial window position. Default: (100, 100).
    pub window_position: Position,
    /// Render the bottom section as a status bar + label pair. Default: false.
    pub enable_status_bar_manager: bool,
    /// Enabled sections. `main_content` is always present after loading.
    pub sections: BTreeMap<SectionName, SectionConfig>,
    /// Quiet period before a resize triggers a scaling pass. Default: 50.
    pub resize_debounce_ms: u64,
    pub pool: PoolConfig,
    pub status: StatusConfig,
    pub logging: LogConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        let mut config = Self {
            font_face: "Helvetica".into(),
            font_size: 12,
            splitter_handle_width: 5,
            window_size: Size::new(640, 480),
            window_position: Position::new(100, 100),
            enable_status_bar_manager: false,
            sections: BTreeMap::new(),
            resize_debounce_ms: 50,
            pool: PoolConfig::default(),
            status: StatusConfig::default(),
            logging: LogConfig::default(),
        };
        config.ensure_main_content();
        config
    }
}

impl ShellConfig {
    /// Default configuration with the given optional sections enabled,
    /// each using its default label.
    #[must_use]
    pub fn with_sections(names: impl IntoIterator<Item = SectionName>) -> Self {
        let mut config = Self::default();
        for name in names {
            config
                .sections
                .insert(name, SectionConfig::default_for(name));
        }
        config
    }

    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.finish()
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.finish()
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load from a file, picking the format from its extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    /// Serialize to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    fn finish(mut self) -> Result<Self, ConfigError> {
        self.ensure_main_content();
        for (name, section) in &mut self.sections {
            if section.text.is_empty() {
                section.text = name.default_text().to_string();
            }
        }
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn ensure_main_content(&mut self) {
        self.sections
            .entry(SectionName::MainContent)
            .or_insert_with(|| SectionConfig::default_for(SectionName::MainContent));
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.font_face.trim().is_empty() {
            errors.push("font_face must not be empty".into());
        }
        if self.font_size == 0 {
            errors.push("font_size must be > 0".into());
        } else if self.font_size > MAX_FONT_SIZE {
            errors.push(format!(
                "font_size must be <= {MAX_FONT_SIZE}, got {}",
                self.font_size
            ));
        }
        if self.splitter_handle_width == 0 {
            errors.push("splitter_handle_width must be > 0".into());
        }
        if self.window_size.is_empty() {
            errors.push(format!(
                "window_size must be non-empty, got {}x{}",
                self.window_size.width, self.window_size.height
            ));
        }
        if !self.sections.contains_key(&SectionName::MainContent) {
            errors.push("sections.main_content is required".into());
        }
        if self.pool.max_workers == 0 {
            errors.push("pool.max_workers must be > 0".into());
        }
        if self.status.tag.is_empty() {
            errors.push("status.tag must not be empty".into());
        }

        errors
    }

    /// Whether the given section is enabled.
    #[must_use]
    pub fn has_section(&self, name: SectionName) -> bool {
        self.sections.contains_key(&name)
    }

    /// Alignment for a section, centered when not configured.
    #[must_use]
    pub fn section_alignment(&self, name: SectionName) -> Alignment {
        self.sections
            .get(&name)
            .map(|section| section.alignment)
            .unwrap_or_default()
    }

    /// Replace or insert a section's text and alignment.
    pub fn update_section(
        &mut self,
        name: SectionName,
        text: impl Into<String>,
        alignment: Alignment,
    ) {
        self.sections
            .insert(name, SectionConfig::new(text, alignment));
    }
}
