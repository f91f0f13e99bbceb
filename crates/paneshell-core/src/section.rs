#![forbid(unsafe_code)]

//! Section identifiers and alignment tags shared by configuration and layout.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the five named layout regions of the shell window.
///
/// The ordering is the order in which a scaling pass visits sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    Top,
    Bottom,
    Left,
    Right,
    MainContent,
}

impl SectionName {
    /// Every section, in scaling order.
    pub const ALL: [SectionName; 5] = [
        SectionName::Top,
        SectionName::Bottom,
        SectionName::Left,
        SectionName::Right,
        SectionName::MainContent,
    ];

    /// The four optional sections that surround the main content.
    pub const OPTIONAL: [SectionName; 4] = [
        SectionName::Top,
        SectionName::Bottom,
        SectionName::Left,
        SectionName::Right,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::MainContent => "main_content",
        }
    }

    /// Top and bottom bars are fitted by height.
    #[must_use]
    pub const fn is_bar(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// Left and right sidebars are fitted by width.
    #[must_use]
    pub const fn is_sidebar(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Label text used when a configuration names a section without text.
    #[must_use]
    pub const fn default_text(self) -> &'static str {
        match self {
            Self::Top => "Top Bar",
            Self::Bottom => "Status Bar",
            Self::Left => "Left Sidebar",
            Self::Right => "Right Sidebar",
            Self::MainContent => "Main Content",
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown section name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown section name: {0:?}")]
pub struct UnknownSection(pub String);

impl FromStr for SectionName {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "top" => Ok(Self::Top),
            "bottom" | "status" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "main_content" | "main" => Ok(Self::MainContent),
            other => Err(UnknownSection(other.to_string())),
        }
    }
}

/// Text alignment tag carried by a section.
///
/// The core never interprets it; hosts map it onto their toolkit's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Center,
    Left,
    Right,
    Top,
    Bottom,
    VCenter,
    HCenter,
    Justify,
}
