#![forbid(unsafe_code)]

//! Headless model of a collapsible splitter.
//!
//! Each optional section sits in its own two-pane splitter next to the rest
//! of the window. Clicking the handle between the panes collapses the
//! section's pane to zero; clicking again restores an even split.

use paneshell_core::SectionName;
use serde::{Deserialize, Serialize};

/// Which way the panes are stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Panes stacked top to bottom (bar splitters).
    Vertical,
    /// Panes side by side (sidebar splitters).
    Horizontal,
}

impl Orientation {
    #[must_use]
    pub const fn for_section(name: SectionName) -> Self {
        if name.is_bar() {
            Self::Vertical
        } else {
            Self::Horizontal
        }
    }
}

/// Index of the handle that toggles collapse.
pub const TOGGLE_HANDLE_INDEX: usize = 1;

/// Relative pane sizes when both panes are visible.
pub const EXPANDED_SIZES: [u32; 2] = [1, 1];

/// Relative pane sizes when `name`'s pane is collapsed.
#[must_use]
pub const fn collapsed_sizes(name: SectionName) -> [u32; 2] {
    match name {
        SectionName::Top | SectionName::Left => [0, 1],
        SectionName::Bottom | SectionName::Right => [1, 0],
        SectionName::MainContent => EXPANDED_SIZES,
    }
}

/// A two-pane splitter hosting one optional section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Splitter {
    id: SectionName,
    orientation: Orientation,
    configured_handle_width: u32,
    handle_width: u32,
    collapsed: bool,
    sizes: [u32; 2],
}

impl Splitter {
    /// Handle widths below 1 are raised to 1.
    #[must_use]
    pub fn new(id: SectionName, handle_width: u32) -> Self {
        let handle_width = handle_width.max(1);
        Self {
            id,
            orientation: Orientation::for_section(id),
            configured_handle_width: handle_width,
            handle_width,
            collapsed: false,
            sizes: EXPANDED_SIZES,
        }
    }

    #[must_use]
    pub fn id(&self) -> SectionName {
        self.id
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub fn configured_handle_width(&self) -> u32 {
        self.configured_handle_width
    }

    #[must_use]
    pub fn handle_width(&self) -> u32 {
        self.handle_width
    }

    /// Set the drawn handle width, clamped to `[1, configured]`.
    pub fn set_handle_width(&mut self, width: u32) {
        self.handle_width = width.clamp(1, self.configured_handle_width);
    }

    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    #[must_use]
    pub fn sizes(&self) -> [u32; 2] {
        self.sizes
    }

    pub fn collapse(&mut self) {
        self.sizes = collapsed_sizes(self.id);
        self.collapsed = true;
        tracing::debug!(target: "paneshell.splitter", splitter = %self.id, "collapsed");
    }

    pub fn expand(&mut self) {
        self.sizes = EXPANDED_SIZES;
        self.collapsed = false;
        tracing::debug!(target: "paneshell.splitter", splitter = %self.id, "expanded");
    }

    /// Handle a primary-button press on the handle at `handle_index`.
    ///
    /// Returns whether the press toggled the splitter.
    pub fn press_handle(&mut self, handle_index: usize) -> bool {
        if handle_index != TOGGLE_HANDLE_INDEX {
            return false;
        }
        if self.collapsed {
            self.expand();
        } else {
            self.collapse();
        }
        true
    }
}
