#![forbid(unsafe_code)]

//! The shell's section map and splitters.
//!
//! [`ShellLayout`] is built from a [`ShellConfig`] and owned by the UI
//! thread. Sections are plain values in a `BTreeMap` keyed by
//! [`SectionName`], so iteration always follows scaling order.
//!
//! # Default geometry
//!
//! New sections get a headless starting box until the host reports real
//! sizes:
//!
//! | section   | width                              | height                        |
//! |-----------|------------------------------------|-------------------------------|
//! | bars      | window width                       | `2 * font_size`               |
//! | sidebars  | window width / 5                   | window height                 |
//! | main      | window width minus sidebars        | window height minus bars      |

use std::collections::BTreeMap;

use paneshell_core::{SectionName, ShellConfig, Size};
use serde::Serialize;

use crate::section::{LabelState, Section, SectionHandle, SectionKind};
use crate::splitter::Splitter;

const SIDEBAR_FRACTION: u32 = 5;

/// Serializable view of the current geometry, for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutSnapshot {
    pub window: Size,
    pub baseline_width: u32,
    pub sections: BTreeMap<SectionName, SectionSnapshot>,
    pub splitters: Vec<Splitter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSnapshot {
    pub kind: SectionKind,
    pub size: Size,
    pub container: Size,
    pub font_size: u32,
    pub text: Option<String>,
    pub replaced: bool,
}

/// Sections, splitters and the baseline captured at the last layout build.
#[derive(Debug)]
pub struct ShellLayout {
    font_face: String,
    default_font_size: u32,
    handle_width: u32,
    window: Size,
    baseline_width: u32,
    sections: BTreeMap<SectionName, Section>,
    splitters: BTreeMap<SectionName, Splitter>,
    initial_widths: BTreeMap<SectionName, u32>,
    generation: u64,
}

impl ShellLayout {
    /// Build a layout for `config` at its configured window size.
    #[must_use]
    pub fn from_config(config: &ShellConfig) -> Self {
        let mut layout = Self {
            font_face: config.font_face.clone(),
            default_font_size: config.font_size,
            handle_width: config.splitter_handle_width,
            window: config.window_size,
            baseline_width: config.window_size.width,
            sections: BTreeMap::new(),
            splitters: BTreeMap::new(),
            initial_widths: BTreeMap::new(),
            generation: 0,
        };
        layout.rebuild(config);
        layout
    }

    /// Apply a changed configuration.
    ///
    /// Sections the configuration no longer names are dropped together with
    /// their splitters and recorded widths. Sections that survive keep their
    /// geometry and replacement widget; their text and alignment are
    /// refreshed. New sections get the default geometry.
    pub fn rebuild(&mut self, config: &ShellConfig) {
        self.font_face.clone_from(&config.font_face);
        self.default_font_size = config.font_size;
        self.handle_width = config.splitter_handle_width;

        let before = self.sections.len();
        self.sections
            .retain(|name, _| config.sections.contains_key(name));
        self.splitters
            .retain(|name, _| config.sections.contains_key(name));
        self.initial_widths
            .retain(|name, _| config.sections.contains_key(name));
        let removed = before - self.sections.len();

        let mut created = 0usize;
        for (&name, section_config) in &config.sections {
            let kind = if name == SectionName::Bottom && config.enable_status_bar_manager {
                SectionKind::StatusComposite
            } else {
                SectionKind::Label
            };
            let text = if kind == SectionKind::StatusComposite {
                config.status.initial_text.clone()
            } else {
                section_config.text.clone()
            };

            let reusable = self
                .sections
                .get(&name)
                .is_some_and(|existing| existing.kind() == kind);
            if reusable {
                if let Some(existing) = self.sections.get_mut(&name) {
                    let label = existing.label_mut();
                    label.text = text;
                    label.alignment = section_config.alignment;
                }
            } else {
                let label = LabelState::new(text, section_config.alignment, config.font_size);
                let replacement = self
                    .sections
                    .remove(&name)
                    .and_then(|mut old| old.take_replacement());
                let mut section = Section::new(name, kind, label);
                if let Some(handle) = replacement {
                    section.set_replacement(handle);
                }
                self.sections.insert(name, section);
                created += 1;
            }

            if name != SectionName::MainContent {
                let collapsed = self
                    .splitters
                    .get(&name)
                    .is_some_and(Splitter::is_collapsed);
                let mut splitter = Splitter::new(name, config.splitter_handle_width);
                if collapsed {
                    splitter.collapse();
                }
                self.splitters.insert(name, splitter);
            }
        }

        self.apply_default_geometry();
        self.generation += 1;
        tracing::debug!(
            target: "paneshell.layout",
            sections = self.sections.len(),
            created,
            removed,
            generation = self.generation,
            "layout rebuilt"
        );
    }

    /// Give every zero-sized section its default box.
    fn apply_default_geometry(&mut self) {
        let window = self.window;
        let bar_height = self.default_font_size.saturating_mul(2);
        let sidebar_width = window.width / SIDEBAR_FRACTION;
        let bars = self.sections.keys().filter(|name| name.is_bar()).count() as u32;
        let sidebars = self.sections.keys().filter(|name| name.is_sidebar()).count() as u32;

        for (name, section) in &mut self.sections {
            if !section.size().is_empty() {
                continue;
            }
            let size = if name.is_bar() {
                Size::new(window.width, bar_height)
            } else if name.is_sidebar() {
                Size::new(sidebar_width, window.height)
            } else {
                Size::new(
                    window
                        .width
                        .saturating_sub(sidebar_width.saturating_mul(sidebars)),
                    window.height.saturating_sub(bar_height.saturating_mul(bars)),
                )
            };
            section.set_container_size(size);
            section.set_size(size);
        }
    }

    /// Record `window_width` as the scaling baseline and remember the
    /// current width of every sidebar that has none recorded yet.
    pub fn capture_baseline(&mut self, window_width: u32) {
        self.baseline_width = window_width;
        for (name, section) in &self.sections {
            if !name.is_sidebar() || self.initial_widths.contains_key(name) {
                continue;
            }
            let width = section.size().width;
            if width > 0 {
                self.initial_widths.insert(*name, width);
                tracing::debug!(
                    target: "paneshell.layout",
                    section = %name,
                    width,
                    "initial sidebar width recorded"
                );
            }
        }
        self.generation += 1;
    }

    /// Install an external widget for `name`.
    ///
    /// Returns `false` (and drops `handle`) when the section is not part of
    /// the layout.
    pub fn set_replacement(&mut self, name: SectionName, handle: Box<dyn SectionHandle>) -> bool {
        match self.sections.get_mut(&name) {
            Some(section) => {
                section.set_replacement(handle);
                true
            }
            None => {
                tracing::warn!(
                    target: "paneshell.layout",
                    section = %name,
                    "replacement widget for absent section ignored"
                );
                false
            }
        }
    }

    /// Detach a section. The scaling pass aborts while main content is
    /// detached.
    pub fn remove_section(&mut self, name: SectionName) -> Option<Section> {
        self.splitters.remove(&name);
        self.initial_widths.remove(&name);
        self.sections.remove(&name)
    }

    #[must_use]
    pub fn font_face(&self) -> &str {
        &self.font_face
    }

    /// Configured font size, used as both maximum and fallback.
    #[must_use]
    pub fn default_font_size(&self) -> u32 {
        self.default_font_size
    }

    #[must_use]
    pub fn configured_handle_width(&self) -> u32 {
        self.handle_width
    }

    #[must_use]
    pub fn window_size(&self) -> Size {
        self.window
    }

    pub fn set_window_size(&mut self, size: Size) {
        self.window = size;
    }

    #[must_use]
    pub fn baseline_width(&self) -> u32 {
        self.baseline_width
    }

    #[must_use]
    pub fn initial_width(&self, name: SectionName) -> Option<u32> {
        self.initial_widths.get(&name).copied()
    }

    /// Incremented on every rebuild and baseline capture.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn contains(&self, name: SectionName) -> bool {
        self.sections.contains_key(&name)
    }

    #[must_use]
    pub fn section(&self, name: SectionName) -> Option<&Section> {
        self.sections.get(&name)
    }

    pub fn section_mut(&mut self, name: SectionName) -> Option<&mut Section> {
        self.sections.get_mut(&name)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn sections_mut(&mut self) -> impl Iterator<Item = &mut Section> {
        self.sections.values_mut()
    }

    #[must_use]
    pub fn section_names(&self) -> Vec<SectionName> {
        self.sections.keys().copied().collect()
    }

    #[must_use]
    pub fn splitter(&self, name: SectionName) -> Option<&Splitter> {
        self.splitters.get(&name)
    }

    pub fn splitter_mut(&mut self, name: SectionName) -> Option<&mut Splitter> {
        self.splitters.get_mut(&name)
    }

    pub fn splitters_mut(&mut self) -> impl Iterator<Item = &mut Splitter> {
        self.splitters.values_mut()
    }

    /// Active widget size per section.
    #[must_use]
    pub fn geometries(&self) -> BTreeMap<SectionName, Size> {
        self.sections
            .iter()
            .map(|(name, section)| (*name, section.size()))
            .collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            window: self.window,
            baseline_width: self.baseline_width,
            sections: self
                .sections
                .iter()
                .map(|(name, section)| {
                    (
                        *name,
                        SectionSnapshot {
                            kind: section.kind(),
                            size: section.size(),
                            container: section.container_size(),
                            font_size: section.font_size(),
                            text: section.text(),
                            replaced: section.has_replacement(),
                        },
                    )
                })
                .collect(),
            splitters: self.splitters.values().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paneshell_core::Alignment;

    struct Canvas(Size);

    impl SectionHandle for Canvas {
        fn size(&self) -> Size {
            self.0
        }
        fn set_size(&mut self, size: Size) {
            self.0 = size;
        }
        fn font_size(&self) -> u32 {
            0
        }
        fn set_font_size(&mut self, _font_size_px: u32) {}
        fn text(&self) -> Option<String> {
            None
        }
    }

    #[test]
    fn main_content_only_by_default() {
        let layout = ShellLayout::from_config(&ShellConfig::default());
        assert_eq!(layout.section_names(), vec![SectionName::MainContent]);
        assert!(layout.splitter(SectionName::MainContent).is_none());
        assert_eq!(
            layout.section(SectionName::MainContent).map(Section::size),
            Some(Size::new(640, 480))
        );
    }

    #[test]
    fn default_geometry_shares_the_window() {
        let config = ShellConfig::with_sections(SectionName::OPTIONAL);
        let layout = ShellLayout::from_config(&config);
        let geometry = layout.geometries();
        assert_eq!(geometry[&SectionName::Top], Size::new(640, 24));
        assert_eq!(geometry[&SectionName::Left], Size::new(128, 480));
        assert_eq!(geometry[&SectionName::MainContent], Size::new(384, 432));
        assert_eq!(layout.splitters.len(), 4);
    }

    #[test]
    fn huge_font_size_saturates_bar_heights() {
        let mut config = ShellConfig::with_sections([SectionName::Top, SectionName::Bottom]);
        config.font_size = 3_000_000_000;
        let layout = ShellLayout::from_config(&config);
        let geometry = layout.geometries();
        assert_eq!(geometry[&SectionName::Top].height, u32::MAX);
        assert_eq!(geometry[&SectionName::MainContent], Size::new(640, 0));
    }

    #[test]
    fn status_manager_makes_bottom_composite() {
        let mut config = ShellConfig::with_sections([SectionName::Bottom]);
        config.enable_status_bar_manager = true;
        let layout = ShellLayout::from_config(&config);
        let bottom = layout.section(SectionName::Bottom).unwrap();
        assert!(bottom.is_composite());
        assert_eq!(bottom.text().as_deref(), Some("Ready"));
    }

    #[test]
    fn rebuild_drops_removed_and_keeps_replacements() {
        let mut config = ShellConfig::with_sections([SectionName::Left, SectionName::Top]);
        let mut layout = ShellLayout::from_config(&config);
        assert!(layout.set_replacement(SectionName::Left, Box::new(Canvas(Size::new(90, 400)))));
        layout.capture_baseline(640);
        layout.splitter_mut(SectionName::Left).unwrap().collapse();
        let generation = layout.generation();

        config.sections.remove(&SectionName::Top);
        config.update_section(SectionName::Left, "Files", Alignment::Left);
        layout.rebuild(&config);

        assert!(!layout.contains(SectionName::Top));
        assert!(layout.splitter(SectionName::Top).is_none());
        let left = layout.section(SectionName::Left).unwrap();
        assert!(left.has_replacement());
        assert_eq!(left.size(), Size::new(90, 400));
        assert_eq!(left.label().text, "Files");
        assert!(layout.splitter(SectionName::Left).unwrap().is_collapsed());
        assert_eq!(layout.initial_width(SectionName::Left), Some(90));
        assert!(layout.generation() > generation);
    }

    #[test]
    fn capture_keeps_first_recorded_width() {
        let config = ShellConfig::with_sections([SectionName::Right]);
        let mut layout = ShellLayout::from_config(&config);
        layout.capture_baseline(640);
        assert_eq!(layout.initial_width(SectionName::Right), Some(128));

        layout
            .section_mut(SectionName::Right)
            .unwrap()
            .set_size(Size::new(50, 480));
        layout.capture_baseline(800);
        assert_eq!(layout.initial_width(SectionName::Right), Some(128));
        assert_eq!(layout.baseline_width(), 800);
    }

    #[test]
    fn replacement_for_absent_section_is_rejected() {
        let mut layout = ShellLayout::from_config(&ShellConfig::default());
        assert!(!layout.set_replacement(SectionName::Top, Box::new(Canvas(Size::default()))));
    }

    #[test]
    fn snapshot_serializes() {
        let layout = ShellLayout::from_config(&ShellConfig::with_sections([SectionName::Top]));
        let json = serde_json::to_value(layout.snapshot()).unwrap();
        assert_eq!(json["sections"]["top"]["text"], "Top Bar");
        assert_eq!(json["splitters"][0]["orientation"], "vertical");
    }
}
