#![forbid(unsafe_code)]

//! Sections: the five named regions of the shell window.
//!
//! A [`Section`] owns a built-in label ([`LabelState`]) and can carry an
//! externally supplied replacement widget behind the [`SectionHandle`]
//! trait. The scaling pass only ever talks to the active handle, so it never
//! knows which of the two it is resizing.

use paneshell_core::{Alignment, SectionName, Size};
use serde::{Deserialize, Serialize};

/// Host-side widget the layout can resize and restyle.
///
/// Handles live on the UI thread. The core calls them but never constructs
/// or paints them.
pub trait SectionHandle {
    /// Current box size in pixels.
    fn size(&self) -> Size;

    fn set_size(&mut self, size: Size);

    /// Current font size in pixels.
    fn font_size(&self) -> u32;

    fn set_font_size(&mut self, font_size_px: u32);

    /// Displayed text, if the widget shows any.
    fn text(&self) -> Option<String>;
}

/// The built-in label used when no replacement widget is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelState {
    pub text: String,
    pub alignment: Alignment,
    pub size: Size,
    pub font_size: u32,
}

impl LabelState {
    #[must_use]
    pub fn new(text: impl Into<String>, alignment: Alignment, font_size: u32) -> Self {
        Self {
            text: text.into(),
            alignment,
            size: Size::default(),
            font_size,
        }
    }
}

impl SectionHandle for LabelState {
    fn size(&self) -> Size {
        self.size
    }

    fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    fn font_size(&self) -> u32 {
        self.font_size
    }

    fn set_font_size(&mut self, font_size_px: u32) {
        self.font_size = font_size_px;
    }

    fn text(&self) -> Option<String> {
        Some(self.text.clone())
    }
}

/// How a section's widget is composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// A single label.
    #[default]
    Label,
    /// A status bar container hosting a label. The container gets the
    /// padded height, the label the bare line height.
    StatusComposite,
}

/// One named region of the shell window.
pub struct Section {
    name: SectionName,
    kind: SectionKind,
    label: LabelState,
    container: Size,
    replacement: Option<Box<dyn SectionHandle>>,
}

impl std::fmt::Debug for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Section")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("container", &self.container)
            .field("has_replacement", &self.replacement.is_some())
            .finish()
    }
}

impl Section {
    #[must_use]
    pub fn new(name: SectionName, kind: SectionKind, label: LabelState) -> Self {
        let container = label.size;
        Self {
            name,
            kind,
            label,
            container,
            replacement: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> SectionName {
        self.name
    }

    #[must_use]
    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    /// A status composite only applies to the built-in label; a replacement
    /// widget is always sized as a plain label.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.kind == SectionKind::StatusComposite && self.replacement.is_none()
    }

    #[must_use]
    pub fn label(&self) -> &LabelState {
        &self.label
    }

    pub fn label_mut(&mut self) -> &mut LabelState {
        &mut self.label
    }

    /// Outer box of a status composite. For plain labels this is the
    /// label's own box.
    #[must_use]
    pub fn container_size(&self) -> Size {
        if self.is_composite() {
            self.container
        } else {
            self.handle().size()
        }
    }

    pub fn set_container_size(&mut self, size: Size) {
        if self.is_composite() {
            self.container = size;
        } else {
            self.handle_mut().set_size(size);
        }
    }

    /// The widget the layout currently drives.
    #[must_use]
    pub fn handle(&self) -> &dyn SectionHandle {
        match &self.replacement {
            Some(handle) => handle.as_ref(),
            None => &self.label,
        }
    }

    pub fn handle_mut(&mut self) -> &mut dyn SectionHandle {
        match &mut self.replacement {
            Some(handle) => handle.as_mut(),
            None => &mut self.label,
        }
    }

    #[must_use]
    pub fn has_replacement(&self) -> bool {
        self.replacement.is_some()
    }

    /// Install an external widget, returning the previous one.
    pub fn set_replacement(
        &mut self,
        handle: Box<dyn SectionHandle>,
    ) -> Option<Box<dyn SectionHandle>> {
        self.replacement.replace(handle)
    }

    pub fn take_replacement(&mut self) -> Option<Box<dyn SectionHandle>> {
        self.replacement.take()
    }

    /// Current size of the active widget.
    #[must_use]
    pub fn size(&self) -> Size {
        self.handle().size()
    }

    pub fn set_size(&mut self, size: Size) {
        self.handle_mut().set_size(size);
    }

    #[must_use]
    pub fn font_size(&self) -> u32 {
        self.handle().font_size()
    }

    pub fn set_font_size(&mut self, font_size_px: u32) {
        self.handle_mut().set_font_size(font_size_px);
    }

    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.handle().text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Canvas {
        size: Size,
        font: u32,
    }

    impl SectionHandle for Canvas {
        fn size(&self) -> Size {
            self.size
        }
        fn set_size(&mut self, size: Size) {
            self.size = size;
        }
        fn font_size(&self) -> u32 {
            self.font
        }
        fn set_font_size(&mut self, font_size_px: u32) {
            self.font = font_size_px;
        }
        fn text(&self) -> Option<String> {
            None
        }
    }

    fn label(text: &str) -> LabelState {
        LabelState::new(text, Alignment::Center, 12)
    }

    #[test]
    fn label_is_the_default_handle() {
        let mut section = Section::new(SectionName::Top, SectionKind::Label, label("Top Bar"));
        section.set_font_size(9);
        assert_eq!(section.label().font_size, 9);
        assert_eq!(section.text().as_deref(), Some("Top Bar"));
    }

    #[test]
    fn replacement_takes_over_sizing() {
        let mut section = Section::new(SectionName::MainContent, SectionKind::Label, label("Main"));
        assert!(section.set_replacement(Box::new(Canvas::default())).is_none());
        section.set_size(Size::new(300, 200));
        section.set_font_size(8);

        assert_eq!(section.size(), Size::new(300, 200));
        assert_eq!(section.text(), None);
        assert_eq!(section.label().size, Size::default());
        assert_eq!(section.label().font_size, 12);

        assert!(section.take_replacement().is_some());
        assert_eq!(section.text().as_deref(), Some("Main"));
    }

    #[test]
    fn composite_keeps_a_separate_container() {
        let mut section = Section::new(
            SectionName::Bottom,
            SectionKind::StatusComposite,
            label("Ready"),
        );
        assert!(section.is_composite());
        section.set_container_size(Size::new(640, 24));
        section.set_size(Size::new(640, 17));
        assert_eq!(section.container_size().height, 24);
        assert_eq!(section.size().height, 17);

        section.set_replacement(Box::new(Canvas::default()));
        assert!(!section.is_composite());
    }
}
