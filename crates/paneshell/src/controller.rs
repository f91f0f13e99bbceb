#![forbid(unsafe_code)]

//! UI-thread orchestration of layout scaling and the status bar.
//!
//! [`ShellController`] owns every piece of UI-side state. The host forwards
//! window events ([`on_resize`](ShellController::on_resize),
//! [`apply_config`](ShellController::apply_config)) and calls
//! [`tick`](ShellController::tick) from its event loop; the controller fires
//! the debounced scaling pass and applies status results produced on the
//! pool. Nothing here blocks.

use std::sync::Arc;

use paneshell_core::{ConfigError, SectionName, ShellConfig, Size};
use paneshell_layout::{LayoutScaler, SectionHandle, ShellLayout};
use paneshell_runtime::{ResizeDebouncer, StatusBar, StatusController, TaskHandle, TaskPool};
use paneshell_text::TextMeasurer;
use web_time::Instant;

use crate::Result;

/// What a [`ShellController::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Font size applied by a debounced scaling pass, if one ran and
    /// succeeded.
    pub font_size: Option<u32>,
    /// Whether a debounced resize fired on this tick.
    pub resized: bool,
    /// Status events applied to the bar.
    pub status_events: usize,
}

/// Owns the layout, scaler, resize debouncer and status bar of one shell
/// window.
pub struct ShellController<M> {
    config: ShellConfig,
    layout: ShellLayout,
    scaler: LayoutScaler,
    debouncer: ResizeDebouncer,
    status: StatusController,
    status_bar: StatusBar,
    measurer: M,
    font_size: Option<u32>,
}

impl<M> std::fmt::Debug for ShellController<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellController")
            .field("window", &self.layout.window_size())
            .field("font_size", &self.font_size)
            .field("status_bar", &self.status_bar)
            .field("resize_pending", &self.debouncer.is_pending())
            .finish_non_exhaustive()
    }
}

fn validated(config: ShellConfig) -> std::result::Result<ShellConfig, ConfigError> {
    let errors = config.validate();
    if errors.is_empty() {
        Ok(config)
    } else {
        Err(ConfigError::Validation(errors))
    }
}

impl<M: TextMeasurer> ShellController<M> {
    /// Build a controller with its own task pool sized by `config.pool`.
    pub fn new(config: ShellConfig, measurer: M) -> Result<Self> {
        let config = validated(config)?;
        let pool = Arc::new(TaskPool::new(&config.pool)?);
        Self::build(config, measurer, pool)
    }

    /// Build a controller that submits status work to an existing pool.
    pub fn with_pool(config: ShellConfig, measurer: M, pool: Arc<TaskPool>) -> Result<Self> {
        Self::build(validated(config)?, measurer, pool)
    }

    fn build(config: ShellConfig, measurer: M, pool: Arc<TaskPool>) -> Result<Self> {
        let mut layout = ShellLayout::from_config(&config);
        layout.capture_baseline(config.window_size.width);
        let status = StatusController::new(&config.status, pool);
        let status_bar = status.initial_bar();

        let mut controller = Self {
            debouncer: ResizeDebouncer::from_millis(config.resize_debounce_ms),
            config,
            layout,
            scaler: LayoutScaler::default(),
            status,
            status_bar,
            measurer,
            font_size: None,
        };
        controller.recompute_now();
        tracing::info!(
            target: "paneshell.shell",
            sections = controller.layout.section_names().len(),
            window_width = controller.layout.window_size().width,
            window_height = controller.layout.window_size().height,
            font_size = ?controller.font_size,
            "shell ready"
        );
        Ok(controller)
    }

    /// Record a window resize. The scaling pass runs on the first
    /// [`tick`](Self::tick) after the window has been quiet for the
    /// configured debounce delay.
    pub fn on_resize(&mut self, size: Size, now: Instant) {
        self.layout.set_window_size(size);
        let superseded = self.debouncer.notify(size, now);
        tracing::trace!(
            target: "paneshell.shell",
            width = size.width,
            height = size.height,
            superseded,
            "resize scheduled"
        );
    }

    /// Fire a due resize and apply pending status events.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if let Some(size) = self.debouncer.poll(now) {
            outcome.resized = true;
            outcome.font_size = self.recompute_for(size.width);
        }
        outcome.status_events = self.status.drain(&mut self.status_bar);
        if outcome.status_events > 0 {
            self.mirror_status();
        }
        outcome
    }

    /// Handle a configuration change: rebuild the layout and rescale at
    /// once. A pending resize is folded into this pass.
    ///
    /// An invalid configuration is rejected and the current one stays.
    pub fn apply_config(&mut self, config: ShellConfig) -> Result<Option<u32>> {
        let config = validated(config)?;
        self.debouncer.cancel();
        self.layout.rebuild(&config);
        // Keep the baseline; only sidebars new to the layout get a width
        // recorded.
        let baseline = self.layout.baseline_width();
        self.layout.capture_baseline(baseline);
        if config.resize_debounce_ms != self.config.resize_debounce_ms {
            self.debouncer = ResizeDebouncer::from_millis(config.resize_debounce_ms);
        }
        self.config = config;
        self.mirror_status();
        Ok(self.recompute_now())
    }

    /// Run a scaling pass at the current window width, bypassing the
    /// debouncer.
    pub fn recompute_now(&mut self) -> Option<u32> {
        let width = self.layout.window_size().width;
        self.recompute_for(width)
    }

    fn recompute_for(&mut self, width: u32) -> Option<u32> {
        let font_size = self.scaler.recompute(&mut self.layout, width, &self.measurer);
        if font_size.is_some() {
            self.font_size = font_size;
        }
        font_size
    }

    /// Copy the status bar text into the bottom section when it hosts the
    /// status composite.
    fn mirror_status(&mut self) {
        if let Some(section) = self.layout.section_mut(SectionName::Bottom)
            && section.is_composite()
        {
            section.label_mut().text.clone_from(&self.status_bar.text);
        }
    }

    /// Queue a status text update. See [`StatusController::update`].
    pub fn update_status(&self, text: impl Into<String>) -> Option<TaskHandle> {
        self.status.update(text)
    }

    pub fn set_busy(&self, busy: bool) {
        self.status.set_busy(busy);
    }

    pub fn clear_status(&self) {
        self.status.clear();
    }

    /// Install an external widget for `name`. Takes effect on the next
    /// scaling pass.
    pub fn set_replacement(&mut self, name: SectionName, handle: Box<dyn SectionHandle>) -> bool {
        self.layout.set_replacement(name, handle)
    }

    /// Forward a splitter handle click. Returns `true` if the collapse
    /// state toggled, in which case the layout is rescaled at once.
    pub fn press_splitter_handle(&mut self, name: SectionName, handle_index: usize) -> bool {
        let toggled = self
            .layout
            .splitter_mut(name)
            .is_some_and(|splitter| splitter.press_handle(handle_index));
        if toggled {
            self.recompute_now();
        }
        toggled
    }

    /// Stop the status pool. Further updates are rejected.
    pub fn shutdown(&self) {
        self.status.pool().shutdown();
    }

    #[must_use]
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &ShellLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut ShellLayout {
        &mut self.layout
    }

    #[must_use]
    pub fn status(&self) -> &StatusController {
        &self.status
    }

    #[must_use]
    pub fn status_bar(&self) -> &StatusBar {
        &self.status_bar
    }

    /// Font size applied by the last successful scaling pass.
    #[must_use]
    pub fn font_size(&self) -> Option<u32> {
        self.font_size
    }

    #[must_use]
    pub fn resize_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    #[must_use]
    pub fn measurer(&self) -> &M {
        &self.measurer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paneshell_text::MonospaceMeasurer;
    use web_time::Duration;

    fn config() -> ShellConfig {
        let mut config = ShellConfig::with_sections(SectionName::ALL);
        config.pool.max_workers = 1;
        config
    }

    #[test]
    fn construction_runs_initial_pass() {
        let shell = ShellController::new(config(), MonospaceMeasurer::default()).unwrap();
        let font = shell.font_size().unwrap();
        assert!(font >= 1 && font <= shell.config().font_size);
        for section in shell.layout().sections() {
            assert_eq!(section.font_size(), font);
        }
    }

    #[test]
    fn resize_waits_for_quiet_period() {
        let mut shell = ShellController::new(config(), MonospaceMeasurer::default()).unwrap();
        let start = Instant::now();
        shell.on_resize(Size::new(400, 300), start);
        assert!(!shell.tick(start + Duration::from_millis(10)).resized);
        shell.on_resize(Size::new(420, 300), start + Duration::from_millis(20));
        assert!(!shell.tick(start + Duration::from_millis(60)).resized);

        let outcome = shell.tick(start + Duration::from_millis(70));
        assert!(outcome.resized);
        assert!(outcome.font_size.is_some());
        assert!(!shell.resize_pending());
        assert!(!shell.tick(start + Duration::from_millis(200)).resized);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut bad = config();
        bad.font_size = 0;
        let err = ShellController::new(bad, MonospaceMeasurer::default()).unwrap_err();
        assert_eq!(err.error_type(), "config");
    }

    #[test]
    fn splitter_click_toggles_collapse() {
        let mut shell = ShellController::new(config(), MonospaceMeasurer::default()).unwrap();
        assert!(shell.press_splitter_handle(SectionName::Left, 1));
        assert!(shell.layout().splitter(SectionName::Left).unwrap().is_collapsed());
        assert!(!shell.press_splitter_handle(SectionName::Left, 0));
        assert!(!shell.press_splitter_handle(SectionName::MainContent, 1));
    }

    #[test]
    fn splitter_toggle_rescales() {
        let mut shell = ShellController::new(config(), MonospaceMeasurer::default()).unwrap();
        let scaled = shell.layout().section(SectionName::Left).unwrap().size();
        let shrunk = Size::new(1, scaled.height);
        shell
            .layout_mut()
            .section_mut(SectionName::Left)
            .unwrap()
            .set_size(shrunk);

        assert!(!shell.press_splitter_handle(SectionName::Right, 0));
        assert_eq!(shell.layout().section(SectionName::Left).unwrap().size(), shrunk);

        assert!(shell.press_splitter_handle(SectionName::Right, 1));
        let left = shell.layout().section(SectionName::Left).unwrap().size();
        assert_eq!(left.width, scaled.width);
    }

    #[test]
    fn oversized_font_config_is_rejected() {
        let mut huge = ShellConfig::with_sections([SectionName::Top, SectionName::Bottom]);
        huge.font_size = 3_000_000_000;
        let err = ShellController::new(huge, MonospaceMeasurer::default()).unwrap_err();
        assert!(matches!(err, crate::Error::Config(ConfigError::Validation(_))));
    }
}
