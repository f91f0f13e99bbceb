#![forbid(unsafe_code)]

//! The per-resize scaling pass.
//!
//! On every settled resize the [`LayoutScaler`] resizes each section's box in
//! proportion to the window width, asks the [`FontFitter`] for the largest
//! font each section could use, and applies the smallest of those sizes to
//! every section so the shell reads at one consistent size.
//!
//! | section  | box                                        | fit (budget, reference) |
//! |----------|--------------------------------------------|-------------------------|
//! | bars     | height = line height + 20% padding         | window width, line height |
//! | status   | container = line height + 40%, label = line height | window width, line height |
//! | sidebars | width = scaled initial width + 10% padding | scaled width, scaled width |
//! | main     | untouched                                  | own width, own width    |
//!
//! Padding is never less than [`MIN_PADDING_PX`], so no box collapses to zero.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use paneshell_core::SectionName;
use paneshell_text::{FitParams, FontFitter, TextMeasurer};
use web_time::{Duration, Instant};

use crate::layout::ShellLayout;

/// Padding factor for top and bottom bars.
pub const BAR_PADDING: f64 = 0.2;
/// Padding factor for the status bar container.
pub const STATUS_PADDING: f64 = 0.4;
/// Padding factor for sidebars.
pub const SIDEBAR_PADDING: f64 = 0.1;
/// Floor applied to every padding.
pub const MIN_PADDING_PX: u32 = 2;
/// Minimum spacing between detailed per-section log passes.
pub const DETAIL_LOG_INTERVAL: Duration = Duration::from_millis(500);

/// `dimension` plus `max(MIN_PADDING_PX, trunc(dimension * factor))`.
#[must_use]
pub fn padded_dimension(dimension: u32, factor: f64) -> u32 {
    let padding = ((f64::from(dimension) * factor) as u32).max(MIN_PADDING_PX);
    dimension.saturating_add(padding)
}

/// Baseline and current window width for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingContext {
    pub baseline_width: u32,
    pub current_width: u32,
}

impl ScalingContext {
    #[must_use]
    pub const fn new(baseline_width: u32, current_width: u32) -> Self {
        Self {
            baseline_width,
            current_width,
        }
    }

    /// `current / baseline`, or 1.0 when no baseline was captured.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.baseline_width == 0 {
            1.0
        } else {
            f64::from(self.current_width) / f64::from(self.baseline_width)
        }
    }

    /// `trunc(value * ratio)`.
    #[must_use]
    pub fn scale(&self, value: u32) -> u32 {
        (f64::from(value) * self.ratio()) as u32
    }

    /// Scaled splitter handle width, clamped to `[1, configured]`.
    #[must_use]
    pub fn handle_width(&self, configured: u32) -> u32 {
        self.scale(configured).clamp(1, configured.max(1))
    }
}

/// What a scaling pass did.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleReport {
    /// Font size applied to every section.
    pub font_size: u32,
    /// Per-section fitted sizes; sections that were skipped are absent.
    pub contributions: BTreeMap<SectionName, u32>,
    pub ratio: f64,
    /// Whether this pass emitted detailed per-section logs.
    pub detailed: bool,
}

/// Runs scaling passes over a [`ShellLayout`].
#[derive(Debug, Clone)]
pub struct LayoutScaler {
    fitter: FontFitter,
    log_interval: Duration,
    last_detail_log: Option<Instant>,
    logged_generation: Option<u64>,
}

impl Default for LayoutScaler {
    fn default() -> Self {
        Self::new(FontFitter::default())
    }
}

impl LayoutScaler {
    #[must_use]
    pub fn new(fitter: FontFitter) -> Self {
        Self {
            fitter,
            log_interval: DETAIL_LOG_INTERVAL,
            last_detail_log: None,
            logged_generation: None,
        }
    }

    #[must_use]
    pub fn with_params(params: FitParams) -> Self {
        Self::new(FontFitter::new(params))
    }

    #[must_use]
    pub fn with_log_interval(mut self, interval: Duration) -> Self {
        self.log_interval = interval;
        self
    }

    #[must_use]
    pub fn fitter(&self) -> &FontFitter {
        &self.fitter
    }

    /// Scale `layout` to `current_width` and return the font size applied
    /// to every section, or `None` if main content is missing.
    pub fn recompute<M: TextMeasurer + ?Sized>(
        &mut self,
        layout: &mut ShellLayout,
        current_width: u32,
        measurer: &M,
    ) -> Option<u32> {
        self.recompute_at(layout, current_width, measurer, Instant::now())
            .map(|report| report.font_size)
    }

    /// [`recompute`](Self::recompute) with an explicit clock reading for the
    /// log throttle.
    pub fn recompute_at<M: TextMeasurer + ?Sized>(
        &mut self,
        layout: &mut ShellLayout,
        current_width: u32,
        measurer: &M,
        now: Instant,
    ) -> Option<ScaleReport> {
        if !layout.contains(SectionName::MainContent) {
            tracing::error!(
                target: "paneshell.scaler",
                window_width = current_width,
                "main content section missing; scaling pass aborted"
            );
            return None;
        }

        let detailed = self.detail_due(layout.generation(), now);
        let ctx = ScalingContext::new(layout.baseline_width(), current_width);
        let pass = Pass {
            fitter: self.fitter.with_iteration_trace(detailed),
            face: layout.font_face().to_owned(),
            max_font_size: layout.default_font_size(),
            ctx,
            detailed,
        };
        if detailed {
            tracing::debug!(
                target: "paneshell.scaler",
                window_width = current_width,
                baseline_width = ctx.baseline_width,
                ratio = ctx.ratio(),
                "scaling pass"
            );
        }

        let mut contributions = BTreeMap::new();
        for name in SectionName::ALL {
            let fitted = if name.is_bar() {
                pass.scale_bar(layout, name, measurer)
            } else if name.is_sidebar() {
                pass.scale_sidebar(layout, name, measurer)
            } else {
                pass.fit_main_content(layout, measurer)
            };
            if let Some(size) = fitted {
                contributions.insert(name, size);
            }
        }

        for splitter in layout.splitters_mut() {
            splitter.set_handle_width(ctx.handle_width(splitter.configured_handle_width()));
        }

        let font_size = contributions
            .values()
            .min()
            .copied()
            .unwrap_or(pass.max_font_size);
        for section in layout.sections_mut() {
            section.set_font_size(font_size);
        }

        if detailed {
            tracing::debug!(
                target: "paneshell.scaler",
                font_size,
                contributing = contributions.len(),
                "uniform font size applied"
            );
        }

        Some(ScaleReport {
            font_size,
            contributions,
            ratio: ctx.ratio(),
            detailed,
        })
    }

    /// Detailed logs run on the first pass after a layout build and then at
    /// most once per `log_interval`.
    fn detail_due(&mut self, generation: u64, now: Instant) -> bool {
        let due = self.logged_generation != Some(generation)
            || self
                .last_detail_log
                .is_none_or(|last| now.saturating_duration_since(last) > self.log_interval);
        if due {
            self.last_detail_log = Some(now);
            self.logged_generation = Some(generation);
        }
        due
    }
}

struct Pass {
    fitter: FontFitter,
    face: String,
    max_font_size: u32,
    ctx: ScalingContext,
    detailed: bool,
}

impl Pass {
    fn scale_bar<M: TextMeasurer + ?Sized>(
        &self,
        layout: &mut ShellLayout,
        name: SectionName,
        measurer: &M,
    ) -> Option<u32> {
        let section = layout.section_mut(name)?;
        let line_height = measurer.line_height(&self.face, section.font_size());
        let Some(reference) = NonZeroU32::new(line_height) else {
            tracing::warn!(target: "paneshell.scaler", section = %name, "zero line height; bar skipped");
            return None;
        };

        let height = if section.is_composite() {
            let container = section.container_size();
            section.set_container_size(
                container.with_height(padded_dimension(line_height, STATUS_PADDING)),
            );
            let label = section.size();
            section.set_size(label.with_height(line_height));
            section.container_size().height
        } else {
            let size = section.size();
            let height = padded_dimension(line_height, BAR_PADDING);
            section.set_size(size.with_height(height));
            height
        };

        let Some(text) = section.text() else {
            tracing::debug!(target: "paneshell.scaler", section = %name, "bar has no text; font not fitted");
            return None;
        };
        let result = self.fitter.fit(
            measurer,
            self.ctx.current_width,
            &text,
            reference,
            &self.face,
            self.max_font_size,
        );
        section.set_font_size(result.size);

        if self.detailed {
            tracing::debug!(
                target: "paneshell.scaler",
                section = %name,
                line_height,
                height,
                font_size = result.size,
                steps = result.steps,
                stop = ?result.stop,
                "bar scaled"
            );
        }
        Some(result.size)
    }

    fn scale_sidebar<M: TextMeasurer + ?Sized>(
        &self,
        layout: &mut ShellLayout,
        name: SectionName,
        measurer: &M,
    ) -> Option<u32> {
        let initial = layout.initial_width(name);
        let section = layout.section_mut(name)?;
        let Some(initial) = initial else {
            tracing::warn!(
                target: "paneshell.scaler",
                section = %name,
                "no initial width recorded; sidebar skipped"
            );
            return None;
        };

        let width = self.ctx.scale(initial);
        let Some(reference) = NonZeroU32::new(width) else {
            tracing::debug!(target: "paneshell.scaler", section = %name, initial, "sidebar scaled to zero width; skipped");
            return None;
        };
        let size = section.size();
        let box_width = padded_dimension(width, SIDEBAR_PADDING);
        section.set_size(size.with_width(box_width));

        let text = section.text()?;
        let result = self.fitter.fit(
            measurer,
            width,
            &text,
            reference,
            &self.face,
            self.max_font_size,
        );
        section.set_font_size(result.size);

        if self.detailed {
            tracing::debug!(
                target: "paneshell.scaler",
                section = %name,
                width,
                box_width,
                font_size = result.size,
                steps = result.steps,
                "sidebar scaled"
            );
        }
        Some(result.size)
    }

    fn fit_main_content<M: TextMeasurer + ?Sized>(
        &self,
        layout: &ShellLayout,
        measurer: &M,
    ) -> Option<u32> {
        let section = layout.section(SectionName::MainContent)?;
        let Some(text) = section.text() else {
            tracing::debug!(target: "paneshell.scaler", "main content has no text; font not fitted");
            return None;
        };
        let width = section.size().width;
        let reference = NonZeroU32::new(width)?;
        let result = self.fitter.fit(
            measurer,
            width,
            &text,
            reference,
            &self.face,
            self.max_font_size,
        );
        if self.detailed {
            tracing::debug!(
                target: "paneshell.scaler",
                section = %SectionName::MainContent,
                width,
                font_size = result.size,
                "main content fitted"
            );
        }
        Some(result.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paneshell_core::{ShellConfig, Size};
    use std::collections::HashMap;

    use crate::section::SectionHandle;

    /// Width is `size * factor` per text; line height equals the size.
    struct Factors(HashMap<&'static str, f64>);

    impl Factors {
        fn new(pairs: &[(&'static str, f64)]) -> Self {
            Self(pairs.iter().copied().collect())
        }
    }

    impl TextMeasurer for Factors {
        fn measure_width(&self, text: &str, _font_face: &str, font_size_px: u32) -> u32 {
            let factor = self.0.get(text).copied().unwrap_or(1.0);
            (f64::from(font_size_px) * factor).round() as u32
        }

        fn line_height(&self, _font_face: &str, font_size_px: u32) -> u32 {
            font_size_px
        }
    }

    fn config(names: &[SectionName], window: Size, font_size: u32) -> ShellConfig {
        let mut config = ShellConfig::with_sections(names.iter().copied());
        config.window_size = window;
        config.font_size = font_size;
        config
    }

    #[test]
    fn padding_has_a_floor() {
        assert_eq!(padded_dimension(100, 0.1), 110);
        assert_eq!(padded_dimension(10, 0.1), 12);
        assert_eq!(padded_dimension(0, 0.4), 2);
        assert_eq!(padded_dimension(20, 0.4), 28);
    }

    #[test]
    fn ratio_and_handle_width() {
        let ctx = ScalingContext::new(1000, 500);
        assert!((ctx.ratio() - 0.5).abs() < f64::EPSILON);
        assert_eq!(ctx.handle_width(5), 2);
        assert_eq!(ScalingContext::new(1000, 100).handle_width(5), 1);
        assert_eq!(ScalingContext::new(1000, 3000).handle_width(5), 5);
        assert!((ScalingContext::new(0, 700).ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn smallest_fitted_size_is_applied_everywhere() {
        let config = config(
            &[SectionName::Top, SectionName::Left],
            Size::new(1000, 600),
            24,
        );
        let mut layout = ShellLayout::from_config(&config);
        layout
            .section_mut(SectionName::MainContent)
            .unwrap()
            .set_size(Size::new(200, 500));
        layout.capture_baseline(1000);
        assert_eq!(layout.initial_width(SectionName::Left), Some(200));

        let measurer = Factors::new(&[
            ("Top Bar", 71.4),
            ("Left Sidebar", 11.0),
            ("Main Content", 20.0),
        ]);
        let mut scaler = LayoutScaler::default();
        let report = scaler
            .recompute_at(&mut layout, 1000, &measurer, Instant::now())
            .unwrap();

        assert_eq!(report.contributions[&SectionName::Top], 14);
        assert_eq!(report.contributions[&SectionName::Left], 18);
        assert_eq!(report.contributions[&SectionName::MainContent], 10);
        assert_eq!(report.font_size, 10);
        for section in layout.sections() {
            assert_eq!(section.font_size(), 10, "{}", section.name());
        }
        assert_eq!(layout.section(SectionName::Top).unwrap().size().height, 28);
    }

    #[test]
    fn sidebar_width_follows_window_ratio() {
        let config = config(&[SectionName::Left], Size::new(1000, 600), 12);
        let mut layout = ShellLayout::from_config(&config);
        layout.capture_baseline(1000);

        let mut scaler = LayoutScaler::default();
        scaler.recompute(&mut layout, 500, &Factors::new(&[]));

        let left = layout.section(SectionName::Left).unwrap();
        assert_eq!(left.size().width, 110);
        assert_eq!(layout.splitter(SectionName::Left).unwrap().handle_width(), 2);
    }

    #[test]
    fn status_composite_splits_container_and_label() {
        let mut config = config(&[SectionName::Bottom], Size::new(640, 480), 20);
        config.enable_status_bar_manager = true;
        let mut layout = ShellLayout::from_config(&config);
        layout.capture_baseline(640);

        LayoutScaler::default().recompute(&mut layout, 640, &Factors::new(&[]));

        let bottom = layout.section(SectionName::Bottom).unwrap();
        assert_eq!(bottom.container_size().height, 28);
        assert_eq!(bottom.size().height, 20);
    }

    #[test]
    fn sidebar_without_initial_width_is_skipped() {
        let config = config(&[SectionName::Right], Size::new(640, 480), 12);
        let mut layout = ShellLayout::from_config(&config);
        let report = LayoutScaler::default()
            .recompute_at(&mut layout, 640, &Factors::new(&[]), Instant::now())
            .unwrap();
        assert!(!report.contributions.contains_key(&SectionName::Right));
    }

    #[test]
    fn no_contributions_falls_back_to_default_size() {
        struct Blank(Size, u32);
        impl SectionHandle for Blank {
            fn size(&self) -> Size {
                self.0
            }
            fn set_size(&mut self, size: Size) {
                self.0 = size;
            }
            fn font_size(&self) -> u32 {
                self.1
            }
            fn set_font_size(&mut self, font_size_px: u32) {
                self.1 = font_size_px;
            }
            fn text(&self) -> Option<String> {
                None
            }
        }

        let mut layout = ShellLayout::from_config(&config(&[], Size::new(640, 480), 15));
        layout.set_replacement(SectionName::MainContent, Box::new(Blank(Size::new(640, 480), 0)));
        let report = LayoutScaler::default()
            .recompute_at(&mut layout, 320, &Factors::new(&[]), Instant::now())
            .unwrap();
        assert!(report.contributions.is_empty());
        assert_eq!(report.font_size, 15);
        assert_eq!(
            layout.section(SectionName::MainContent).unwrap().font_size(),
            15
        );
    }

    #[test]
    #[tracing_test::traced_test]
    fn missing_main_content_aborts_the_pass() {
        let mut layout = ShellLayout::from_config(&ShellConfig::default());
        assert!(layout.remove_section(SectionName::MainContent).is_some());
        let result = LayoutScaler::default().recompute(&mut layout, 640, &Factors::new(&[]));
        assert_eq!(result, None);
        assert!(logs_contain("main content section missing"));
    }

    #[test]
    fn detailed_logging_is_throttled() {
        let mut layout = ShellLayout::from_config(&ShellConfig::default());
        let measurer = Factors::new(&[]);
        let mut scaler = LayoutScaler::default();
        let start = Instant::now();

        let pass = |scaler: &mut LayoutScaler, layout: &mut ShellLayout, at: Duration| {
            scaler
                .recompute_at(layout, 640, &measurer, start + at)
                .unwrap()
                .detailed
        };

        assert!(pass(&mut scaler, &mut layout, Duration::ZERO));
        assert!(!pass(&mut scaler, &mut layout, Duration::from_millis(100)));
        assert!(!pass(&mut scaler, &mut layout, Duration::from_millis(450)));
        assert!(pass(&mut scaler, &mut layout, Duration::from_millis(600)));

        layout.capture_baseline(640);
        assert!(pass(&mut scaler, &mut layout, Duration::from_millis(650)));
    }
}
