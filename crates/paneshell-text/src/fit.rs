#![forbid(unsafe_code)]

//! Adaptive font-size search.
//!
//! [`FontFitter`] finds the largest font size (bounded by a caller-supplied
//! maximum) at which a string renders within a tolerance of a pixel budget.
//!
//! # Algorithm
//!
//! 1. Start from `max * budget / reference`, clamped to `[min, max]`.
//! 2. Measure the text at the truncated size. Within `tolerance` of the
//!    budget: done.
//! 3. Otherwise step half a pixel toward the budget. A step that reverses the
//!    previous step ends the search (the size is hunting around the
//!    tolerance band and will not converge).
//! 4. Clamp to `[min, max]`; hitting a bound ends the search.
//! 5. Give up after `max_iterations` steps.
//!
//! # Invariants
//!
//! - The result is always in `[min_font_size, max_font_size]`.
//! - The search is deterministic for a deterministic [`TextMeasurer`].
//! - A zero reference width is unrepresentable (`NonZeroU32`).

use std::num::NonZeroU32;

use crate::measure::TextMeasurer;

/// Smallest size the fitter will return unless configured otherwise.
pub const DEFAULT_MIN_FONT_SIZE: u32 = 3;
/// Accepted distance between measured width and budget, in pixels.
pub const DEFAULT_TOLERANCE_PX: u32 = 3;
/// Upper bound on correction steps.
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

const STEP_PX: f64 = 0.5;

/// Tunables for [`FontFitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitParams {
    /// Lower bound on the result. Values below 1 are treated as 1.
    pub min_font_size: u32,
    pub tolerance_px: u32,
    pub max_iterations: u32,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            min_font_size: DEFAULT_MIN_FONT_SIZE,
            tolerance_px: DEFAULT_TOLERANCE_PX,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStop {
    /// Measured width is within tolerance of the budget.
    WithinTolerance,
    /// The next step would have reversed the previous one.
    Oscillation,
    /// A step crossed `min_font_size` or `max_font_size`.
    Clamped,
    /// `max_iterations` steps were taken without settling.
    IterationLimit,
}

/// Outcome of a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitResult {
    /// Resolved font size in pixels.
    pub size: u32,
    /// Number of half-pixel corrections applied.
    pub steps: u32,
    pub stop: FitStop,
    /// Last measured width, if any measurement was taken.
    pub measured_width: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Grow,
    Shrink,
}

/// Font-size search over a [`TextMeasurer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FontFitter {
    params: FitParams,
    trace_iterations: bool,
}

impl FontFitter {
    #[must_use]
    pub fn new(params: FitParams) -> Self {
        Self {
            params,
            trace_iterations: false,
        }
    }

    /// Emit a `trace` event for every measurement.
    #[must_use]
    pub fn with_iteration_trace(mut self, enabled: bool) -> Self {
        self.trace_iterations = enabled;
        self
    }

    #[must_use]
    pub fn params(&self) -> FitParams {
        self.params
    }

    /// Search for the font size at which `text` renders closest to
    /// `budget_width_px`.
    ///
    /// `reference_width_px` is the width the text occupies at
    /// `max_font_size`; it only seeds the initial estimate. If
    /// `max_font_size` is below the configured minimum, the minimum wins.
    pub fn fit<M: TextMeasurer + ?Sized>(
        &self,
        measurer: &M,
        budget_width_px: u32,
        text: &str,
        reference_width_px: NonZeroU32,
        font_face: &str,
        max_font_size: u32,
    ) -> FitResult {
        let min = self.params.min_font_size.max(1);
        let max = max_font_size.max(min);
        let (min_f, max_f) = (f64::from(min), f64::from(max));
        let budget = budget_width_px;

        let mut size = (max_f * f64::from(budget) / f64::from(reference_width_px.get()))
            .clamp(min_f, max_f);
        let mut last_step: Option<Step> = None;
        let mut steps = 0u32;
        let mut measured_width = None;

        let stop = loop {
            if steps >= self.params.max_iterations {
                break FitStop::IterationLimit;
            }

            let measured = measurer.measure_width(text, font_face, size as u32);
            measured_width = Some(measured);
            if self.trace_iterations {
                tracing::trace!(
                    target: "paneshell.fit",
                    iteration = steps,
                    font_size = size,
                    measured_width = measured,
                    budget_width = budget,
                    "fit iteration"
                );
            }

            if measured.abs_diff(budget) <= self.params.tolerance_px {
                break FitStop::WithinTolerance;
            }

            let step = if measured > budget {
                Step::Shrink
            } else {
                Step::Grow
            };
            if last_step.is_some_and(|last| last != step) {
                break FitStop::Oscillation;
            }
            size += match step {
                Step::Grow => STEP_PX,
                Step::Shrink => -STEP_PX,
            };
            last_step = Some(step);
            steps += 1;

            if size < min_f {
                size = min_f;
                break FitStop::Clamped;
            }
            if size > max_f {
                size = max_f;
                break FitStop::Clamped;
            }
        };

        let resolved = (size as u32).clamp(min, max);
        if self.trace_iterations {
            tracing::debug!(
                target: "paneshell.fit",
                font_size = resolved,
                steps,
                stop = ?stop,
                measured_width = ?measured_width,
                budget_width = budget,
                "fit resolved"
            );
        }

        FitResult {
            size: resolved,
            steps,
            stop,
            measured_width,
        }
    }
}
