//! Property-based invariant tests for the font fitter.
//!
//! 1. The resolved size is always within `[min_font_size, max_font_size]`.
//! 2. Fitting is deterministic for a deterministic measurer.
//! 3. The number of steps never exceeds `max_iterations`.
//! 4. A result reported within tolerance really is within tolerance.
//! 5. The caching measurer never changes the outcome.

use std::num::NonZeroU32;

use paneshell_text::{
    CachedMeasurer, FitParams, FitStop, FontFitter, MonospaceMeasurer, TextMeasurer,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ]{0,40}",
        Just("Status Bar".to_string()),
        Just("你好世界".to_string()),
        Just(String::new()),
    ]
}

fn arb_params() -> impl Strategy<Value = FitParams> {
    (0u32..12, 0u32..8, 0u32..80).prop_map(|(min, tolerance, iterations)| FitParams {
        min_font_size: min,
        tolerance_px: tolerance,
        max_iterations: iterations,
    })
}

fn arb_measurer() -> impl Strategy<Value = MonospaceMeasurer> {
    (0.3f64..1.2, 1.0f64..1.6).prop_map(|(advance, spacing)| MonospaceMeasurer::new(advance, spacing))
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn size_is_within_bounds(
        params in arb_params(),
        measurer in arb_measurer(),
        text in arb_text(),
        budget in 0u32..4000,
        reference in 1u32..4000,
        max in 0u32..96,
    ) {
        let fitter = FontFitter::new(params);
        let result = fitter.fit(&measurer, budget, &text, NonZeroU32::new(reference).unwrap(), "mono", max);
        let min = params.min_font_size.max(1);
        prop_assert!(result.size >= min);
        prop_assert!(result.size <= max.max(min));
    }

    #[test]
    fn fitting_is_deterministic(
        params in arb_params(),
        text in arb_text(),
        budget in 0u32..2000,
        reference in 1u32..2000,
        max in 1u32..64,
    ) {
        let fitter = FontFitter::new(params);
        let measurer = MonospaceMeasurer::default();
        let reference = NonZeroU32::new(reference).unwrap();
        let first = fitter.fit(&measurer, budget, &text, reference, "mono", max);
        let second = fitter.fit(&measurer, budget, &text, reference, "mono", max);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn steps_are_bounded(
        params in arb_params(),
        text in arb_text(),
        budget in 0u32..2000,
        reference in 1u32..2000,
        max in 1u32..200,
    ) {
        let fitter = FontFitter::new(params);
        let result = fitter.fit(&MonospaceMeasurer::default(), budget, &text, NonZeroU32::new(reference).unwrap(), "mono", max);
        prop_assert!(result.steps <= params.max_iterations);
        if result.stop == FitStop::IterationLimit {
            prop_assert_eq!(result.steps, params.max_iterations);
        }
    }

    #[test]
    fn within_tolerance_means_within_tolerance(
        text in "[a-z]{1,30}",
        budget in 0u32..2000,
        reference in 1u32..2000,
        max in 1u32..64,
    ) {
        let fitter = FontFitter::default();
        let measurer = MonospaceMeasurer::default();
        let result = fitter.fit(&measurer, budget, &text, NonZeroU32::new(reference).unwrap(), "mono", max);
        if result.stop == FitStop::WithinTolerance {
            let measured = measurer.measure_width(&text, "mono", result.size);
            prop_assert!(measured.abs_diff(budget) <= fitter.params().tolerance_px);
            prop_assert_eq!(result.measured_width, Some(measured));
        }
    }

    #[test]
    fn cache_is_transparent(
        text in arb_text(),
        budget in 0u32..2000,
        reference in 1u32..2000,
        max in 1u32..64,
    ) {
        let fitter = FontFitter::default();
        let plain = MonospaceMeasurer::default();
        let cached = CachedMeasurer::new(plain);
        let reference = NonZeroU32::new(reference).unwrap();
        prop_assert_eq!(
            fitter.fit(&plain, budget, &text, reference, "mono", max),
            fitter.fit(&cached, budget, &text, reference, "mono", max),
        );
    }
}
