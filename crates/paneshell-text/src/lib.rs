#![forbid(unsafe_code)]

//! Text measurement and adaptive font sizing.
//!
//! # Role in paneshell
//! The layout scaler decides how much horizontal space each section gets;
//! this crate decides how large the section's text may be drawn in that
//! space. Hosts plug their font metrics in through [`TextMeasurer`].
//!
//! # Example
//! ```
//! use std::num::NonZeroU32;
//! use paneshell_text::{FontFitter, MonospaceMeasurer};
//!
//! let fitter = FontFitter::default();
//! let result = fitter.fit(
//!     &MonospaceMeasurer::default(),
//!     60,
//!     "Status Bar",
//!     NonZeroU32::new(120).unwrap(),
//!     "monospace",
//!     20,
//! );
//! assert!((3..=20).contains(&result.size));
//! ```

pub mod fit;
pub mod measure;

pub use fit::{FitParams, FitResult, FitStop, FontFitter};
pub use measure::{
    CacheStats, CachedMeasurer, MonospaceMeasurer, TextMeasurer, display_width, grapheme_width,
};
