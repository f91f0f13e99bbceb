#![forbid(unsafe_code)]

//! Section model, splitters and the resize scaling pass.
//!
//! # Role in paneshell
//! `paneshell-layout` owns everything the UI thread mutates during a resize:
//! the [`ShellLayout`] section map, the collapsible [`Splitter`]s, and the
//! [`LayoutScaler`] that resizes boxes and picks one font size for the whole
//! shell.
//!
//! Hosts plug their widgets in through [`SectionHandle`]; without one, each
//! section is driven by a headless [`LabelState`].

pub mod layout;
pub mod scaler;
pub mod section;
pub mod splitter;

pub use layout::{LayoutSnapshot, SectionSnapshot, ShellLayout};
pub use scaler::{
    BAR_PADDING, DETAIL_LOG_INTERVAL, LayoutScaler, MIN_PADDING_PX, SIDEBAR_PADDING,
    STATUS_PADDING, ScaleReport, ScalingContext, padded_dimension,
};
pub use section::{LabelState, Section, SectionHandle, SectionKind};
pub use splitter::{Orientation, Splitter};
