#![forbid(unsafe_code)]

//! Text measurement capability.
//!
//! The font fitter never talks to a rendering backend directly. It asks a
//! [`TextMeasurer`] how wide a string renders at a given pixel size, and the
//! host supplies an implementation backed by its toolkit's font metrics.
//!
//! Two implementations ship with the crate:
//!
//! - [`MonospaceMeasurer`]: a deterministic model that treats every cell as a
//!   fixed fraction of the pixel size. Grapheme clusters are measured with
//!   `unicode-width`, so CJK and emoji count as two cells.
//! - [`CachedMeasurer`]: an LRU cache in front of any other measurer, for
//!   backends where a metrics query is expensive.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use lru::LruCache;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Measures rendered text in pixels.
///
/// Implementations must be deterministic: the same arguments always return
/// the same width. The fitter relies on this for reproducible results.
pub trait TextMeasurer {
    /// Rendered width of `text` in `font_face` at `font_size_px`.
    fn measure_width(&self, text: &str, font_face: &str, font_size_px: u32) -> u32;

    /// Height of one line of text in `font_face` at `font_size_px`.
    fn line_height(&self, font_face: &str, font_size_px: u32) -> u32;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure_width(&self, text: &str, font_face: &str, font_size_px: u32) -> u32 {
        (**self).measure_width(text, font_face, font_size_px)
    }

    fn line_height(&self, font_face: &str, font_size_px: u32) -> u32 {
        (**self).line_height(font_face, font_size_px)
    }
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for Box<T> {
    fn measure_width(&self, text: &str, font_face: &str, font_size_px: u32) -> u32 {
        (**self).measure_width(text, font_face, font_size_px)
    }

    fn line_height(&self, font_face: &str, font_size_px: u32) -> u32 {
        (**self).line_height(font_face, font_size_px)
    }
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for Arc<T> {
    fn measure_width(&self, text: &str, font_face: &str, font_size_px: u32) -> u32 {
        (**self).measure_width(text, font_face, font_size_px)
    }

    fn line_height(&self, font_face: &str, font_size_px: u32) -> u32 {
        (**self).line_height(font_face, font_size_px)
    }
}

/// Display width of a single grapheme cluster in cells (0, 1 or 2).
#[inline]
#[must_use]
pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.is_ascii() {
        return grapheme.bytes().filter(|b| !b.is_ascii_control()).count().min(1);
    }
    UnicodeWidthStr::width(grapheme).min(2)
}

/// Display width of the widest line of `text` in cells.
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.lines()
        .map(|line| {
            if line.is_ascii() {
                line.bytes().filter(|b| !b.is_ascii_control()).count()
            } else {
                line.graphemes(true).map(grapheme_width).sum()
            }
        })
        .max()
        .unwrap_or(0)
}

/// Deterministic fixed-advance measurer.
///
/// Width is `ceil(cells * font_size_px * advance)`, line height is
/// `ceil(font_size_px * line_spacing)`. The font face is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    /// Cell advance as a fraction of the pixel size. Default: 0.6.
    pub advance: f64,
    /// Line height as a multiple of the pixel size. Default: 1.2.
    pub line_spacing: f64,
}

impl MonospaceMeasurer {
    #[must_use]
    pub const fn new(advance: f64, line_spacing: f64) -> Self {
        Self {
            advance,
            line_spacing,
        }
    }
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self::new(0.6, 1.2)
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure_width(&self, text: &str, _font_face: &str, font_size_px: u32) -> u32 {
        let cells = display_width(text) as f64;
        ceil_px(cells * f64::from(font_size_px) * self.advance)
    }

    fn line_height(&self, _font_face: &str, font_size_px: u32) -> u32 {
        ceil_px(f64::from(font_size_px) * self.line_spacing)
    }
}

// Absorbs float noise so 50 * 0.6 rounds up to 30, not 31.
fn ceil_px(value: f64) -> u32 {
    (value - 1e-9).ceil().max(0.0) as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MeasureKey {
    text: String,
    font_face: String,
    font_size_px: u32,
}

/// Cache hit/miss counters for a [`CachedMeasurer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// LRU cache in front of another measurer.
///
/// Widths are cached per `(text, font_face, font_size_px)`. Line heights are
/// forwarded uncached since they are cheap on every backend we target.
pub struct CachedMeasurer<M> {
    inner: M,
    cache: Mutex<LruCache<MeasureKey, u32>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<M: TextMeasurer> CachedMeasurer<M> {
    /// Default number of cached widths.
    pub const DEFAULT_CAPACITY: usize = 512;

    #[must_use]
    pub fn new(inner: M) -> Self {
        Self::with_capacity(inner, Self::DEFAULT_CAPACITY)
    }

    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn with_capacity(inner: M, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Drop every cached width, e.g. after the host changes font settings.
    pub fn clear(&self) {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: TextMeasurer> TextMeasurer for CachedMeasurer<M> {
    fn measure_width(&self, text: &str, font_face: &str, font_size_px: u32) -> u32 {
        let key = MeasureKey {
            text: text.to_string(),
            font_face: font_face.to_string(),
            font_size_px,
        };
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(width) = cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return *width;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let width = self.inner.measure_width(text, font_face, font_size_px);
        cache.put(key, width);
        width
    }

    fn line_height(&self, font_face: &str, font_size_px: u32) -> u32 {
        self.inner.line_height(font_face, font_size_px)
    }
}
