#![forbid(unsafe_code)]

//! Vertical geometry primitives.
//!
//! Units are host units: CSS pixels in a browser, scaled rows in the
//! terminal frontend. Only the vertical axis matters for section tracking.

/// Vertical extent of a rendered region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Top edge (inclusive), measured from the top of the document.
    pub top: u32,
    /// Height of the region.
    pub height: u32,
}

impl Span {
    #[inline]
    pub const fn new(top: u32, height: u32) -> Self {
        Self { top, height }
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height)
    }

    /// Whether `y` falls inside the span.
    #[inline]
    pub const fn contains(&self, y: u32) -> bool {
        y >= self.top && y < self.bottom()
    }

    /// Length of the overlap with another span.
    #[inline]
    pub fn overlap(&self, other: &Span) -> u32 {
        let top = self.top.max(other.top);
        let bottom = self.bottom().min(other.bottom());
        bottom.saturating_sub(top)
    }
}

/// The visible window onto the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Current vertical scroll offset.
    pub scroll_y: u32,
    /// Visible height.
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(scroll_y: u32, height: u32) -> Self {
        Self { scroll_y, height }
    }

    /// The viewport as a span in document coordinates.
    #[inline]
    pub const fn span(&self) -> Span {
        Span::new(self.scroll_y, self.height)
    }
}

/// Fraction of `region` visible inside `viewport`, in `[0.0, 1.0]`.
///
/// Zero-height regions always report `0.0`.
#[must_use]
pub fn intersection_ratio(region: Span, viewport: Viewport) -> f32 {
    if region.height == 0 {
        return 0.0;
    }
    let visible = region.overlap(&viewport.span());
    (visible as f64 / region.height as f64).clamp(0.0, 1.0) as f32
}
