//! Viewport-space geometry shared by the strength functions and hosts.

use serde::{Deserialize, Serialize};

/// A pointer position in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A box given by its top-left corner and size, in the same space as [`Point`]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementBound {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl ElementBound {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Edges are inclusive: a point on the border counts as inside.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// Scroll offsets and extents of a scrollable element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_left: f64,
    pub scroll_height: f64,
    pub scroll_width: f64,
    pub client_height: f64,
    pub client_width: f64,
}

impl ScrollMetrics {
    /// Largest valid `scroll_top`
    #[inline]
    pub fn max_scroll_top(&self) -> f64 {
        self.scroll_height - self.client_height
    }

    /// Largest valid `scroll_left`
    #[inline]
    pub fn max_scroll_left(&self) -> f64 {
        self.scroll_width - self.client_width
    }
}

/// Clamp `value` into `[min, max]` and round down to a whole pixel.
///
/// `max` wins over `min` when the range is inverted (content smaller than
/// its viewport), which then floors at `max`.
#[inline]
pub fn int_between(min: f64, max: f64, value: f64) -> f64 {
    max.min(min.max(value)).floor()
}
