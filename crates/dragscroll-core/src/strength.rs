//! L4 Atomic Layer: Edge-proximity strength functions
//!
//! Map a container box and a pointer position to a signed scroll strength in
//! `[-1, 1]`. Negative means "scroll toward the lower coordinate" (left/up),
//! positive means "toward the higher coordinate" (right/down), and zero
//! means no scrolling. Strength grows linearly from 0 at `buffer` distance
//! inside an edge to magnitude 1 on the edge itself.

use crate::geometry::{ElementBound, Point};

/// Default distance from an edge at which scrolling starts
pub const DEFAULT_BUFFER: f64 = 150.0;

/// Something that turns a box and a point into a scroll strength
pub trait StrengthFunction {
    fn strength(&self, bound: &ElementBound, point: Point) -> f64;
}

impl<F> StrengthFunction for F
where
    F: Fn(&ElementBound, Point) -> f64,
{
    #[inline]
    fn strength(&self, bound: &ElementBound, point: Point) -> f64 {
        self(bound, point)
    }
}

/// Scroll axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// The stock linear edge-proximity strength for one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStrength {
    axis: Axis,
    buffer: f64,
}

impl EdgeStrength {
    pub fn new(axis: Axis, buffer: f64) -> Self {
        Self { axis, buffer }
    }

    pub fn horizontal(buffer: f64) -> Self {
        Self::new(Axis::Horizontal, buffer)
    }

    pub fn vertical(buffer: f64) -> Self {
        Self::new(Axis::Vertical, buffer)
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn buffer(&self) -> f64 {
        self.buffer
    }

    /// Buffer actually used for `bound`: never more than half the box along
    /// the axis, so the two edge zones cannot overlap.
    #[inline]
    pub fn effective_buffer(&self, bound: &ElementBound) -> f64 {
        let extent = match self.axis {
            Axis::Horizontal => bound.w,
            Axis::Vertical => bound.h,
        };
        (extent / 2.0).min(self.buffer)
    }
}

impl StrengthFunction for EdgeStrength {
    fn strength(&self, bound: &ElementBound, point: Point) -> f64 {
        if !bound.contains(point) {
            return 0.0;
        }

        let buffer = self.effective_buffer(bound);
        if buffer <= 0.0 {
            return 0.0;
        }

        let (pos, start, extent) = match self.axis {
            Axis::Horizontal => (point.x, bound.x, bound.w),
            Axis::Vertical => (point.y, bound.y, bound.h),
        };

        if pos < start + buffer {
            (pos - start - buffer) / buffer
        } else if pos > start + extent - buffer {
            -(start + extent - pos - buffer) / buffer
        } else {
            0.0
        }
    }
}

/// Horizontal strength with the given buffer
pub fn create_horizontal_strength(buffer: f64) -> EdgeStrength {
    EdgeStrength::horizontal(buffer)
}

/// Vertical strength with the given buffer
pub fn create_vertical_strength(buffer: f64) -> EdgeStrength {
    EdgeStrength::vertical(buffer)
}

/// Horizontal strength with [`DEFAULT_BUFFER`]
pub fn default_horizontal_strength() -> EdgeStrength {
    create_horizontal_strength(DEFAULT_BUFFER)
}

/// Vertical strength with [`DEFAULT_BUFFER`]
pub fn default_vertical_strength() -> EdgeStrength {
    create_vertical_strength(DEFAULT_BUFFER)
}
