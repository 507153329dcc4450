//! Monitor options and the factory that validates them.

use std::fmt;
use std::time::Duration;

use crate::config::{EdgeDamping, ScrollAxes};
use crate::host::Host;
use crate::monitor::ScrollMonitor;
use crate::strength::{
    create_horizontal_strength, create_vertical_strength, default_horizontal_strength,
    default_vertical_strength, StrengthFunction,
};
use crate::throttle::DEFAULT_THROTTLE;
use crate::{Error, Result};

/// Default pixels per mutating tick at full strength
pub const DEFAULT_STRENGTH_MULTIPLIER: f64 = 30.0;

/// Called with `(dx, dy)`, the scroll actually applied on a mutating tick
pub type ScrollChangeFn = Box<dyn FnMut(f64, f64)>;

pub struct Options {
    pub horizontal_strength: Box<dyn StrengthFunction>,
    pub vertical_strength: Box<dyn StrengthFunction>,
    /// Scales strength into a per-tick delta; 0 disables scrolling
    pub strength_multiplier: f64,
    pub on_scroll_change: ScrollChangeFn,
    pub axes: ScrollAxes,
    pub damping: EdgeDamping,
    /// Pointer sampling window
    pub throttle: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            horizontal_strength: Box::new(default_horizontal_strength()),
            vertical_strength: Box::new(default_vertical_strength()),
            strength_multiplier: DEFAULT_STRENGTH_MULTIPLIER,
            on_scroll_change: Box::new(|_, _| {}),
            axes: ScrollAxes::default(),
            damping: EdgeDamping::default(),
            throttle: DEFAULT_THROTTLE,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("strength_multiplier", &self.strength_multiplier)
            .field("axes", &self.axes)
            .field("damping", &self.damping)
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

impl Options {
    pub fn with_horizontal_strength(mut self, f: impl StrengthFunction + 'static) -> Self {
        self.horizontal_strength = Box::new(f);
        self
    }

    pub fn with_vertical_strength(mut self, f: impl StrengthFunction + 'static) -> Self {
        self.vertical_strength = Box::new(f);
        self
    }

    /// Use the stock edge strengths on both axes with this buffer
    pub fn with_buffer(self, buffer: f64) -> Self {
        self.with_horizontal_strength(create_horizontal_strength(buffer))
            .with_vertical_strength(create_vertical_strength(buffer))
    }

    pub fn with_strength_multiplier(mut self, multiplier: f64) -> Self {
        self.strength_multiplier = multiplier;
        self
    }

    pub fn on_scroll_change(mut self, f: impl FnMut(f64, f64) + 'static) -> Self {
        self.on_scroll_change = Box::new(f);
        self
    }

    pub fn with_axes(mut self, axes: ScrollAxes) -> Self {
        self.axes = axes;
        self
    }

    pub fn with_damping(mut self, damping: EdgeDamping) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Reject values that would scroll backwards or never settle
    pub fn validate(&self) -> Result<()> {
        if !self.strength_multiplier.is_finite() || self.strength_multiplier < 0.0 {
            return Err(Error::InvalidOption(format!(
                "strength_multiplier must be a non-negative number, got {}",
                self.strength_multiplier
            )));
        }

        let d = &self.damping;
        for (name, value) in [
            ("damping.top", d.top),
            ("damping.bottom", d.bottom),
            ("damping.mobile_bottom", d.mobile_bottom),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidOption(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=1.0).contains(&d.strength) {
            return Err(Error::InvalidOption(format!(
                "damping.strength must be within [0, 1], got {}",
                d.strength
            )));
        }

        Ok(())
    }
}

/// Create a monitor for the element `host` represents
///
/// Options are validated here; the monitor itself never fails.
pub fn create_scroll_monitor<H: Host>(host: H, options: Options) -> Result<ScrollMonitor<H>> {
    options.validate()?;
    Ok(ScrollMonitor::new(host, options))
}
