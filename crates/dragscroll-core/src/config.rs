use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::frame::DEFAULT_FRAME_INTERVAL;
use crate::host::UiMode;
use crate::options::{Options, DEFAULT_STRENGTH_MULTIPLIER};
use crate::strength::{create_horizontal_strength, create_vertical_strength, DEFAULT_BUFFER};
use crate::throttle::DEFAULT_THROTTLE;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    /// Autoscroll tuning in pixels, used by headless simulation
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Axes the monitor writes scroll positions on
///
/// Strength is always computed for both axes; by default only the vertical
/// position is changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAxes {
    #[default]
    Vertical,
    Both,
}

/// Minimum vertical scroll applied while the dragged element itself sits
/// near the top or bottom of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeDamping {
    /// Element top closer than this to the viewport top counts as "at top"
    #[serde(default = "default_damping_top")]
    pub top: f64,
    /// Element bottom closer than this to the viewport bottom counts as "at bottom"
    #[serde(default = "default_damping_bottom")]
    pub bottom: f64,
    /// Bottom threshold used in mobile view
    #[serde(default = "default_damping_mobile_bottom")]
    pub mobile_bottom: f64,
    /// Strength forced onto the vertical axis
    #[serde(default = "default_damping_strength")]
    pub strength: f64,
}

impl Default for EdgeDamping {
    fn default() -> Self {
        Self {
            top: default_damping_top(),
            bottom: default_damping_bottom(),
            mobile_bottom: default_damping_mobile_bottom(),
            strength: default_damping_strength(),
        }
    }
}

impl EdgeDamping {
    /// Bottom threshold for the given view
    #[inline]
    pub fn bottom_threshold(&self, mobile_view: bool) -> f64 {
        if mobile_view {
            self.mobile_bottom
        } else {
            self.bottom
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Distance from an edge where scrolling starts
    #[serde(default = "default_buffer")]
    pub buffer: f64,
    /// Pixels per mutating tick at full strength (0 disables scrolling)
    #[serde(default = "default_strength_multiplier")]
    pub strength_multiplier: f64,
    /// Pointer sampling window in milliseconds
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// Fallback frame interval in microseconds
    #[serde(default = "default_frame_interval_us")]
    pub frame_interval_us: u64,
    #[serde(default)]
    pub axes: ScrollAxes,
    #[serde(default)]
    pub damping: EdgeDamping,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            buffer: default_buffer(),
            strength_multiplier: default_strength_multiplier(),
            throttle_ms: default_throttle_ms(),
            frame_interval_us: default_frame_interval_us(),
            axes: ScrollAxes::default(),
            damping: EdgeDamping::default(),
        }
    }
}

impl ScrollConfig {
    /// Tuning for a terminal, where one unit is a cell rather than a pixel
    pub fn terminal() -> Self {
        Self {
            buffer: 4.0,
            strength_multiplier: 2.0,
            throttle_ms: default_throttle_ms(),
            frame_interval_us: 33_000,
            axes: ScrollAxes::Vertical,
            damping: EdgeDamping {
                top: 1.0,
                bottom: 1.0,
                mobile_bottom: 3.0,
                strength: default_damping_strength(),
            },
        }
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        if self.frame_interval_us == 0 {
            DEFAULT_FRAME_INTERVAL
        } else {
            Duration::from_micros(self.frame_interval_us)
        }
    }

    /// Build monitor options from this configuration
    pub fn to_options(&self) -> crate::Result<Options> {
        if !self.buffer.is_finite() || self.buffer < 0.0 {
            return Err(crate::Error::InvalidOption(format!(
                "buffer must be a non-negative number, got {}",
                self.buffer
            )));
        }

        let options = Options::default()
            .with_horizontal_strength(create_horizontal_strength(self.buffer))
            .with_vertical_strength(create_vertical_strength(self.buffer))
            .with_strength_multiplier(self.strength_multiplier)
            .with_axes(self.axes)
            .with_damping(self.damping)
            .with_throttle(self.throttle());
        options.validate()?;
        Ok(options)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Event poll interval in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Number of rows in the demo list
    #[serde(default = "default_item_count")]
    pub item_count: usize,
    /// Mode flags handed to the monitor
    #[serde(default)]
    pub mode: UiMode,
    /// Autoscroll tuning in terminal cells
    #[serde(default = "ScrollConfig::terminal")]
    pub scroll: ScrollConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            item_count: default_item_count(),
            mode: UiMode::default(),
            scroll: ScrollConfig::terminal(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_buffer() -> f64 {
    DEFAULT_BUFFER
}

fn default_strength_multiplier() -> f64 {
    DEFAULT_STRENGTH_MULTIPLIER
}

fn default_throttle_ms() -> u64 {
    DEFAULT_THROTTLE.as_millis() as u64
}

fn default_frame_interval_us() -> u64 {
    DEFAULT_FRAME_INTERVAL.as_micros() as u64
}

fn default_damping_top() -> f64 {
    10.0
}

fn default_damping_bottom() -> f64 {
    10.0
}

fn default_damping_mobile_bottom() -> f64 {
    50.0
}

fn default_damping_strength() -> f64 {
    0.4
}

fn default_tick_rate() -> u64 {
    100
}

fn default_item_count() -> usize {
    200
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, defaults if it does not exist
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/dragscroll/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("dragscroll")
            .join("config.toml")
    }
}
