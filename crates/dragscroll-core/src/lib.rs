pub mod config;
pub mod error;
pub mod event;
pub mod frame;
pub mod geometry;
pub mod host;
pub mod monitor;
pub mod options;
pub mod sim;
pub mod strength;
pub mod throttle;
pub mod timing;

pub use config::{AppConfig, EdgeDamping, ScrollAxes, ScrollConfig};
pub use error::{Error, Result};
pub use event::{EventKind, EventTarget, InputEvent, Listener, ListenerRegistry};
pub use frame::{FrameHandle, FrameScheduler, IntervalFrames};
pub use geometry::{int_between, ElementBound, Point, ScrollMetrics};
pub use host::{ContainerKind, EventSource, Geometry, Host, UiMode};
pub use monitor::{MonitorState, Scale, ScrollMonitor};
pub use options::{create_scroll_monitor, Options};
pub use strength::{
    create_horizontal_strength, create_vertical_strength, default_horizontal_strength,
    default_vertical_strength, EdgeStrength, StrengthFunction,
};
pub use timing::{Clock, ManualClock, SystemClock};
