//! Capabilities a monitor needs from its environment.
//!
//! A host supplies listener registration, frame scheduling, geometry and a
//! clock. The monitor calls into the host; the host calls back into the
//! monitor through [`ScrollMonitor::handle_event`] and
//! [`ScrollMonitor::on_frame`].
//!
//! [`ScrollMonitor::handle_event`]: crate::monitor::ScrollMonitor::handle_event
//! [`ScrollMonitor::on_frame`]: crate::monitor::ScrollMonitor::on_frame

use serde::{Deserialize, Serialize};

use crate::event::{EventKind, EventTarget, Listener};
use crate::frame::FrameScheduler;
use crate::geometry::{ElementBound, ScrollMetrics};
use crate::timing::Clock;

/// Which element scrolls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// The nearest scrollable ancestor of the dragged element
    ScrollAncestor,
    /// The document's root scrolling element
    DocumentRoot,
}

/// UI mode flags read once when a monitor is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiMode {
    #[serde(default)]
    pub mobile_mode: bool,
    #[serde(default)]
    pub mobile_view: bool,
}

impl UiMode {
    /// The scrollable ancestor is used only in mobile mode with the desktop
    /// view; every other combination scrolls the document root.
    pub fn container_kind(&self) -> ContainerKind {
        if self.mobile_mode && !self.mobile_view {
            ContainerKind::ScrollAncestor
        } else {
            ContainerKind::DocumentRoot
        }
    }
}

/// Listener registration
pub trait EventSource {
    fn add_listener(&mut self, target: EventTarget, kind: EventKind, listener: Listener);
    fn remove_listener(&mut self, target: EventTarget, kind: EventKind, listener: Listener);
}

/// Layout and scroll queries; all rectangles are viewport-relative
pub trait Geometry {
    fn container_bounds(&self, container: ContainerKind) -> ElementBound;
    fn scroll_metrics(&self, container: ContainerKind) -> ScrollMetrics;
    fn set_scroll_top(&mut self, container: ContainerKind, top: f64);
    fn set_scroll_left(&mut self, container: ContainerKind, left: f64);
    /// Bounds of the element being dragged
    fn dragged_bounds(&self) -> ElementBound;
    fn viewport_height(&self) -> f64;
}

/// Everything a [`ScrollMonitor`](crate::monitor::ScrollMonitor) runs against
pub trait Host: EventSource + FrameScheduler + Geometry + Clock {
    fn ui_mode(&self) -> UiMode {
        UiMode::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_kind_selection() {
        let cases = [
            (false, false, ContainerKind::DocumentRoot),
            (false, true, ContainerKind::DocumentRoot),
            (true, false, ContainerKind::ScrollAncestor),
            (true, true, ContainerKind::DocumentRoot),
        ];
        for (mobile_mode, mobile_view, expected) in cases {
            let mode = UiMode {
                mobile_mode,
                mobile_view,
            };
            assert_eq!(mode.container_kind(), expected, "{:?}", mode);
        }
    }
}
