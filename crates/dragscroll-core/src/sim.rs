//! Headless host and drag replay
//!
//! [`SimHost`] keeps geometry, listeners and frames in memory and runs on a
//! [`ManualClock`], so a whole drag can be replayed deterministically.
//! [`Simulation`] wires a monitor to it, routes events like a browser would
//! (container listeners first, then body) and records a per-frame trace.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::event::{EventKind, EventTarget, InputEvent, Listener, ListenerRegistry};
use crate::frame::{FrameHandle, FrameScheduler, IntervalFrames, DEFAULT_FRAME_INTERVAL};
use crate::geometry::{ElementBound, Point, ScrollMetrics};
use crate::host::{ContainerKind, EventSource, Geometry, Host, UiMode};
use crate::monitor::{MonitorState, ScrollMonitor};
use crate::options::{create_scroll_monitor, Options};
use crate::timing::{Clock, ManualClock};

/// In-memory host with a single scroll container
#[derive(Debug, Clone)]
pub struct SimHost {
    clock: ManualClock,
    frames: IntervalFrames<ManualClock>,
    listeners: ListenerRegistry,
    mode: UiMode,
    container: ElementBound,
    metrics: ScrollMetrics,
    dragged: ElementBound,
    viewport_height: f64,
}

impl SimHost {
    /// A 500×500 container at the origin holding 1000px of content, in an
    /// 800px tall viewport, with a small dragged element well away from
    /// every edge
    pub fn new(clock: ManualClock) -> Self {
        Self::with_frame_interval(clock, DEFAULT_FRAME_INTERVAL)
    }

    pub fn with_frame_interval(clock: ManualClock, interval: Duration) -> Self {
        Self {
            frames: IntervalFrames::with_interval(clock.clone(), interval),
            clock,
            listeners: ListenerRegistry::new(),
            mode: UiMode::default(),
            container: ElementBound::new(0.0, 0.0, 500.0, 500.0),
            metrics: ScrollMetrics {
                scroll_top: 0.0,
                scroll_left: 0.0,
                scroll_height: 1000.0,
                scroll_width: 500.0,
                client_height: 500.0,
                client_width: 500.0,
            },
            dragged: ElementBound::new(200.0, 200.0, 100.0, 40.0),
            viewport_height: 800.0,
        }
    }

    pub fn with_container(mut self, bound: ElementBound) -> Self {
        self.container = bound;
        self
    }

    pub fn with_metrics(mut self, metrics: ScrollMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_dragged(mut self, bound: ElementBound) -> Self {
        self.dragged = bound;
        self
    }

    pub fn with_viewport_height(mut self, height: f64) -> Self {
        self.viewport_height = height;
        self
    }

    pub fn with_ui_mode(mut self, mode: UiMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn frames(&self) -> &IntervalFrames<ManualClock> {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut IntervalFrames<ManualClock> {
        &mut self.frames
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    pub fn set_dragged(&mut self, bound: ElementBound) {
        self.dragged = bound;
    }

    /// Listeners an event reaches, in delivery order
    pub fn route(&self, event: &InputEvent) -> Vec<Listener> {
        let over_container = event
            .client_coords()
            .is_some_and(|p| self.container.contains(p));
        self.listeners.route(event.kind(), over_container)
    }
}

impl EventSource for SimHost {
    fn add_listener(&mut self, target: EventTarget, kind: EventKind, listener: Listener) {
        self.listeners.add(target, kind, listener);
    }

    fn remove_listener(&mut self, target: EventTarget, kind: EventKind, listener: Listener) {
        self.listeners.remove(target, kind, listener);
    }
}

impl FrameScheduler for SimHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.frames.request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.cancel_frame(handle);
    }
}

impl Geometry for SimHost {
    fn container_bounds(&self, _container: ContainerKind) -> ElementBound {
        self.container
    }

    fn scroll_metrics(&self, _container: ContainerKind) -> ScrollMetrics {
        self.metrics
    }

    fn set_scroll_top(&mut self, _container: ContainerKind, top: f64) {
        self.metrics.scroll_top = top;
    }

    fn set_scroll_left(&mut self, _container: ContainerKind, left: f64) {
        self.metrics.scroll_left = left;
    }

    fn dragged_bounds(&self) -> ElementBound {
        self.dragged
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }
}

impl Clock for SimHost {
    fn now(&self) -> std::time::Instant {
        self.clock.now()
    }
}

impl Host for SimHost {
    fn ui_mode(&self) -> UiMode {
        self.mode
    }
}

/// Straight-line pointer movement
#[derive(Debug, Clone)]
pub struct DragPath {
    pub from: Point,
    pub to: Point,
    /// Time to travel from `from` to `to`
    pub duration: Duration,
    /// Gap between consecutive events
    pub event_interval: Duration,
    /// Time to keep the pointer still at `to` afterwards
    pub hold: Duration,
    pub kind: EventKind,
}

impl DragPath {
    /// Pointer positions and their offsets from the start of the path
    pub fn events(&self) -> Vec<(Duration, InputEvent)> {
        let step = self.event_interval.max(Duration::from_millis(1));
        let steps = (self.duration.as_secs_f64() / step.as_secs_f64()).floor() as u32;

        (0..=steps)
            .map(|i| {
                let at = step * i;
                let t = if self.duration.is_zero() {
                    1.0
                } else {
                    (at.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
                };
                let x = self.from.x + (self.to.x - self.from.x) * t;
                let y = self.from.y + (self.to.y - self.from.y) * t;
                let event = match self.kind {
                    EventKind::DragOver => InputEvent::drag_over(x, y),
                    EventKind::MouseMove => InputEvent::mouse_move(x, y),
                    EventKind::TouchMove => InputEvent::touch_move(x, y),
                };
                (at, event)
            })
            .collect()
    }
}

/// Host and monitor state after one delivered frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSample {
    pub t_ms: f64,
    pub scroll_top: f64,
    pub scroll_left: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub state: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Trace {
    pub samples: Vec<TraceSample>,
    /// Deltas passed to the scroll-change callback, in order
    pub changes: Vec<(f64, f64)>,
}

impl Trace {
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Sum of applied vertical deltas
    pub fn total_dy(&self) -> f64 {
        self.changes.iter().map(|(_, dy)| dy).sum()
    }

    /// Sum of applied horizontal deltas
    pub fn total_dx(&self) -> f64 {
        self.changes.iter().map(|(dx, _)| dx).sum()
    }
}

/// A monitor running against a [`SimHost`]
pub struct Simulation {
    monitor: ScrollMonitor<SimHost>,
    clock: ManualClock,
    changes: Rc<RefCell<Vec<(f64, f64)>>>,
    samples: Vec<TraceSample>,
    follow_size: Option<(f64, f64)>,
}

impl Simulation {
    pub fn new(host: SimHost, mut options: Options) -> crate::Result<Self> {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&changes);
        let mut user = std::mem::replace(&mut options.on_scroll_change, Box::new(|_, _| {}));
        options.on_scroll_change = Box::new(move |dx, dy| {
            log.borrow_mut().push((dx, dy));
            user(dx, dy);
        });

        let clock = host.clock().clone();
        let monitor = create_scroll_monitor(host, options)?;
        Ok(Self {
            monitor,
            clock,
            changes,
            samples: Vec::new(),
            follow_size: None,
        })
    }

    /// Make the dragged element a `w`×`h` box centred on the pointer
    pub fn follow_pointer(mut self, w: f64, h: f64) -> Self {
        self.follow_size = Some((w, h));
        self
    }

    pub fn monitor(&self) -> &ScrollMonitor<SimHost> {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut ScrollMonitor<SimHost> {
        &mut self.monitor
    }

    pub fn host(&self) -> &SimHost {
        self.monitor.host()
    }

    pub fn start(&mut self) {
        self.monitor.start();
    }

    pub fn stop(&mut self) {
        self.monitor.stop();
    }

    /// Deliver `event` to every listener it reaches
    pub fn dispatch(&mut self, event: &InputEvent) {
        if let (Some((w, h)), Some(p)) = (self.follow_size, event.client_coords()) {
            self.monitor
                .host_mut()
                .set_dragged(ElementBound::new(p.x - w / 2.0, p.y - h / 2.0, w, h));
        }
        for listener in self.monitor.host().route(event) {
            self.monitor.handle_event(listener, event);
        }
    }

    /// Let `by` pass, delivering frames as they fall due
    pub fn advance(&mut self, by: Duration) {
        let interval = self.host().frames().interval().max(Duration::from_micros(1));
        let mut remaining = by;
        while !remaining.is_zero() {
            let step = remaining.min(interval);
            self.clock.advance(step);
            remaining -= step;
            self.pump_frames();
        }
    }

    /// Deliver every due frame; returns how many were delivered
    pub fn pump_frames(&mut self) -> usize {
        let due = self.monitor.host_mut().frames_mut().take_due();
        let delivered = due.len();
        for handle in due {
            self.monitor.on_frame(handle);
            self.record();
        }
        delivered
    }

    /// Replay `path`, then hold the pointer for `path.hold`
    pub fn run_path(&mut self, path: &DragPath) {
        let mut elapsed = Duration::ZERO;
        for (at, event) in path.events() {
            self.advance(at.saturating_sub(elapsed));
            elapsed = at;
            self.dispatch(&event);
        }
        self.advance(path.hold);
        debug!(
            frames = self.samples.len(),
            scroll_top = self.host().metrics().scroll_top,
            "Drag replay finished"
        );
    }

    pub fn trace(&self) -> Trace {
        Trace {
            samples: self.samples.clone(),
            changes: self.changes.borrow().clone(),
        }
    }

    fn record(&mut self) {
        let metrics = self.host().metrics();
        let scale = self.monitor.scale();
        let state = match self.monitor.state() {
            MonitorState::Idle => "idle",
            MonitorState::Sampling => "sampling",
            MonitorState::Scrolling { .. } => "scrolling",
        };
        self.samples.push(TraceSample {
            t_ms: self.clock.elapsed().as_secs_f64() * 1000.0,
            scroll_top: metrics.scroll_top,
            scroll_left: metrics.scroll_left,
            scale_x: scale.x,
            scale_y: scale.y,
            state,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrollAxes;

    fn path(from: Point, to: Point) -> DragPath {
        DragPath {
            from,
            to,
            duration: Duration::from_millis(300),
            event_interval: Duration::from_millis(16),
            hold: Duration::from_millis(500),
            kind: EventKind::MouseMove,
        }
    }

    #[test]
    fn test_path_events_span_duration() {
        let p = path(Point::new(0.0, 0.0), Point::new(100.0, 300.0));
        let events = p.events();
        assert_eq!(events.len(), 19);
        assert_eq!(events[0].0, Duration::ZERO);
        assert_eq!(events[0].1.client_coords(), Some(Point::new(0.0, 0.0)));
        let (last_at, _) = events.last().unwrap();
        assert!(*last_at <= p.duration);
    }

    #[test]
    fn test_drag_to_bottom_edge_scrolls_down_and_stays_in_range() {
        let host = SimHost::new(ManualClock::new());
        let mut sim = Simulation::new(host, Options::default()).unwrap();
        sim.start();
        sim.run_path(&path(Point::new(250.0, 250.0), Point::new(250.0, 495.0)));

        let trace = sim.trace();
        let top = sim.host().metrics().scroll_top;
        assert!(top > 0.0);
        assert!(top <= 500.0);
        assert_eq!(trace.total_dy(), top);
        assert_eq!(trace.total_dx(), 0.0);
        assert!(trace.samples.iter().any(|s| s.state == "scrolling"));
    }

    #[test]
    fn test_right_edge_scrolls_horizontally_only_when_enabled() {
        let metrics = ScrollMetrics {
            scroll_width: 1200.0,
            client_width: 500.0,
            ..SimHost::new(ManualClock::new()).metrics()
        };

        let mut vertical = Simulation::new(
            SimHost::new(ManualClock::new()).with_metrics(metrics),
            Options::default(),
        )
        .unwrap();
        vertical.start();
        vertical.run_path(&path(Point::new(250.0, 250.0), Point::new(500.0, 250.0)));
        assert_eq!(vertical.host().metrics().scroll_left, 0.0);
        assert_eq!(vertical.host().metrics().scroll_top, 0.0);

        let mut both = Simulation::new(
            SimHost::new(ManualClock::new()).with_metrics(metrics),
            Options::default().with_axes(ScrollAxes::Both),
        )
        .unwrap();
        both.start();
        both.run_path(&path(Point::new(250.0, 250.0), Point::new(500.0, 250.0)));
        assert!(both.host().metrics().scroll_left > 0.0);
        assert_eq!(both.host().metrics().scroll_top, 0.0);
        assert_eq!(both.trace().total_dx(), both.host().metrics().scroll_left);
    }

    #[test]
    fn test_trace_serializes_to_json() {
        let host = SimHost::new(ManualClock::new());
        let mut sim = Simulation::new(host, Options::default()).unwrap();
        sim.start();
        sim.run_path(&path(Point::new(250.0, 250.0), Point::new(250.0, 10.0)));

        let json = sim.trace().to_json().unwrap();
        assert!(json.contains("\"samples\""));
        assert!(json.contains("\"scroll_top\""));
    }

    #[test]
    fn test_user_callback_still_runs() {
        let seen = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&seen);
        let options = Options::default().on_scroll_change(move |_, _| *counter.borrow_mut() += 1);

        let mut sim = Simulation::new(SimHost::new(ManualClock::new()), options).unwrap();
        sim.start();
        sim.run_path(&path(Point::new(250.0, 250.0), Point::new(250.0, 500.0)));

        assert!(*seen.borrow() > 0);
        assert_eq!(*seen.borrow(), sim.trace().changes.len());
    }
}
