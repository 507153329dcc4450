//! L3 Molecular Layer: Scroll monitor
//!
//! Binds one dragged element to one scroll container. Pointer events are
//! sampled through a leading-edge throttle into a pair of strengths, and a
//! frame loop turns those strengths into scroll position changes until they
//! drop to zero.
//!
//! ```text
//!            first coarse event             sample, no loop running
//!   Idle ───────────────────────▶ Sampling ─────────────────────────▶ Scrolling
//!    ▲                                                                    │
//!    └──────────── tick sees zero strength or zero multiplier ───────────┘
//!                      (stop() returns any state to Idle)
//! ```

use tracing::{debug, trace, warn};

use crate::config::ScrollAxes;
use crate::event::{EventKind, EventTarget, InputEvent, Listener};
use crate::frame::FrameHandle;
use crate::geometry::int_between;
use crate::host::{ContainerKind, Host};
use crate::options::Options;
use crate::throttle::Throttle;

/// Where the monitor is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No dense listener, no frame outstanding
    Idle,
    /// Dense listener attached, no frame outstanding
    Sampling,
    /// Dense listener attached and exactly one frame outstanding
    Scrolling {
        frame: FrameHandle,
        /// Ticks already run in this loop
        ticks: u64,
    },
}

/// Current signed strengths
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    pub const ZERO: Scale = Scale { x: 0.0, y: 0.0 };
}

const DENSE_KINDS: [EventKind; 3] = EventKind::ALL;

pub struct ScrollMonitor<H> {
    host: H,
    options: Options,
    container: ContainerKind,
    mobile_view: bool,
    state: MonitorState,
    scale: Scale,
    throttle: Throttle,
    /// `start()` calls since the last `stop()`
    starts: usize,
}

impl<H: Host> ScrollMonitor<H> {
    /// Create a monitor; prefer [`create_scroll_monitor`](crate::create_scroll_monitor),
    /// which validates `options` first.
    pub fn new(host: H, options: Options) -> Self {
        let mode = host.ui_mode();
        let container = mode.container_kind();
        let throttle = Throttle::new(options.throttle);
        debug!(?container, mobile_view = mode.mobile_view, "Scroll monitor created");
        Self {
            host,
            options,
            container,
            mobile_view: mode.mobile_view,
            state: MonitorState::Idle,
            scale: Scale::ZERO,
            throttle,
            starts: 0,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Whether `start()` listeners are registered
    pub fn is_listening(&self) -> bool {
        self.starts > 0
    }

    /// Whether the dense listener is registered
    #[inline]
    pub fn is_attached(&self) -> bool {
        !matches!(self.state, MonitorState::Idle)
    }

    #[inline]
    pub fn is_scrolling(&self) -> bool {
        matches!(self.state, MonitorState::Scrolling { .. })
    }

    /// The outstanding frame request, if a loop is running
    pub fn frame(&self) -> Option<FrameHandle> {
        match self.state {
            MonitorState::Scrolling { frame, .. } => Some(frame),
            _ => None,
        }
    }

    pub fn container(&self) -> ContainerKind {
        self.container
    }

    pub fn mobile_view(&self) -> bool {
        self.mobile_view
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Begin watching for drags
    ///
    /// Registers drag-over on the container and touch/mouse move on the
    /// body, since move events during a drag do not reliably reach sibling
    /// elements. Not idempotent: each call registers again, and the next
    /// `stop()` removes every registration made since the previous one.
    pub fn start(&mut self) {
        if self.is_listening() {
            warn!("Scroll monitor started twice; listeners are now registered twice");
        }
        let container = EventTarget::Container(self.container);
        self.host
            .add_listener(container, EventKind::DragOver, Listener::Coarse);
        self.host
            .add_listener(EventTarget::Body, EventKind::TouchMove, Listener::Coarse);
        self.host
            .add_listener(EventTarget::Body, EventKind::MouseMove, Listener::Coarse);
        self.starts += 1;
        debug!(container = ?self.container, "Scroll monitor started");
    }

    /// Tear down every listener and any running loop. Safe to call at any time.
    pub fn stop(&mut self) {
        if self.is_listening() {
            let container = EventTarget::Container(self.container);
            for _ in 0..self.starts {
                self.host
                    .remove_listener(container, EventKind::DragOver, Listener::Coarse);
                self.host
                    .remove_listener(EventTarget::Body, EventKind::TouchMove, Listener::Coarse);
                self.host
                    .remove_listener(EventTarget::Body, EventKind::MouseMove, Listener::Coarse);
            }
            self.starts = 0;
            debug!("Scroll monitor stopped");
        }
        self.stop_scrolling();
        self.throttle.reset();
    }

    /// Deliver an event the host routed to one of this monitor's listeners
    pub fn handle_event(&mut self, listener: Listener, event: &InputEvent) {
        match listener {
            Listener::Coarse => {
                if !self.is_listening() {
                    trace!("Coarse event while stopped ignored");
                } else if !self.is_attached() {
                    self.attach();
                    self.update_scrolling(event);
                }
            }
            Listener::Dense => {
                if self.is_attached() {
                    self.update_scrolling(event);
                } else {
                    trace!("Dense event after detach ignored");
                }
            }
        }
    }

    /// Run one tick for a frame the host delivered
    ///
    /// Frames other than the outstanding one (for instance one cancelled by
    /// `stop()` that the host still fired) are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle) {
        match self.state {
            MonitorState::Scrolling { frame, ticks } if frame == handle => self.run_tick(ticks),
            _ => trace!(frame = handle.raw(), "Stale frame ignored"),
        }
    }

    fn attach(&mut self) {
        for kind in DENSE_KINDS {
            self.host.add_listener(EventTarget::Body, kind, Listener::Dense);
        }
        self.state = MonitorState::Sampling;
        debug!("Dense listener attached");
    }

    fn detach(&mut self) {
        for kind in DENSE_KINDS {
            self.host
                .remove_listener(EventTarget::Body, kind, Listener::Dense);
        }
        debug!("Dense listener detached");
    }

    /// Recompute strengths from `event`, at most once per throttle window
    fn update_scrolling(&mut self, event: &InputEvent) {
        if !self.throttle.try_acquire(self.host.now()) {
            trace!(kind = ?event.kind(), "Sample dropped by throttle");
            return;
        }
        let Some(point) = event.client_coords() else {
            trace!(kind = ?event.kind(), "Event without coordinates ignored");
            return;
        };

        let bound = self.host.container_bounds(self.container);
        self.scale = Scale {
            x: self.options.horizontal_strength.strength(&bound, point),
            y: self.options.vertical_strength.strength(&bound, point),
        };
        trace!(x = point.x, y = point.y, scale_x = self.scale.x, scale_y = self.scale.y, "Sampled");

        if !self.is_scrolling() {
            self.start_scrolling();
        }
    }

    fn start_scrolling(&mut self) {
        debug!(scale_x = self.scale.x, scale_y = self.scale.y, "Scroll loop starting");
        self.run_tick(0);
    }

    /// Run tick number `index` and either schedule the next one or stop
    fn run_tick(&mut self, index: u64) {
        if self.tick(index) {
            let frame = self.host.request_frame();
            self.state = MonitorState::Scrolling {
                frame,
                ticks: index + 1,
            };
        } else {
            self.stop_scrolling();
        }
    }

    /// One step of the loop; returns whether the loop should continue
    ///
    /// Edge damping overrides the sampled vertical strength before the
    /// write, so the damped strength already moves the container on the
    /// tick that applies it.
    fn tick(&mut self, index: u64) -> bool {
        let before = self.host.scroll_metrics(self.container);
        let multiplier = self.options.strength_multiplier;
        let damping = self.options.damping;

        let element = self.host.dragged_bounds();
        let at_top = element.top() < damping.top;
        let at_bottom = self.host.viewport_height() - element.bottom()
            < damping.bottom_threshold(self.mobile_view);
        if (self.scale.y == 0.0 && at_top) || at_bottom {
            self.scale.y = damping.strength * if at_top { -1.0 } else { 1.0 };
        }

        if multiplier == 0.0 || self.scale.x + self.scale.y == 0.0 {
            debug!(index, "Nothing to scroll, loop stopping");
            return false;
        }

        // Some engines drop move events from a container that scrolled in
        // the same frame, so the position only changes on every other tick.
        if index % 2 == 1 {
            let new_top = int_between(
                0.0,
                before.max_scroll_top(),
                before.scroll_top + self.scale.y * multiplier,
            );
            self.host.set_scroll_top(self.container, new_top);
            let dy = new_top - before.scroll_top;

            let dx = match self.options.axes {
                ScrollAxes::Vertical => 0.0,
                ScrollAxes::Both => {
                    let new_left = int_between(
                        0.0,
                        before.max_scroll_left(),
                        before.scroll_left + self.scale.x * multiplier,
                    );
                    self.host.set_scroll_left(self.container, new_left);
                    new_left - before.scroll_left
                }
            };

            trace!(index, dx, dy, "Scrolled");
            (self.options.on_scroll_change)(dx, dy);
        }

        true
    }

    fn stop_scrolling(&mut self) {
        if self.is_attached() {
            self.detach();
        }
        self.scale = Scale::ZERO;
        if let MonitorState::Scrolling { frame, .. } = self.state {
            self.host.cancel_frame(frame);
        }
        self.state = MonitorState::Idle;
    }
}

impl<H> std::fmt::Debug for ScrollMonitor<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollMonitor")
            .field("container", &self.container)
            .field("mobile_view", &self.mobile_view)
            .field("state", &self.state)
            .field("scale", &self.scale)
            .field("starts", &self.starts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::geometry::{ElementBound, ScrollMetrics};
    use crate::host::UiMode;
    use crate::sim::SimHost;
    use crate::timing::ManualClock;

    const FRAME: Duration = crate::frame::DEFAULT_FRAME_INTERVAL;
    const BODY: EventTarget = EventTarget::Body;
    const ROOT: EventTarget = EventTarget::Container(ContainerKind::DocumentRoot);

    fn monitor(host: SimHost, options: Options) -> ScrollMonitor<SimHost> {
        crate::create_scroll_monitor(host, options).unwrap()
    }

    fn dispatch(monitor: &mut ScrollMonitor<SimHost>, event: InputEvent) {
        for listener in monitor.host().route(&event) {
            monitor.handle_event(listener, &event);
        }
    }

    /// Advance one frame interval and deliver whatever fell due
    fn next_frame(clock: &ManualClock, monitor: &mut ScrollMonitor<SimHost>) {
        clock.advance(FRAME);
        for handle in monitor.host_mut().frames_mut().take_due() {
            monitor.on_frame(handle);
        }
    }

    fn scroll_top(monitor: &ScrollMonitor<SimHost>) -> f64 {
        monitor.host().metrics().scroll_top
    }

    #[test]
    fn test_start_and_stop_listeners() {
        let mut m = monitor(SimHost::new(ManualClock::new()), Options::default());
        m.start();

        let listeners = m.host().listeners();
        assert_eq!(listeners.len(), 3);
        assert!(listeners.contains(ROOT, EventKind::DragOver, Listener::Coarse));
        assert!(listeners.contains(BODY, EventKind::TouchMove, Listener::Coarse));
        assert!(listeners.contains(BODY, EventKind::MouseMove, Listener::Coarse));
        assert!(m.is_listening());

        m.stop();
        assert!(m.host().listeners().is_empty());
        assert!(!m.is_listening());
        assert_eq!(m.state(), MonitorState::Idle);
    }

    #[test]
    fn test_stop_after_double_start_removes_everything() {
        let mut m = monitor(SimHost::new(ManualClock::new()), Options::default());
        m.start();
        m.start();
        assert_eq!(m.host().listeners().count(BODY, EventKind::MouseMove, Listener::Coarse), 2);

        m.stop();
        assert!(m.host().listeners().is_empty());
        assert!(!m.is_listening());
        assert_eq!(m.state(), MonitorState::Idle);

        // a host that still holds a stale registration must not revive the loop
        m.handle_event(Listener::Coarse, &InputEvent::mouse_move(250.0, 495.0));
        assert_eq!(m.state(), MonitorState::Idle);
        assert!(m.host().listeners().is_empty());
        assert_eq!(m.host().frames().pending(), 0);
    }

    #[test]
    fn test_coarse_event_before_start_ignored() {
        let mut m = monitor(SimHost::new(ManualClock::new()), Options::default());
        m.handle_event(Listener::Coarse, &InputEvent::mouse_move(250.0, 495.0));
        assert_eq!(m.state(), MonitorState::Idle);
        assert_eq!(m.scale(), Scale::ZERO);
        assert!(m.host().listeners().is_empty());
    }

    #[test]
    fn test_stop_when_idle() {
        let mut m = monitor(SimHost::new(ManualClock::new()), Options::default());
        m.stop();
        m.stop();
        assert_eq!(m.state(), MonitorState::Idle);
        assert!(m.host().listeners().is_empty());
        assert_eq!(m.host().frames().pending(), 0);
    }

    #[test]
    fn test_mobile_mode_uses_scroll_ancestor() {
        let mode = UiMode {
            mobile_mode: true,
            mobile_view: false,
        };
        let mut m = monitor(
            SimHost::new(ManualClock::new()).with_ui_mode(mode),
            Options::default(),
        );
        assert_eq!(m.container(), ContainerKind::ScrollAncestor);

        m.start();
        let target = EventTarget::Container(ContainerKind::ScrollAncestor);
        assert!(m.host().listeners().contains(target, EventKind::DragOver, Listener::Coarse));
    }

    #[test]
    fn test_first_event_attaches_and_starts_loop() {
        let mut m = monitor(SimHost::new(ManualClock::new()), Options::default());
        m.start();
        dispatch(&mut m, InputEvent::mouse_move(250.0, 425.0));

        assert_eq!(m.scale(), Scale { x: 0.0, y: 0.5 });
        assert!(matches!(m.state(), MonitorState::Scrolling { ticks: 1, .. }));
        assert_eq!(m.host().listeners().count_listener(Listener::Dense), 3);
        assert_eq!(m.host().frames().pending(), 1);
        // tick 0 never writes
        assert_eq!(scroll_top(&m), 0.0);
    }

    #[test]
    fn test_position_changes_on_odd_ticks_only() {
        let clock = ManualClock::new();
        let mut m = monitor(SimHost::new(clock.clone()), Options::default());
        m.start();
        dispatch(&mut m, InputEvent::mouse_move(250.0, 425.0));

        next_frame(&clock, &mut m);
        assert_eq!(scroll_top(&m), 15.0);
        next_frame(&clock, &mut m);
        assert_eq!(scroll_top(&m), 15.0);
        next_frame(&clock, &mut m);
        assert_eq!(scroll_top(&m), 30.0);
        assert!(matches!(m.state(), MonitorState::Scrolling { ticks: 4, .. }));
    }

    #[test]
    fn test_zero_multiplier_stops_on_first_tick() {
        let mut m = monitor(
            SimHost::new(ManualClock::new()),
            Options::default().with_strength_multiplier(0.0),
        );
        m.start();
        dispatch(&mut m, InputEvent::mouse_move(250.0, 495.0));

        assert_eq!(m.state(), MonitorState::Idle);
        assert_eq!(m.host().frames().pending(), 0);
        assert_eq!(m.host().listeners().count_listener(Listener::Dense), 0);
        assert_eq!(scroll_top(&m), 0.0);
    }

    #[test]
    fn test_reported_delta_is_clamped() {
        let clock = ManualClock::new();
        let metrics = ScrollMetrics {
            scroll_top: 490.0,
            ..SimHost::new(clock.clone()).metrics()
        };
        let changes = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&changes);
        let options = Options::default().on_scroll_change(move |dx, dy| log.borrow_mut().push((dx, dy)));

        let mut m = monitor(SimHost::new(clock.clone()).with_metrics(metrics), options);
        m.start();
        dispatch(&mut m, InputEvent::mouse_move(250.0, 425.0));
        next_frame(&clock, &mut m);

        assert_eq!(scroll_top(&m), 500.0);
        assert_eq!(*changes.borrow(), vec![(0.0, 10.0)]);
    }

    #[test]
    fn test_loop_stops_when_pointer_leaves_edge() {
        let clock = ManualClock::new();
        let mut m = monitor(SimHost::new(clock.clone()), Options::default());
        m.start();
        dispatch(&mut m, InputEvent::mouse_move(250.0, 425.0));
        for _ in 0..13 {
            next_frame(&clock, &mut m);
        }
        assert!(m.is_scrolling());

        dispatch(&mut m, InputEvent::mouse_move(250.0, 250.0));
        assert_eq!(m.scale(), Scale::ZERO);
        next_frame(&clock, &mut m);

        assert_eq!(m.state(), MonitorState::Idle);
        assert_eq!(m.host().listeners().count_listener(Listener::Dense), 0);
        assert_eq!(m.host().listeners().count_listener(Listener::Coarse), 3);
        assert_eq!(m.host().frames().pending(), 0);
    }

    #[test]
    fn test_samples_inside_throttle_window_dropped() {
        let clock = ManualClock::new();
        let mut m = monitor(SimHost::new(clock.clone()), Options::default());
        m.start();
        dispatch(&mut m, InputEvent::mouse_move(250.0, 425.0));

        clock.advance(Duration::from_millis(50));
        dispatch(&mut m, InputEvent::mouse_move(250.0, 250.0));
        assert_eq!(m.scale().y, 0.5);

        clock.advance(Duration::from_millis(60));
        dispatch(&mut m, InputEvent::mouse_move(250.0, 250.0));
        assert_eq!(m.scale().y, 0.0);
    }

    #[test]
    fn test_stale_frame_ignored() {
        let clock = ManualClock::new();
        let mut m = monitor(SimHost::new(clock.clone()), Options::default());
        m.start();
        dispatch(&mut m, InputEvent::mouse_move(250.0, 425.0));
        let frame = m.frame().unwrap();

        m.on_frame(FrameHandle::from_raw(frame.raw() + 100));
        assert!(matches!(m.state(), MonitorState::Scrolling { ticks: 1, .. }));

        m.stop();
        m.on_frame(frame);
        assert_eq!(m.state(), MonitorState::Idle);
        assert_eq!(scroll_top(&m), 0.0);
        assert_eq!(m.host().frames().pending(), 0);
    }

    #[test]
    fn test_dense_event_while_detached_ignored() {
        let mut m = monitor(SimHost::new(ManualClock::new()), Options::default());
        m.start();
        m.handle_event(Listener::Dense, &InputEvent::mouse_move(250.0, 495.0));
        assert_eq!(m.state(), MonitorState::Idle);
        assert_eq!(m.scale(), Scale::ZERO);
    }

    #[test]
    fn test_drag_over_outside_container_not_delivered() {
        let mut m = monitor(SimHost::new(ManualClock::new()), Options::default());
        m.start();

        dispatch(&mut m, InputEvent::drag_over(700.0, 250.0));
        assert_eq!(m.state(), MonitorState::Idle);

        dispatch(&mut m, InputEvent::drag_over(250.0, 495.0));
        assert!(m.is_scrolling());
    }

    #[test]
    fn test_touch_without_position_ignored() {
        let mut m = monitor(SimHost::new(ManualClock::new()), Options::default());
        m.start();
        dispatch(
            &mut m,
            InputEvent::TouchMove {
                changed_touches: Vec::new(),
            },
        );
        assert_eq!(m.state(), MonitorState::Sampling);
        assert_eq!(m.scale(), Scale::ZERO);
        assert_eq!(m.host().frames().pending(), 0);
    }

    #[test]
    fn test_element_at_top_forces_upward_scroll() {
        let clock = ManualClock::new();
        let metrics = ScrollMetrics {
            scroll_top: 100.0,
            ..SimHost::new(clock.clone()).metrics()
        };
        let host = SimHost::new(clock.clone())
            .with_metrics(metrics)
            .with_dragged(ElementBound::new(200.0, 5.0, 100.0, 40.0));
        let mut m = monitor(host, Options::default());
        m.start();
        dispatch(&mut m, InputEvent::mouse_move(250.0, 250.0));

        assert_eq!(m.scale().y, -0.4);
        assert!(m.is_scrolling());
        next_frame(&clock, &mut m);
        assert!(scroll_top(&m) < 100.0);
    }

    #[test]
    fn test_bottom_damping_overrides_sampled_strength() {
        let clock = ManualClock::new();
        // element bottom sits 5px above the viewport bottom
        let host = SimHost::new(clock.clone())
            .with_dragged(ElementBound::new(200.0, 770.0, 100.0, 25.0));
        let mut m = monitor(host, Options::default());
        m.start();
        // pointer near the container top samples an upward strength
        dispatch(&mut m, InputEvent::mouse_move(250.0, 50.0));

        assert_eq!(m.scale().y, 0.4);
        assert!(m.is_scrolling());
        next_frame(&clock, &mut m);
        assert_eq!(scroll_top(&m), 12.0);
    }

    #[test]
    fn test_element_at_both_edges_scrolls_up() {
        let clock = ManualClock::new();
        let metrics = ScrollMetrics {
            scroll_top: 100.0,
            ..SimHost::new(clock.clone()).metrics()
        };
        let host = SimHost::new(clock.clone())
            .with_metrics(metrics)
            .with_dragged(ElementBound::new(200.0, 5.0, 100.0, 790.0));
        let mut m = monitor(host, Options::default());
        m.start();
        dispatch(&mut m, InputEvent::mouse_move(250.0, 250.0));

        assert_eq!(m.scale().y, -0.4);
        next_frame(&clock, &mut m);
        assert_eq!(scroll_top(&m), 88.0);
    }

    #[test]
    fn test_bottom_threshold_depends_on_view() {
        // element bottom sits 30px above the viewport bottom
        let dragged = ElementBound::new(200.0, 730.0, 100.0, 40.0);

        let mut desktop = monitor(
            SimHost::new(ManualClock::new()).with_dragged(dragged),
            Options::default(),
        );
        desktop.start();
        dispatch(&mut desktop, InputEvent::mouse_move(250.0, 250.0));
        assert_eq!(desktop.state(), MonitorState::Idle);

        let mobile = UiMode {
            mobile_mode: false,
            mobile_view: true,
        };
        let mut phone = monitor(
            SimHost::new(ManualClock::new())
                .with_dragged(dragged)
                .with_ui_mode(mobile),
            Options::default(),
        );
        phone.start();
        dispatch(&mut phone, InputEvent::mouse_move(250.0, 250.0));
        assert_eq!(phone.scale().y, 0.4);
        assert!(phone.is_scrolling());
    }

    #[test]
    fn test_stop_resets_throttle() {
        let clock = ManualClock::new();
        let mut m = monitor(SimHost::new(clock.clone()), Options::default());
        m.start();
        dispatch(&mut m, InputEvent::mouse_move(250.0, 425.0));
        m.stop();

        m.start();
        dispatch(&mut m, InputEvent::mouse_move(250.0, 475.0));
        assert!(m.is_scrolling());
        assert!(m.scale().y > 0.5);
    }
}
