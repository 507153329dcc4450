//! Terminal host for the scroll monitor
//!
//! One terminal cell is one unit of length. The container is the inner area
//! of the list widget, the scrollable content is one row per item, and the
//! dragged element is the row under the pointer. Frames come from
//! [`IntervalFrames`] and are pumped by the event loop.

use std::time::{Duration, Instant};

use dragscroll_core::{
    Clock, ContainerKind, ElementBound, EventKind, EventSource, EventTarget, FrameHandle,
    FrameScheduler, Geometry, Host, InputEvent, IntervalFrames, Listener, ListenerRegistry, Point,
    ScrollMetrics, SystemClock, UiMode,
};
use ratatui::layout::Rect;
use tracing::trace;

pub struct TerminalHost<C = SystemClock> {
    clock: C,
    frames: IntervalFrames<C>,
    listeners: ListenerRegistry,
    mode: UiMode,
    viewport: Rect,
    screen_height: u16,
    item_count: usize,
    scroll_top: f64,
    pointer: Option<(u16, u16)>,
}

/// Centre of a terminal cell, so the first and last rows sit half a cell
/// inside the container edges
#[inline]
pub fn cell_center(column: u16, row: u16) -> Point {
    Point::new(column as f64 + 0.5, row as f64 + 0.5)
}

impl<C: Clock + Clone> TerminalHost<C> {
    pub fn new(clock: C, frame_interval: Duration, mode: UiMode) -> Self {
        Self {
            frames: IntervalFrames::with_interval(clock.clone(), frame_interval),
            clock,
            listeners: ListenerRegistry::new(),
            mode,
            viewport: Rect::default(),
            screen_height: 0,
            item_count: 0,
            scroll_top: 0.0,
            pointer: None,
        }
    }

    /// Area the list rows are drawn in
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect, screen_height: u16) {
        self.viewport = viewport;
        self.screen_height = screen_height;
        self.clamp_scroll();
    }

    pub fn set_item_count(&mut self, count: usize) {
        self.item_count = count;
        self.clamp_scroll();
    }

    pub fn pointer(&self) -> Option<(u16, u16)> {
        self.pointer
    }

    pub fn set_pointer(&mut self, pointer: Option<(u16, u16)>) {
        self.pointer = pointer;
    }

    /// Index of the first visible item
    pub fn offset(&self) -> usize {
        self.scroll_top.max(0.0) as usize
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.scroll_top = offset as f64;
        self.clamp_scroll();
    }

    pub fn max_offset(&self) -> usize {
        self.item_count.saturating_sub(self.viewport.height as usize)
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn frames_mut(&mut self) -> &mut IntervalFrames<C> {
        &mut self.frames
    }

    pub fn next_frame_due(&self) -> Option<Instant> {
        self.frames.next_due()
    }

    /// Listeners an event reaches, container first
    pub fn route(&self, event: &InputEvent) -> Vec<Listener> {
        let over_list = event
            .client_coords()
            .is_some_and(|p| self.container_bounds(self.mode.container_kind()).contains(p));
        self.listeners.route(event.kind(), over_list)
    }

    fn clamp_scroll(&mut self) {
        self.scroll_top = self.scroll_top.clamp(0.0, self.max_offset() as f64);
    }
}

impl<C: Clock + Clone> EventSource for TerminalHost<C> {
    fn add_listener(&mut self, target: EventTarget, kind: EventKind, listener: Listener) {
        self.listeners.add(target, kind, listener);
    }

    fn remove_listener(&mut self, target: EventTarget, kind: EventKind, listener: Listener) {
        self.listeners.remove(target, kind, listener);
    }
}

impl<C: Clock + Clone> FrameScheduler for TerminalHost<C> {
    fn request_frame(&mut self) -> FrameHandle {
        self.frames.request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.cancel_frame(handle);
    }
}

impl<C: Clock + Clone> Geometry for TerminalHost<C> {
    fn container_bounds(&self, _container: ContainerKind) -> ElementBound {
        let area = self.viewport;
        ElementBound::new(
            area.x as f64,
            area.y as f64,
            area.width as f64,
            area.height as f64,
        )
    }

    fn scroll_metrics(&self, _container: ContainerKind) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: self.scroll_top,
            scroll_left: 0.0,
            scroll_height: self.item_count as f64,
            scroll_width: self.viewport.width as f64,
            client_height: self.viewport.height as f64,
            client_width: self.viewport.width as f64,
        }
    }

    fn set_scroll_top(&mut self, _container: ContainerKind, top: f64) {
        self.scroll_top = top;
    }

    fn set_scroll_left(&mut self, _container: ContainerKind, left: f64) {
        // rows never overflow horizontally
        trace!(left, "Horizontal scroll ignored");
    }

    fn dragged_bounds(&self) -> ElementBound {
        let area = self.viewport;
        let row = match self.pointer {
            Some((_, row)) => row,
            None => area.y + area.height / 2,
        };
        ElementBound::new(area.x as f64, row as f64, area.width as f64, 1.0)
    }

    fn viewport_height(&self) -> f64 {
        self.screen_height as f64
    }
}

impl<C: Clock + Clone> Clock for TerminalHost<C> {
    fn now(&self) -> Instant {
        self.clock.now()
    }
}

impl<C: Clock + Clone> Host for TerminalHost<C> {
    fn ui_mode(&self) -> UiMode {
        self.mode
    }
}
