//! Pointer input as seen by the monitor, and the listener bookkeeping hosts
//! use to route it.

use crate::geometry::Point;
use crate::host::ContainerKind;

/// Element a listener is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The scroll container the monitor drives
    Container(ContainerKind),
    /// The document body; move events bubble here from any element
    Body,
}

/// Kinds of input the monitor listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DragOver,
    TouchMove,
    MouseMove,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::DragOver, EventKind::TouchMove, EventKind::MouseMove];
}

/// Which of the monitor's two listeners an event is delivered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    /// Registered by `start()`; only used to notice that a drag began
    Coarse,
    /// Registered while attached; feeds the throttled sampler
    Dense,
}

/// One touch point
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Touch {
    pub client: Point,
    pub page: Point,
}

/// A move-like input event
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    DragOver { client: Point, page: Point },
    MouseMove { client: Point, page: Point },
    TouchMove { changed_touches: Vec<Touch> },
}

impl InputEvent {
    /// Drag-over at a viewport position (page coordinates equal client)
    pub fn drag_over(x: f64, y: f64) -> Self {
        let p = Point::new(x, y);
        InputEvent::DragOver { client: p, page: p }
    }

    /// Mouse move at a viewport position (page coordinates equal client)
    pub fn mouse_move(x: f64, y: f64) -> Self {
        let p = Point::new(x, y);
        InputEvent::MouseMove { client: p, page: p }
    }

    /// Single-finger touch move at a viewport position
    pub fn touch_move(x: f64, y: f64) -> Self {
        let p = Point::new(x, y);
        InputEvent::TouchMove {
            changed_touches: vec![Touch { client: p, page: p }],
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::DragOver { .. } => EventKind::DragOver,
            InputEvent::MouseMove { .. } => EventKind::MouseMove,
            InputEvent::TouchMove { .. } => EventKind::TouchMove,
        }
    }

    /// Viewport coordinates of the event
    ///
    /// Touch events report their first changed touch; a touch event without
    /// changed touches has no position.
    pub fn client_coords(&self) -> Option<Point> {
        match self {
            InputEvent::DragOver { client, .. } | InputEvent::MouseMove { client, .. } => {
                Some(*client)
            }
            InputEvent::TouchMove { changed_touches } => changed_touches.first().map(|t| t.client),
        }
    }

    /// Document coordinates of the event, same rules as [`Self::client_coords`]
    pub fn page_coords(&self) -> Option<Point> {
        match self {
            InputEvent::DragOver { page, .. } | InputEvent::MouseMove { page, .. } => Some(*page),
            InputEvent::TouchMove { changed_touches } => changed_touches.first().map(|t| t.page),
        }
    }
}

/// Registration table for hosts without their own listener bookkeeping
///
/// Registrations are not deduplicated: adding the same triple twice needs two
/// removals.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    entries: Vec<(EventTarget, EventKind, Listener)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, target: EventTarget, kind: EventKind, listener: Listener) {
        self.entries.push((target, kind, listener));
    }

    /// Remove one matching registration; returns whether one was found
    pub fn remove(&mut self, target: EventTarget, kind: EventKind, listener: Listener) -> bool {
        match self.entries.iter().position(|e| *e == (target, kind, listener)) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn count(&self, target: EventTarget, kind: EventKind, listener: Listener) -> usize {
        self.entries
            .iter()
            .filter(|e| **e == (target, kind, listener))
            .count()
    }

    pub fn contains(&self, target: EventTarget, kind: EventKind, listener: Listener) -> bool {
        self.count(target, kind, listener) > 0
    }

    /// Number of registrations held by `listener`
    pub fn count_listener(&self, listener: Listener) -> usize {
        self.entries.iter().filter(|(_, _, l)| *l == listener).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Listeners that see an event of `kind`, in delivery order
    ///
    /// The event bubbles: listeners on the container run first when the
    /// pointer is over it, then listeners on the body. The result is a
    /// snapshot, so registrations made while delivering it do not receive
    /// this event.
    pub fn route(&self, kind: EventKind, over_container: bool) -> Vec<Listener> {
        let on_container = self.entries.iter().filter(|(target, k, _)| {
            over_container && *k == kind && matches!(target, EventTarget::Container(_))
        });
        let on_body = self
            .entries
            .iter()
            .filter(|(target, k, _)| *k == kind && *target == EventTarget::Body);

        on_container.chain(on_body).map(|(_, _, listener)| *listener).collect()
    }
}
