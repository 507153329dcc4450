use std::cell::Cell;
use std::ops::Range;
use std::rc::Rc;
use std::time::Instant;

use anyhow::Result;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use dragscroll_core::config::UiConfig;
use dragscroll_core::{create_scroll_monitor, Clock, InputEvent, ScrollMonitor, SystemClock};
use ratatui::layout::Rect;
use tracing::debug;

use crate::host::{cell_center, TerminalHost};
use crate::input::Action;
use crate::theme::Theme;

/// An item being carried by the mouse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    /// Index the item was picked up from
    pub from: usize,
    /// Last pointer cell (column, row)
    pub pointer: (u16, u16),
}

/// Application state
pub struct App<C = SystemClock> {
    /// List contents, in display order
    pub items: Vec<String>,
    /// Currently selected item index
    pub selected: usize,
    /// Item being dragged, if any
    pub drag: Option<DragState>,
    /// Widget colors
    pub theme: Theme,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Status message
    pub status_message: Option<String>,
    monitor: ScrollMonitor<TerminalHost<C>>,
    /// Rows scrolled by autoscroll since startup
    scrolled: Rc<Cell<f64>>,
}

impl App<SystemClock> {
    pub fn with_system_clock(config: &UiConfig) -> Result<Self> {
        Self::new(config, SystemClock)
    }
}

impl<C: Clock + Clone> App<C> {
    pub fn new(config: &UiConfig, clock: C) -> Result<Self> {
        let scrolled = Rc::new(Cell::new(0.0));
        let total = Rc::clone(&scrolled);
        let options = config
            .scroll
            .to_options()?
            .on_scroll_change(move |_, dy: f64| total.set(total.get() + dy.abs()));

        let items: Vec<String> = (1..=config.item_count)
            .map(|i| format!("Item {:03}", i))
            .collect();

        let mut host = TerminalHost::new(clock, config.scroll.frame_interval(), config.mode);
        host.set_item_count(items.len());
        let monitor = create_scroll_monitor(host, options)?;

        Ok(Self {
            items,
            selected: 0,
            drag: None,
            theme: Theme::default(),
            should_quit: false,
            status_message: None,
            monitor,
            scrolled,
        })
    }

    pub fn monitor(&self) -> &ScrollMonitor<TerminalHost<C>> {
        &self.monitor
    }

    fn host(&self) -> &TerminalHost<C> {
        self.monitor.host()
    }

    /// Index of the first visible item
    pub fn offset(&self) -> usize {
        self.host().offset()
    }

    /// Area the rows are drawn in
    pub fn viewport(&self) -> Rect {
        self.host().viewport()
    }

    /// Indices of the items currently on screen
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.offset().min(self.items.len());
        let end = (start + self.viewport().height as usize).min(self.items.len());
        start..end
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_autoscrolling(&self) -> bool {
        self.monitor.is_scrolling()
    }

    pub fn rows_scrolled(&self) -> f64 {
        self.scrolled.get()
    }

    /// Update geometry after a resize or before drawing
    pub fn set_layout(&mut self, list_viewport: Rect, screen_height: u16) {
        self.monitor
            .host_mut()
            .set_viewport(list_viewport, screen_height);
    }

    pub fn next_frame_due(&self) -> Option<Instant> {
        self.host().next_frame_due()
    }

    /// Deliver due frames; returns how many ran
    pub fn on_tick(&mut self) -> usize {
        let due = self.monitor.host_mut().frames_mut().take_due();
        let count = due.len();
        for handle in due {
            self.monitor.on_frame(handle);
        }
        count
    }

    /// Where the dragged item would land if released now
    pub fn drop_target(&self) -> Option<usize> {
        self.drag.and_then(|drag| self.index_at_row(drag.pointer.1))
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                if self.is_dragging() {
                    self.cancel_drag();
                }
                self.should_quit = true;
            }
            Action::MoveUp => {
                self.selected = self.selected.saturating_sub(1);
                self.ensure_selected_visible();
            }
            Action::MoveDown => {
                if self.selected + 1 < self.items.len() {
                    self.selected += 1;
                }
                self.ensure_selected_visible();
            }
            Action::JumpToTop => {
                self.selected = 0;
                self.ensure_selected_visible();
            }
            Action::JumpToBottom => {
                self.selected = self.items.len().saturating_sub(1);
                self.ensure_selected_visible();
            }
            Action::CancelDrag => self.cancel_drag(),
            Action::None => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let pointer = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.item_at(pointer) {
                    self.begin_drag(index, pointer);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) if self.is_dragging() => {
                self.move_pointer(pointer);
                let p = cell_center(pointer.0, pointer.1);
                self.dispatch(InputEvent::drag_over(p.x, p.y));
            }
            MouseEventKind::Moved => {
                let p = cell_center(pointer.0, pointer.1);
                self.dispatch(InputEvent::mouse_move(p.x, p.y));
            }
            MouseEventKind::Up(MouseButton::Left) if self.is_dragging() => {
                self.move_pointer(pointer);
                self.finish_drag();
            }
            _ => {}
        }
    }

    fn begin_drag(&mut self, index: usize, pointer: (u16, u16)) {
        self.drag = Some(DragState {
            from: index,
            pointer,
        });
        self.selected = index;
        self.monitor.host_mut().set_pointer(Some(pointer));
        self.monitor.start();
        self.status_message = Some(format!("Moving {}", self.items[index]));
        debug!(index, "Drag started");

        let p = cell_center(pointer.0, pointer.1);
        self.dispatch(InputEvent::mouse_move(p.x, p.y));
    }

    fn move_pointer(&mut self, pointer: (u16, u16)) {
        if let Some(drag) = self.drag.as_mut() {
            drag.pointer = pointer;
        }
        self.monitor.host_mut().set_pointer(Some(pointer));
    }

    fn finish_drag(&mut self) {
        let target = self.drop_target();
        let Some(drag) = self.drag.take() else {
            return;
        };
        self.monitor.stop();
        self.monitor.host_mut().set_pointer(None);

        if let Some(target) = target {
            let item = self.items.remove(drag.from);
            self.status_message = Some(format!("Moved {} to position {}", item, target + 1));
            self.items.insert(target, item);
            self.selected = target;
            debug!(from = drag.from, to = target, "Item dropped");
        }
    }

    fn cancel_drag(&mut self) {
        if self.drag.take().is_some() {
            self.monitor.stop();
            self.monitor.host_mut().set_pointer(None);
            self.status_message = Some("Move cancelled".to_string());
            debug!("Drag cancelled");
        }
    }

    fn dispatch(&mut self, event: InputEvent) {
        for listener in self.host().route(&event) {
            self.monitor.handle_event(listener, &event);
        }
    }

    /// Item under a pointer cell, if the cell is inside the list
    fn item_at(&self, (column, row): (u16, u16)) -> Option<usize> {
        let area = self.viewport();
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if !inside {
            return None;
        }
        let index = self.offset() + (row - area.y) as usize;
        (index < self.items.len()).then_some(index)
    }

    /// Item for a row, clamping rows above or below the list to its edges
    fn index_at_row(&self, row: u16) -> Option<usize> {
        let area = self.viewport();
        if area.height == 0 || self.items.is_empty() {
            return None;
        }
        let row = row.clamp(area.y, area.y + area.height - 1);
        let index = self.offset() + (row - area.y) as usize;
        Some(index.min(self.items.len() - 1))
    }

    fn ensure_selected_visible(&mut self) {
        let height = self.viewport().height as usize;
        let offset = self.offset();
        if self.selected < offset {
            self.monitor.host_mut().set_offset(self.selected);
        } else if height > 0 && self.selected >= offset + height {
            self.monitor.host_mut().set_offset(self.selected + 1 - height);
        }
    }
}
