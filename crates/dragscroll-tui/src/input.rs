use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dragscroll_core::Clock;

use crate::app::App;

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    JumpToTop,
    JumpToBottom,
    CancelDrag,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event<C: Clock + Clone>(key: KeyEvent, app: &App<C>) -> Action {
    // While an item is held only cancelling or quitting makes sense
    if app.is_dragging() {
        return match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => Action::CancelDrag,
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
            _ => Action::None,
        };
    }

    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Esc, KeyModifiers::NONE) => Action::Quit,

        // Navigation
        (KeyCode::Char('j'), KeyModifiers::NONE) => Action::MoveDown,
        (KeyCode::Char('k'), KeyModifiers::NONE) => Action::MoveUp,
        (KeyCode::Down, KeyModifiers::NONE) => Action::MoveDown,
        (KeyCode::Up, KeyModifiers::NONE) => Action::MoveUp,

        // Jump to top/bottom
        (KeyCode::Char('g'), KeyModifiers::NONE) => Action::JumpToTop,
        (KeyCode::Home, KeyModifiers::NONE) => Action::JumpToTop,
        (KeyCode::Char('G'), KeyModifiers::SHIFT) => Action::JumpToBottom,
        (KeyCode::End, KeyModifiers::NONE) => Action::JumpToBottom,

        _ => Action::None,
    }
}
