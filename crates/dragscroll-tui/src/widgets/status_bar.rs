use dragscroll_core::{Clock, MonitorState};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render<C: Clock + Clone>(frame: &mut Frame, area: Rect, app: &App<C>) {
        let theme = &app.theme;

        let mode_str = if app.is_dragging() { "DRAG" } else { "NORMAL" };
        let monitor_str = match app.monitor().state() {
            MonitorState::Idle => "idle",
            MonitorState::Sampling => "sampling",
            MonitorState::Scrolling { .. } => "scrolling",
        };

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {} | {}", mode_str, msg)
        } else {
            format!(
                " {} | autoscroll: {} | offset: {} | scrolled: {} rows",
                mode_str,
                monitor_str,
                app.offset(),
                app.rows_scrolled()
            )
        };

        let help_hint = " q:quit j/k:move drag:reorder esc:cancel ";
        let padding_len = area
            .width
            .saturating_sub(status_text.chars().count() as u16 + help_hint.len() as u16)
            as usize;

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
