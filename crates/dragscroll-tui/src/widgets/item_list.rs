use dragscroll_core::Clock;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::app::App;

pub struct ItemListWidget;

impl ItemListWidget {
    fn block<'a>(title: String, border_style: Style, bg: Style) -> Block<'a> {
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(bg)
    }

    /// Area inside the border where rows are drawn
    pub fn viewport(area: Rect) -> Rect {
        Block::default().borders(Borders::ALL).inner(area)
    }

    pub fn render<C: Clock + Clone>(frame: &mut Frame, area: Rect, app: &App<C>) {
        let theme = &app.theme;

        let border_style = if app.is_autoscrolling() {
            Style::default().fg(theme.scrolling)
        } else if app.is_dragging() {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.grey0)
        };

        let range = app.visible_range();
        let title = format!(
            " Items {}-{} of {} ",
            (range.start + 1).min(app.items.len()),
            range.end,
            app.items.len()
        );
        let block = Self::block(title, border_style, Style::default().bg(theme.bg0));

        let dragged = app.drag.map(|d| d.from);
        let target = app.drop_target();

        // Only the visible slice is handed to the list, so the offset the
        // monitor scrolled to is exactly what gets drawn
        let items: Vec<ListItem> = range
            .map(|i| {
                let label = &app.items[i];
                let (marker, style) = if Some(i) == target {
                    (
                        "▶ ",
                        Style::default()
                            .fg(theme.drop_target)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if Some(i) == dragged {
                    (
                        "  ",
                        Style::default()
                            .fg(theme.dragged)
                            .add_modifier(Modifier::DIM),
                    )
                } else if dragged.is_none() && i == app.selected {
                    ("  ", Style::default().fg(theme.fg0).bg(theme.selection))
                } else {
                    ("  ", Style::default().fg(theme.grey2))
                };

                ListItem::new(Line::from(vec![
                    Span::styled(marker, style),
                    Span::styled(label.clone(), style),
                ]))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}
