//! File list pane

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding},
    Frame,
};

/// One row of the file list
pub struct FileEntry<'a> {
    pub name: &'a str,
    pub bytes: usize,
    /// Contents differ from the previous stage
    pub changed: bool,
}

pub fn render_file_list(
    frame: &mut Frame,
    area: Rect,
    entries: &[FileEntry],
    selected: usize,
    is_focused: bool,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Files ")
        .borders(Borders::ALL)
        .border_style(border_style)
        .padding(Padding::new(1, 0, 0, 0));

    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let marker = if entry.changed {
                Span::styled("* ", Style::default().fg(DEFAULT_THEME.secondary))
            } else {
                Span::raw("  ")
            };
            let mut name_style = Style::default().fg(DEFAULT_THEME.fg);
            if i == selected {
                name_style = name_style
                    .bg(DEFAULT_THEME.current_line_bg)
                    .add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(vec![
                marker,
                Span::styled(entry.name.to_string(), name_style),
                Span::styled(
                    format!(" {}b", entry.bytes),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
