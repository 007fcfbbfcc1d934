//! Folder picker popup listing the sub-folders of the current directory.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use super::centered_rect_exact;
use crate::i18n;
use crate::tui::app::FolderPicker;
use crate::tui::theme::current_theme;

/// Render the picker centered on screen.
pub fn render(frame: &mut Frame, picker: &FolderPicker) {
    let theme = current_theme();
    let screen = frame.area();
    let width = (screen.width * 70 / 100).max(40);
    let height = (screen.height * 70 / 100).max(10);
    let area = centered_rect_exact(width, height, screen);

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.popup_title)
        .title(i18n::tui_picker_title())
        .style(theme.popup);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Current path (1) + entries (flex) + hints (1)
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let path = Paragraph::new(Line::from(Span::styled(
        format!(" {}", picker.dir.display()),
        theme.popup_title,
    )));
    frame.render_widget(path, rows[0]);

    if let Some(error) = &picker.error {
        let msg = Paragraph::new(Line::from(Span::styled(format!(" {error}"), theme.log_err)));
        frame.render_widget(msg, rows[1]);
    } else {
        let items: Vec<ListItem> = picker
            .entries
            .iter()
            .map(|name| ListItem::new(format!(" \u{1F4C1} {name}")))
            .collect();
        let list = List::new(items)
            .style(theme.popup)
            .highlight_style(theme.list_selected);
        let mut state = ListState::default().with_selected(
            (!picker.entries.is_empty()).then_some(picker.selected),
        );
        frame.render_stateful_widget(list, rows[1], &mut state);
    }

    let hints = [
        ("Enter", i18n::tui_hint_open()),
        ("Backspace", i18n::tui_hint_parent()),
        ("Space", i18n::tui_hint_choose()),
        ("Esc", i18n::tui_hint_cancel()),
    ];
    let mut spans = Vec::new();
    for (key, desc) in hints {
        spans.push(Span::styled(format!(" {key}"), theme.hint_key));
        spans.push(Span::styled(format!(":{desc} "), theme.status_bar));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[2]);
}
