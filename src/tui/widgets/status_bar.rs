//! Bottom status bar showing transient messages or context-sensitive keyboard hints.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::i18n;
use crate::tui::app::{App, Focus};
use crate::tui::theme::current_theme;

/// Version string shown at the right edge of the status bar.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Render the status bar: hints (or a transient message) on the left, the
/// PDF label language and the version on the right.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = current_theme();

    let right = format!("{} v{VERSION} ", app.lang.code().to_uppercase());
    let [left_area, right_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(right.len() as u16)])
        .areas(area);

    let left = match &app.status_message {
        Some((msg, _)) => Line::from(Span::styled(format!(" {msg}"), theme.hint_key)),
        None => Line::from(
            build_hints(app)
                .into_iter()
                .flat_map(|(key, desc)| {
                    [
                        Span::styled(format!(" {key}"), theme.hint_key),
                        Span::styled(format!(":{desc} "), theme.status_bar),
                    ]
                })
                .collect::<Vec<_>>(),
        ),
    };
    frame.render_widget(Paragraph::new(left).style(theme.status_bar), left_area);

    let right = Paragraph::new(Span::styled(right, theme.border))
        .alignment(Alignment::Right)
        .style(theme.status_bar);
    frame.render_widget(right, right_area);
}

/// Return hint pairs (key, description) for the focused form element.
fn build_hints(app: &App) -> Vec<(&'static str, &'static str)> {
    let mut hints = Vec::new();

    if app.is_busy() {
        hints.push(("Esc", i18n::tui_hint_quit()));
        return hints;
    }

    hints.push(("Tab", i18n::tui_hint_next()));
    match app.focus {
        Focus::Input | Focus::Output => {
            hints.push(("Enter/F2", i18n::tui_hint_pick()));
        }
        Focus::Convert => {
            hints.push(("Enter", i18n::tui_hint_convert()));
        }
    }
    hints.push(("Esc", i18n::tui_hint_quit()));

    hints
}
