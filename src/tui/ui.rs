//! Main render function that dispatches to widgets.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use super::app::App;
use super::widgets;

/// Render the entire TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.area();

    // Vertical layout: title (1) + form (flex) + log (flex) + status (1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // title bar
            Constraint::Length(11), // form: fields, button, gauge, status line
            Constraint::Min(3),     // log
            Constraint::Length(1),  // status bar
        ])
        .split(size);

    widgets::form::render_title(frame, vertical[0]);
    widgets::form::render(frame, app, vertical[1]);
    widgets::log_view::render(frame, app, vertical[2]);
    widgets::status_bar::render(frame, app, vertical[3]);

    // Popups (rendered on top of everything)
    if let Some(picker) = &app.picker {
        widgets::folder_picker::render(frame, picker);
    }
    if let Some(notice) = &app.notice {
        widgets::notice_popup::render(frame, notice);
    }
}
