//! Color theme definitions for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// A complete color theme for the TUI.
pub struct Theme {
    pub title: Style,
    pub status_bar: Style,
    pub field: Style,
    pub field_focused: Style,
    pub button: Style,
    pub button_focused: Style,
    pub gauge: Style,
    pub status_line: Style,
    pub log_ok: Style,
    pub log_err: Style,
    pub log_plain: Style,
    pub border: Style,
    pub border_focused: Style,
    pub list_selected: Style,
    pub popup: Style,
    pub popup_title: Style,
    pub popup_error: Style,
    pub hint_key: Style,
}

impl Theme {
    /// Dark theme (default).
    pub fn dark() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Rgb(200, 200, 220))
                .bg(Color::Rgb(30, 30, 46))
                .add_modifier(Modifier::BOLD),
            status_bar: Style::default()
                .fg(Color::Rgb(150, 150, 170))
                .bg(Color::Rgb(30, 30, 46)),
            field: Style::default().fg(Color::Rgb(200, 200, 220)),
            field_focused: Style::default().fg(Color::White),
            button: Style::default()
                .fg(Color::Rgb(180, 180, 200))
                .bg(Color::Rgb(40, 40, 60)),
            button_focused: Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(60, 60, 100))
                .add_modifier(Modifier::BOLD),
            gauge: Style::default()
                .fg(Color::Rgb(130, 170, 255))
                .bg(Color::Rgb(40, 40, 60)),
            status_line: Style::default().fg(Color::Rgb(150, 150, 170)),
            log_ok: Style::default().fg(Color::Green),
            log_err: Style::default().fg(Color::Rgb(255, 110, 110)),
            log_plain: Style::default().fg(Color::Rgb(220, 220, 230)),
            border: Style::default().fg(Color::Rgb(80, 80, 100)),
            border_focused: Style::default().fg(Color::Cyan),
            list_selected: Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(60, 60, 100)),
            popup: Style::default()
                .fg(Color::Rgb(220, 220, 230))
                .bg(Color::Rgb(20, 20, 35)),
            popup_title: Style::default()
                .fg(Color::Rgb(130, 170, 255))
                .add_modifier(Modifier::BOLD),
            popup_error: Style::default()
                .fg(Color::Rgb(255, 110, 110))
                .add_modifier(Modifier::BOLD),
            hint_key: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        }
    }
}

/// Return the active theme.
pub fn current_theme() -> Theme {
    Theme::dark()
}
