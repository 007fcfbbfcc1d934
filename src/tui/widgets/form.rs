//! Title bar and the conversion form: folder fields, the convert button,
//! the progress gauge and the status line.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::i18n;
use crate::tui::app::{App, Focus};
use crate::tui::theme::current_theme;

/// Render the one-line title bar.
pub fn render_title(frame: &mut Frame, area: Rect) {
    let theme = current_theme();
    let title = Paragraph::new(Line::from(Span::styled(i18n::tui_title(), theme.title)))
        .alignment(Alignment::Center)
        .style(theme.title);
    frame.render_widget(title, area);
}

/// Render the form below the title bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // input folder
            Constraint::Length(3), // output folder
            Constraint::Length(3), // convert button
            Constraint::Length(1), // gauge
            Constraint::Length(1), // status line
        ])
        .split(area);

    render_field(
        frame,
        rows[0],
        i18n::tui_input_folder(),
        &app.input,
        app.focus == Focus::Input && app.picker.is_none() && !app.is_busy(),
    );
    render_field(
        frame,
        rows[1],
        i18n::tui_output_folder(),
        &app.output,
        app.focus == Focus::Output && app.picker.is_none() && !app.is_busy(),
    );
    render_button(frame, app, rows[2]);
    render_progress(frame, app, rows[3], rows[4]);
}

/// A bordered single-line text field. Long values show their tail.
fn render_field(frame: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let theme = current_theme();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            theme.border_focused
        } else {
            theme.border
        })
        .title(title);
    let inner = block.inner(area);

    let room = inner.width.saturating_sub(1) as usize;
    let visible = tail_fitting(value, room);
    let style = if focused {
        theme.field_focused
    } else {
        theme.field
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(visible, style))).block(block);
    frame.render_widget(paragraph, area);

    if focused {
        let x = inner.x + UnicodeWidthStr::width(visible) as u16;
        frame.set_cursor_position(Position::new(x.min(inner.right().saturating_sub(1)), inner.y));
    }
}

/// The longest suffix of `value` that fits in `columns` terminal cells.
fn tail_fitting(value: &str, columns: usize) -> &str {
    let mut width = 0;
    let mut start = value.len();
    for (i, c) in value.char_indices().rev() {
        width += c.width().unwrap_or(0);
        if width > columns {
            break;
        }
        start = i;
    }
    &value[start..]
}

fn render_button(frame: &mut Frame, app: &App, area: Rect) {
    let theme = current_theme();
    let label = i18n::tui_convert();
    let width = (UnicodeWidthStr::width(label) as u16 + 2).min(area.width);
    let button_area = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y,
        width,
        area.height,
    );

    let focused = app.focus == Focus::Convert && !app.is_busy();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            theme.border_focused
        } else {
            theme.border
        });
    let button = Paragraph::new(Span::styled(
        label,
        if focused {
            theme.button_focused
        } else {
            theme.button
        },
    ))
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(button, button_area);
}

fn render_progress(frame: &mut Frame, app: &App, gauge_area: Rect, status_area: Rect) {
    let theme = current_theme();
    let (done, total) = app.progress;
    let ratio = if total == 0 {
        0.0
    } else {
        (done as f64 / total as f64).clamp(0.0, 1.0)
    };
    let gauge = Gauge::default()
        .gauge_style(theme.gauge)
        .ratio(ratio)
        .label(format!("{done}/{total}"));
    frame.render_widget(gauge, gauge_area);

    let status = Paragraph::new(Span::styled(app.status_line.as_str(), theme.status_line))
        .alignment(Alignment::Center);
    frame.render_widget(status, status_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_fitting() {
        assert_eq!(tail_fitting("/home/user/mail", 100), "/home/user/mail");
        assert_eq!(tail_fitting("/home/user/mail", 4), "mail");
        assert_eq!(tail_fitting("/メール/受信", 5), "/受信");
        assert_eq!(tail_fitting("/メール/受信", 4), "受信");
        assert_eq!(tail_fitting("", 5), "");
    }
}
