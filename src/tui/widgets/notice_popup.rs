//! Modal message box: completion summary, information and errors.

use ratatui::layout::Alignment;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::centered_rect_exact;
use crate::i18n;
use crate::tui::app::{Notice, NoticeKind};
use crate::tui::theme::current_theme;

/// Render the notice centered on screen.
pub fn render(frame: &mut Frame, notice: &Notice) {
    let theme = current_theme();
    let screen = frame.area();

    let (title, title_style) = match notice.kind {
        NoticeKind::Complete => (i18n::tui_complete_title(), theme.popup_title),
        NoticeKind::Info => (i18n::tui_info_title(), theme.popup_title),
        NoticeKind::Error => (i18n::tui_error_title(), theme.popup_error),
    };

    let text_width = UnicodeWidthStr::width(notice.text.as_str()) as u16;
    let width = (text_width + 6).clamp(30, screen.width.saturating_sub(4).max(30));
    let inner_width = width.saturating_sub(4).max(1);
    let text_lines = text_width.div_ceil(inner_width).max(1);
    let area = centered_rect_exact(width, text_lines + 5, screen);

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(title_style)
        .title(Span::styled(title, title_style))
        .style(theme.popup);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(notice.text.as_str(), theme.popup)),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", theme.hint_key),
            Span::styled(format!(":{}", i18n::tui_hint_close()), theme.status_bar),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
