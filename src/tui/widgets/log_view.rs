//! Scrolling conversion log, pinned to the newest line.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::i18n;
use crate::tui::app::App;
use crate::tui::theme::current_theme;

/// Render the log panel.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = current_theme();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(i18n::tui_log());
    let height = block.inner(area).height as usize;

    let skip = app.log.len().saturating_sub(height);
    let lines: Vec<Line> = app.log[skip..]
        .iter()
        .map(|line| {
            let style = match line.ok {
                Some(true) => theme.log_ok,
                Some(false) => theme.log_err,
                None => theme.log_plain,
            };
            Line::from(Span::styled(line.text.as_str(), style))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
