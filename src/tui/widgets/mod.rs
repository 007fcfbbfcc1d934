//! TUI widgets for rendering different UI panels.

pub mod folder_picker;
pub mod form;
pub mod log_view;
pub mod notice_popup;
pub mod status_bar;

use ratatui::layout::Rect;

/// Center a rectangle of the given size inside `area`, clamped to fit.
pub(crate) fn centered_rect_exact(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
