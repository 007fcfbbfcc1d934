//! Keyboard and input event handling.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{App, Focus};
use crate::i18n;

/// Process a key event and update the application state.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> anyhow::Result<()> {
    if key.kind == KeyEventKind::Release {
        return Ok(());
    }

    // Ctrl+C always quits, even mid-batch
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return Ok(());
    }

    // ── Popup handling (captures all keys) ────────────────
    if app.notice.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.notice = None;
        }
        return Ok(());
    }

    if app.picker.is_some() {
        handle_picker_keys(app, key);
        return Ok(());
    }

    if app.is_busy() {
        if key.code == KeyCode::Esc {
            app.should_quit = true;
        } else {
            app.set_status(i18n::tui_status_processing());
        }
        return Ok(());
    }

    // ── Form ──────────────────────────────────────────────
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab | KeyCode::Down => app.focus = app.focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.focus = app.focus.prev(),
        KeyCode::F(2) => {
            if app.focus != Focus::Convert {
                app.open_picker();
            }
        }
        KeyCode::Char('o') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if app.focus != Focus::Convert {
                app.open_picker();
            }
        }
        KeyCode::Enter => match app.focus {
            Focus::Input | Focus::Output => app.open_picker(),
            Focus::Convert => app.start_conversion(),
        },
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Char(c) => match app.focus {
            Focus::Input | Focus::Output => app.push_char(c),
            Focus::Convert if c == 'q' => app.should_quit = true,
            Focus::Convert if c == ' ' => app.start_conversion(),
            Focus::Convert => {}
        },
        _ => {}
    }

    Ok(())
}

/// Key handling while the folder picker is open.
fn handle_picker_keys(app: &mut App, key: KeyEvent) {
    let Some(picker) = app.picker.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => picker.move_down(),
        KeyCode::Char('k') | KeyCode::Up => picker.move_up(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => picker.enter(),
        KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => picker.parent(),
        KeyCode::Char(' ') | KeyCode::Char('s') => app.choose_picked(),
        KeyCode::Esc => app.picker = None,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::i18n::Lang;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    #[test]
    fn test_tab_cycles_focus() {
        let mut app = App::new(Config::default(), Lang::En);
        assert_eq!(app.focus, Focus::Input);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Output);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Convert);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focus, Focus::Output);
    }

    #[test]
    fn test_typing_goes_into_field() {
        let mut app = App::new(Config::default(), Lang::En);
        for c in "/in".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.input, "/in");
        assert!(!app.should_quit);
    }

    #[test]
    fn test_notice_swallows_keys_until_closed() {
        let mut app = App::new(Config::default(), Lang::En);
        app.focus = Focus::Convert;
        press(&mut app, KeyCode::Enter);
        assert!(app.notice.is_some());

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Esc);
        assert!(app.notice.is_none());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = App::new(Config::default(), Lang::En);
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        )
        .unwrap();
        assert!(app.should_quit);
    }
}
