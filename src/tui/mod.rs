//! Terminal UI — main entry point and event loop.
//!
//! A single-threaded form: pick the input and output folders, then convert.
//! While a batch runs, the loop converts one file per tick and redraws in
//! between, so the screen stays responsive without worker threads.

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

use std::io;
use std::time::Duration;

use crossterm::event::{poll as ct_poll, read as ct_read, Event};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use self::app::App;
use crate::config::Config;
use crate::i18n::Lang;

/// Run the TUI application. Blocks until the user quits.
pub fn run_tui(config: Config, lang: Lang) -> anyhow::Result<()> {
    let app = App::new(config, lang);

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;

    // Leave the alternate screen before a panic message is printed
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        default_hook(info);
    }));

    let result = Terminal::new(CrosstermBackend::new(io::stdout()))
        .map_err(anyhow::Error::from)
        .and_then(|mut terminal| {
            let result = run_event_loop(&mut terminal, app);
            terminal.show_cursor()?;
            result
        });

    let _ = std::panic::take_hook();
    restore_terminal()?;
    result
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Main event loop: render → poll → handle → tick → repeat.
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> anyhow::Result<()> {
    let idle_tick = Duration::from_millis(100);

    loop {
        terminal.draw(|frame| {
            ui::render(frame, &app);
        })?;

        // Don't wait for input while a batch is converting
        let timeout = if app.is_busy() {
            Duration::ZERO
        } else {
            idle_tick
        };
        if ct_poll(timeout)? {
            if let Event::Key(key) = ct_read()? {
                event::handle_key_event(&mut app, key)?;
            }
        }

        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
