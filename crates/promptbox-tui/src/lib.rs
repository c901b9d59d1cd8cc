//! promptbox-tui: Terminal overlay for the promptbox prompt widget
//!
//! This crate provides the terminal side of promptbox, including:
//! - The presentation mapping and the floating `PromptBox` overlay
//! - The input dispatcher (hotkey, keys, clicks, on-load)
//! - The interactive run loop over a host screen
//! - Headless mode for testing and automation

mod app;
mod dispatcher;
mod event;
pub mod headless;
mod screens;
#[cfg(test)]
pub mod test_utils;
mod text;
mod ui;
mod view;

use screens::Screen as ScreenTrait;

pub use app::App;
pub use dispatcher::InputDispatcher;
pub use event::{Action, Event, EventHandler};
pub use promptbox_engine;
pub use view::{present, Body, Button, Presentation};

use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use promptbox_engine::{Config, InferenceClient};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io::{self, stdout};
use std::sync::Arc;

/// Interactive tick rate, driving the loading animation.
const TICK_RATE_MS: u64 = 100;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI application.
///
/// This is the main entry point for the TUI. It sets up the terminal,
/// runs the event loop, and restores the terminal on exit.
pub async fn run_tui(
    config: &Config,
    client: Arc<dyn InferenceClient>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Validate before touching the terminal so errors print normally
    let mut app = App::new(config, client)?;

    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut events = EventHandler::new(TICK_RATE_MS);

    tracing::info!(backend = app.backend_name(), "promptbox started");
    app.on_load();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    // Restore cursor before guard drops
    terminal.show_cursor()?;

    tracing::info!("promptbox stopped");
    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut view = app.subscribe();
    let mut needs_redraw = true;

    loop {
        app.poll_completions();

        // Widget state changes always redraw
        if needs_redraw || view.has_changed().unwrap_or(true) {
            drop(view.borrow_and_update());
            terminal.draw(|frame| draw(app, frame))?;
        }

        needs_redraw = tokio::select! {
            event = events.next() => match event {
                Some(event) => {
                    let redraw = app.redraws_on(&event);
                    app.handle_event(event);
                    redraw
                }
                None => false,
            },
            _ = app.next_completion(), if app.is_loading() => false,
        };

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Draw one frame of the host screen and overlay.
pub(crate) fn draw(app: &mut App, frame: &mut Frame<'_>) {
    let area = frame.area();
    app.set_area(area);
    screens::host::HostScreen.render(app, area, frame.buffer_mut());
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
