//! Event handling for the promptbox TUI.

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events that can occur in the TUI.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// A mouse event occurred.
    Mouse(MouseEvent),
    /// A tick event for UI updates.
    Tick,
    /// Terminal was resized.
    Resize(u16, u16),
}

/// Event handler that runs in a background thread.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler with the specified tick rate.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx_clone = tx.clone();

        // Spawn blocking thread for event polling (crossterm uses blocking I/O)
        std::thread::spawn(move || {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        let event = match evt {
                            // Only presses; release/repeat would double-type on
                            // terminals that report them.
                            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                                Some(Event::Key(key))
                            }
                            CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
                            CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                            _ => None,
                        };
                        if let Some(e) = event {
                            if tx_clone.send(e).is_err() {
                                break;
                            }
                        }
                    }
                } else if tx_clone.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Get the next event, blocking until one is available.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Something the user asked the widget or its host to do.
///
/// Produced by the [`InputDispatcher`](crate::InputDispatcher) and applied by
/// [`App::handle_action`](crate::App::handle_action).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the widget with an empty draft.
    Open,
    /// Dismiss the widget.
    Close,
    /// Submit the given draft.
    Submit(String),
    /// Return to the input state after a result or error.
    Retry,
    /// Type a character into the draft.
    Insert(char),
    /// Delete the last character of the draft.
    Backspace,
    /// Clear the whole draft.
    ClearDraft,
    /// Scroll a long result up one line.
    ScrollUp,
    /// Scroll a long result down one line.
    ScrollDown,
    /// Leave the host application.
    Quit,
    None,
}
