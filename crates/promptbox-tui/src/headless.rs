//! Headless mode for the promptbox TUI.
//!
//! Runs the same app loop against a `TestBackend` instead of a real
//! terminal, for E2E testing and automation. Input is sent over a channel
//! and the rendered screen is published after each frame.

use crate::app::App;
use crate::event::{Action, Event};
use crossterm::event::KeyEvent;
use promptbox_engine::{Config, ConfigError, InferenceClient, WidgetState};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Default terminal dimensions for headless mode.
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// State captured from the headless TUI after each render.
#[derive(Debug, Clone, Default)]
pub struct HeadlessState {
    /// Widget state, `None` when closed.
    pub widget: Option<WidgetState>,
    /// Text contents of the terminal buffer.
    pub screen_contents: String,
    /// Whether the TUI should quit.
    pub should_quit: bool,
}

/// Input fed to a headless instance.
#[derive(Debug)]
enum Input {
    Action(Action),
    Event(Event),
}

/// Handle to control a headless TUI instance.
///
/// Use this to send input and observe state changes.
pub struct HeadlessHandle {
    input_tx: mpsc::UnboundedSender<Input>,
    state_rx: watch::Receiver<HeadlessState>,
}

impl HeadlessHandle {
    /// Send an action to the TUI, bypassing the dispatcher.
    ///
    /// Returns `true` if the action was sent successfully.
    pub fn send_action(&self, action: Action) -> bool {
        self.input_tx.send(Input::Action(action)).is_ok()
    }

    /// Send a key press, as if typed.
    pub fn send_key(&self, key: KeyEvent) -> bool {
        self.input_tx.send(Input::Event(Event::Key(key))).is_ok()
    }

    /// Send any terminal event.
    pub fn send_event(&self, event: Event) -> bool {
        self.input_tx.send(Input::Event(event)).is_ok()
    }

    /// Get the current state of the TUI.
    pub fn state(&self) -> HeadlessState {
        self.state_rx.borrow().clone()
    }

    /// Wait until a condition is met on the state.
    ///
    /// Returns the state when the condition is met, or `None` if timed out.
    pub async fn wait_for<F>(
        &mut self,
        condition: F,
        timeout: std::time::Duration,
    ) -> Option<HeadlessState>
    where
        F: Fn(&HeadlessState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let state = self.state();
            if condition(&state) {
                return Some(state);
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }

            match tokio::time::timeout(remaining, self.state_rx.changed()).await {
                Ok(Ok(())) => {}
                // Timed out, or the loop ended and dropped its sender
                Ok(Err(_)) | Err(_) => {
                    let state = self.state();
                    return condition(&state).then_some(state);
                }
            }
        }
    }

    /// Wait for specific text to appear on screen.
    pub async fn wait_for_text(
        &mut self,
        text: &str,
        timeout: std::time::Duration,
    ) -> Option<HeadlessState> {
        let text = text.to_string();
        self.wait_for(|s| s.screen_contents.contains(&text), timeout)
            .await
    }

    /// Check if the TUI has quit.
    pub fn has_quit(&self) -> bool {
        self.state().should_quit
    }
}

/// Configuration for headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    /// Tick rate in milliseconds.
    pub tick_rate_ms: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate_ms: 20,
        }
    }
}

/// Run the TUI in headless mode.
///
/// Returns a handle to control the TUI and a join handle for the background
/// task. Fails up front if the configuration is invalid.
///
/// # Example
///
/// ```ignore
/// let (mut handle, task) = run_tui_headless(&Config::default(), client, HeadlessConfig::default())?;
///
/// handle.send_action(Action::Submit("hello".into()));
/// let state = handle.wait_for_text("Try Again", Duration::from_secs(1)).await;
///
/// handle.send_action(Action::Quit);
/// task.await.unwrap();
/// ```
pub fn run_tui_headless(
    config: &Config,
    client: Arc<dyn InferenceClient>,
    headless: HeadlessConfig,
) -> Result<(HeadlessHandle, JoinHandle<Result<(), String>>), ConfigError> {
    let app = App::new(config, client)?;
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(HeadlessState::default());

    let task = tokio::spawn(async move {
        run_headless_loop(app, headless, input_rx, state_tx)
            .await
            .map_err(|e| e.to_string())
    });

    let handle = HeadlessHandle { input_tx, state_rx };

    Ok((handle, task))
}

async fn run_headless_loop(
    mut app: App,
    config: HeadlessConfig,
    mut input_rx: mpsc::UnboundedReceiver<Input>,
    state_tx: watch::Sender<HeadlessState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let backend = TestBackend::new(config.width, config.height);
    let mut terminal = Terminal::new(backend)?;
    let tick_duration = std::time::Duration::from_millis(config.tick_rate_ms);

    let mut view = app.subscribe();
    let mut needs_redraw = true;

    app.on_load();

    loop {
        app.poll_completions();

        if needs_redraw || view.has_changed().unwrap_or(true) {
            drop(view.borrow_and_update());
            terminal.draw(|frame| crate::draw(&mut app, frame))?;

            let screen_contents = buffer_to_string(terminal.backend().buffer());
            let _ = state_tx.send(HeadlessState {
                widget: app.state().cloned(),
                screen_contents,
                should_quit: app.should_quit,
            });
        }

        if app.should_quit {
            break;
        }

        needs_redraw = tokio::select! {
            Some(input) = input_rx.recv() => match input {
                Input::Action(action) => {
                    app.handle_action(action);
                    true
                }
                Input::Event(event) => {
                    let redraw = app.redraws_on(&event);
                    app.handle_event(event);
                    redraw
                }
            },
            _ = app.next_completion(), if app.is_loading() => false,
            () = tokio::time::sleep(tick_duration) => {
                app.tick();
                app.is_loading()
            }
        };
    }

    Ok(())
}

/// Convert a terminal buffer to a string, one line per row with trailing
/// spaces trimmed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use promptbox_engine::{InferenceFailure, MockClient};
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn start(client: MockClient) -> (HeadlessHandle, JoinHandle<Result<(), String>>) {
        run_tui_headless(&Config::default(), Arc::new(client), HeadlessConfig::default())
            .expect("default config is valid")
    }

    #[test]
    fn test_headless_config_default() {
        let config = HeadlessConfig::default();
        assert_eq!(config.width, DEFAULT_WIDTH);
        assert_eq!(config.height, DEFAULT_HEIGHT);
    }

    #[test]
    fn test_headless_state_default() {
        let state = HeadlessState::default();
        assert!(state.widget.is_none());
        assert!(!state.should_quit);
        assert!(state.screen_contents.is_empty());
    }

    #[test]
    fn test_rejects_invalid_hotkey() {
        let config = Config {
            hotkey: "p".into(),
            ..Config::default()
        };
        let result = run_tui_headless(&config, Arc::new(MockClient::new()), HeadlessConfig::default());
        assert!(matches!(result, Err(ConfigError::InvalidHotkey { .. })));
    }

    #[tokio::test]
    async fn test_opens_on_load_and_answers() {
        let client = MockClient::new();
        client.push_text("The sky is blue.");
        let (mut handle, task) = start(client.clone());

        assert!(handle.wait_for_text("Enter prompt, then press Enter...", WAIT).await.is_some());

        for c in "why".chars() {
            handle.send_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        handle.send_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        let state = handle.wait_for_text("The sky is blue.", WAIT).await.unwrap();
        assert!(state.screen_contents.contains(" Try Again "));
        assert_eq!(
            state.widget,
            Some(WidgetState::Result {
                prompt_text: "why".into(),
                result_text: "The sky is blue.".into(),
            })
        );
        assert_eq!(client.requests(), vec!["why"]);

        handle.send_action(Action::Quit);
        task.await.unwrap().unwrap();
        assert!(handle.has_quit());
    }

    #[tokio::test]
    async fn test_failure_then_retry() {
        let client = MockClient::new();
        client.push_failure(InferenceFailure::new("timeout"));
        let (mut handle, task) = start(client);

        handle.send_action(Action::Submit("x".into()));
        assert!(handle.wait_for_text("Error: timeout", WAIT).await.is_some());

        handle.send_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE));
        let state = handle
            .wait_for(|s| matches!(s.widget, Some(WidgetState::Input { .. })), WAIT)
            .await
            .unwrap();
        assert_eq!(
            state.widget,
            Some(WidgetState::Input {
                draft_text: "x".into()
            })
        );

        handle.send_action(Action::Quit);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_answer_redraws_without_waiting_for_tick() {
        let client = MockClient::new();
        let gate = client.push_gated();
        let headless = HeadlessConfig {
            tick_rate_ms: 60_000,
            ..HeadlessConfig::default()
        };
        let (mut handle, task) =
            run_tui_headless(&Config::default(), Arc::new(client), headless).unwrap();

        handle.send_action(Action::Submit("x".into()));
        assert!(handle.wait_for_text("Generating response...", WAIT).await.is_some());

        gate.send(Ok("right away".into())).unwrap();
        assert!(handle.wait_for_text("right away", WAIT).await.is_some());

        handle.send_action(Action::Quit);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_close_while_loading_stays_closed() {
        let client = MockClient::new();
        let gate = client.push_gated();
        let (mut handle, task) = start(client);

        handle.send_action(Action::Submit("slow".into()));
        assert!(handle.wait_for_text("Generating response...", WAIT).await.is_some());

        handle.send_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(handle.wait_for(|s| s.widget.is_none(), WAIT).await.is_some());

        // Whether or not the aborted call still listens, nothing reopens
        let _ = gate.send(Ok("late".into()));
        handle.send_event(Event::Tick);
        handle.send_event(Event::Tick);
        assert!(handle
            .wait_for_text("late", Duration::from_millis(200))
            .await
            .is_none());
        assert!(handle.state().widget.is_none());

        handle.send_action(Action::Quit);
        task.await.unwrap().unwrap();
    }
}
