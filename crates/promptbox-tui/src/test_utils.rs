//! Test utilities for promptbox-tui snapshot and integration testing.
//!
//! This module provides helper functions for creating test terminals,
//! rendering screens, and converting buffers to strings for snapshot testing.

use crate::app::App;
use crate::screens::Screen as ScreenTrait;
use crate::ui::layout::OverlayLayout;
use crate::ui::widgets::PromptBox;
use crate::view::present;
use promptbox_engine::{Config, MockClient, WidgetState};
use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, widgets::Widget, Terminal};
use std::sync::Arc;
use std::time::Duration;

pub use crate::headless::buffer_to_string;

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Create a test terminal with the default dimensions (80x24).
pub fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(TEST_WIDTH, TEST_HEIGHT);
    Terminal::new(backend).expect("Failed to create test terminal")
}

/// Create a test app backed by a scripted client, with default config.
pub fn create_test_app(client: MockClient) -> App {
    let mut app = App::new(&Config::default(), Arc::new(client)).expect("default config is valid");
    app.set_area(Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT));
    app
}

/// Draw the app into a test terminal the way the run loop does and return
/// the screen text.
pub fn render_app(terminal: &mut Terminal<TestBackend>, app: &mut App) -> String {
    terminal
        .draw(|frame| crate::draw(app, frame))
        .expect("Failed to draw");
    buffer_to_string(terminal.backend().buffer())
}

/// Wait for the app's pending request to be answered.
pub async fn settle(app: &mut App) -> bool {
    tokio::time::timeout(Duration::from_secs(5), app.next_completion())
        .await
        .expect("completion did not arrive")
}

/// Render a screen to a buffer and return it as a string.
pub fn render_screen_to_string<S: ScreenTrait>(screen: &S, app: &App) -> String {
    let area = Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

/// Render the overlay for a state over a host area of the given size and
/// return just the overlay's own cells.
pub fn render_overlay_to_string(
    state: &WidgetState,
    placeholder: &str,
    width: u16,
    height: u16,
) -> String {
    let presentation = present(state, placeholder);
    let host = Rect::new(0, 0, width, height);
    let overlay = OverlayLayout::compute(host, &presentation).area;
    let mut buffer = Buffer::empty(overlay);
    PromptBox::new(&presentation).render(host, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_terminal() {
        let terminal = create_test_terminal();
        let size = terminal.size().unwrap();
        assert_eq!(size.width, TEST_WIDTH);
        assert_eq!(size.height, TEST_HEIGHT);
    }

    #[test]
    fn test_create_test_app() {
        let app = create_test_app(MockClient::new());
        assert!(app.state().is_none());
        assert!(!app.should_quit);
        assert_eq!(app.backend_name(), "mock");
    }

    #[test]
    fn test_buffer_to_string() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello", ratatui::style::Style::default());
        buffer.set_string(0, 1, "World", ratatui::style::Style::default());

        assert_eq!(buffer_to_string(&buffer), "Hello\nWorld\n");
    }
}
