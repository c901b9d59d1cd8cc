//! Maps host triggers onto widget actions.
//!
//! The dispatcher owns no widget state. It looks at the current state only
//! to decide what a key means: Enter submits in the input state but retries
//! on a result, and printable keys only type while the field is shown.

use crate::event::Action;
use crate::ui::layout::OverlayLayout;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use promptbox_engine::{Config, ConfigError, Hotkey, WidgetState};

/// Translates key presses, clicks and host lifecycle into [`Action`]s.
#[derive(Debug, Clone)]
pub struct InputDispatcher {
    hotkey: Hotkey,
    open_on_start: bool,
    loaded: bool,
}

impl InputDispatcher {
    pub fn new(hotkey: Hotkey, open_on_start: bool) -> Self {
        Self {
            hotkey,
            open_on_start,
            loaded: false,
        }
    }

    /// Build a dispatcher from the user's configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.parsed_hotkey()?, config.open_on_start))
    }

    /// The chord that opens the widget.
    pub fn hotkey(&self) -> Hotkey {
        self.hotkey
    }

    /// Called when the host has finished starting.
    ///
    /// Yields [`Action::Open`] the first time only, and only when configured
    /// to open on start.
    pub fn on_load(&mut self) -> Action {
        if self.loaded {
            return Action::None;
        }
        self.loaded = true;
        if self.open_on_start {
            Action::Open
        } else {
            Action::None
        }
    }

    /// Map a key press given the current widget state (`None` = closed).
    pub fn dispatch_key(&self, key: KeyEvent, state: Option<&WidgetState>) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        if let KeyCode::Char(c) = key.code {
            if self.hotkey.matches(c, ctrl, alt, shift) {
                return Action::Open;
            }
        }

        if ctrl && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match state {
            None => match key.code {
                KeyCode::Char('q') if !ctrl && !alt => Action::Quit,
                _ => Action::None,
            },
            Some(WidgetState::Input { draft_text }) => match key.code {
                // Blank drafts are not worth a backend call
                KeyCode::Enter if draft_text.trim().is_empty() => Action::None,
                KeyCode::Enter => Action::Submit(draft_text.clone()),
                KeyCode::Esc => Action::Close,
                KeyCode::Backspace => Action::Backspace,
                KeyCode::Char('u') if ctrl => Action::ClearDraft,
                KeyCode::Char(c) if !ctrl && !alt => Action::Insert(c),
                _ => Action::None,
            },
            Some(WidgetState::Loading { .. }) => match key.code {
                KeyCode::Esc => Action::Close,
                _ => Action::None,
            },
            Some(WidgetState::Result { .. } | WidgetState::Error { .. }) => match key.code {
                KeyCode::Esc => Action::Close,
                KeyCode::Enter | KeyCode::Char('r') => Action::Retry,
                KeyCode::Up | KeyCode::Char('k') => Action::ScrollUp,
                KeyCode::Down | KeyCode::Char('j') => Action::ScrollDown,
                _ => Action::None,
            },
        }
    }

    /// Map a mouse event. Clicks only mean something on an overlay button.
    pub fn dispatch_mouse(&self, mouse: MouseEvent, layout: Option<&OverlayLayout>) -> Action {
        let Some(layout) = layout else {
            return Action::None;
        };
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => layout
                .hit_test(mouse.column, mouse.row)
                .cloned()
                .unwrap_or(Action::None),
            MouseEventKind::ScrollUp => Action::ScrollUp,
            MouseEventKind::ScrollDown => Action::ScrollDown,
            _ => Action::None,
        }
    }
}
