//! Application state and update logic for the promptbox TUI.

use crate::dispatcher::InputDispatcher;
use crate::event::{Action, Event};
use crate::ui::layout::{main_layout, OverlayLayout};
use crate::view::{present, Presentation};
use crossterm::event::{KeyEvent, MouseEvent};
use promptbox_engine::{
    Config, ConfigError, Hotkey, InferenceClient, Session, WidgetController, WidgetState,
};
use ratatui::layout::Rect;
use std::sync::Arc;
use tokio::sync::watch;

/// Application state.
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Widget controller plus its backend.
    session: Session,

    /// Maps keys and clicks to actions.
    dispatcher: InputDispatcher,

    /// Guidance shown in the empty field.
    placeholder: String,

    /// Animation frame, advanced on every tick.
    tick: usize,

    /// First visible line of a long result.
    scroll: usize,

    /// Host area of the last render, used for mouse hit-testing.
    area: Rect,
}

impl App {
    /// Create an app with the widget closed.
    ///
    /// Call [`on_load`](Self::on_load) once the host is up to honor
    /// `open_on_start`.
    pub fn new(config: &Config, client: Arc<dyn InferenceClient>) -> Result<Self, ConfigError> {
        Ok(Self {
            should_quit: false,
            session: Session::new(client, WidgetController::closed()),
            dispatcher: InputDispatcher::from_config(config)?,
            placeholder: config.placeholder.clone(),
            tick: 0,
            scroll: 0,
            area: Rect::default(),
        })
    }

    /// Current widget state, `None` when closed.
    pub fn state(&self) -> Option<&WidgetState> {
        self.session.state()
    }

    /// Name of the backend answering prompts.
    pub fn backend_name(&self) -> &str {
        self.session.backend_name()
    }

    /// The chord that opens the widget.
    pub fn hotkey(&self) -> Hotkey {
        self.dispatcher.hotkey()
    }

    /// Subscribe to widget state changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<WidgetState>> {
        self.session.subscribe()
    }

    /// Whether a backend answer is pending.
    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    /// Whether `event` can change the screen without changing the widget
    /// state. Ticks only matter while the loading animation runs.
    pub fn redraws_on(&self, event: &Event) -> bool {
        !matches!(event, Event::Tick) || self.is_loading()
    }

    pub fn tick_count(&self) -> usize {
        self.tick
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// What the overlay shows right now, if it is open.
    pub fn presentation(&self) -> Option<Presentation> {
        self.state().map(|state| present(state, &self.placeholder))
    }

    /// Overlay geometry for the last rendered area.
    pub fn overlay_layout(&self) -> Option<OverlayLayout> {
        let (content, _) = main_layout(self.area);
        self.presentation()
            .map(|presentation| OverlayLayout::compute(content, &presentation))
    }

    /// Remember the host area being drawn into.
    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    /// The host finished starting.
    pub fn on_load(&mut self) {
        let action = self.dispatcher.on_load();
        self.handle_action(action);
    }

    /// Handle a terminal event.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Tick => self.tick(),
            Event::Resize(width, height) => self.set_area(Rect::new(0, 0, width, height)),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let action = self.dispatcher.dispatch_key(key, self.state());
        self.handle_action(action);
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let layout = self.overlay_layout();
        let action = self.dispatcher.dispatch_mouse(mouse, layout.as_ref());
        self.handle_action(action);
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        if !matches!(action, Action::None | Action::Insert(_) | Action::Backspace) {
            tracing::debug!(?action, "handling action");
        }
        match action {
            Action::Open => {
                self.session.open();
                self.scroll = 0;
            }
            Action::Close => {
                self.session.close();
                self.scroll = 0;
            }
            Action::Submit(prompt) => {
                if self.session.submit(prompt) {
                    self.scroll = 0;
                }
            }
            Action::Retry => {
                if self.session.retry() {
                    self.scroll = 0;
                }
            }
            Action::Insert(c) => self.update_draft(|draft| draft.push(c)),
            Action::Backspace => self.update_draft(|draft| {
                draft.pop();
            }),
            Action::ClearDraft => self.update_draft(String::clear),
            Action::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            Action::ScrollDown => {
                let max = self
                    .overlay_layout()
                    .map_or(0, |layout| layout.max_scroll());
                self.scroll = (self.scroll + 1).min(max);
            }
            Action::Quit => self.should_quit = true,
            Action::None => {}
        }
    }

    /// Apply backend answers that have already arrived.
    pub fn poll_completions(&mut self) {
        if self.session.poll_completions() > 0 {
            self.scroll = 0;
        }
    }

    /// Wait for the next backend answer and apply it.
    ///
    /// Returns whether it changed the widget.
    pub async fn next_completion(&mut self) -> bool {
        let changed = self.session.next_completion().await;
        if changed {
            self.scroll = 0;
        }
        changed
    }

    /// Advance the animation frame.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    fn update_draft(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(WidgetState::Input { draft_text }) = self.state() else {
            return;
        };
        let mut draft = draft_text.clone();
        edit(&mut draft);
        self.session.edit_draft(draft);
    }
}
