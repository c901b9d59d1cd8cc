//! Pure mapping from widget state to what the overlay shows.
//!
//! [`present`] decides *what* is on screen for a state: which body, which
//! buttons, which labels. The [`PromptBox`](crate::ui::widgets::PromptBox)
//! widget decides *where* and draws it. Keeping the two apart lets the
//! mapping be tested without a terminal.

use crate::event::Action;
use promptbox_engine::WidgetState;

/// Overlay title.
pub const TITLE: &str = " AI Prompt ";

/// Label shown while a request is loading.
pub const LOADING_LABEL: &str = "Generating response...";

/// Everything the overlay shows for one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub title: &'static str,
    pub body: Body,
    pub buttons: Vec<Button>,
}

/// Main content of the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Single-line prompt field.
    Field { draft: String, placeholder: String },
    /// Indeterminate progress indicator with a static label.
    Progress { label: &'static str },
    /// Generated text, shown verbatim.
    Text(String),
    /// Failure description, already prefixed for display.
    Failure(String),
}

/// Where a button sits on the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// In the top border, right-aligned.
    Corner,
    /// In the row under the body.
    Row,
}

/// A clickable affordance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: &'static str,
    /// Key that triggers the same action, for hints.
    pub key: &'static str,
    pub action: Action,
    pub placement: Placement,
}

impl Button {
    fn corner_close() -> Self {
        Self {
            label: crate::ui::theme::Symbols::CLOSE,
            key: "Esc",
            action: Action::Close,
            placement: Placement::Corner,
        }
    }

    fn row(label: &'static str, key: &'static str, action: Action) -> Self {
        Self {
            label,
            key,
            action,
            placement: Placement::Row,
        }
    }
}

/// Map a widget state to its presentation.
pub fn present(state: &WidgetState, placeholder: &str) -> Presentation {
    let (body, buttons) = match state {
        WidgetState::Input { draft_text } => (
            Body::Field {
                draft: draft_text.clone(),
                placeholder: placeholder.to_string(),
            },
            vec![Button::corner_close()],
        ),
        // No input control while loading, so nothing can be submitted twice.
        WidgetState::Loading { .. } => (
            Body::Progress {
                label: LOADING_LABEL,
            },
            vec![Button::corner_close()],
        ),
        WidgetState::Result { result_text, .. } => (
            Body::Text(result_text.clone()),
            vec![
                Button::row("Try Again", "Enter", Action::Retry),
                Button::row("Close", "Esc", Action::Close),
            ],
        ),
        WidgetState::Error { message, .. } => (
            Body::Failure(format!("Error: {message}")),
            vec![
                Button::row("Retry", "Enter", Action::Retry),
                Button::row("Close", "Esc", Action::Close),
            ],
        ),
    };

    Presentation {
        title: TITLE,
        body,
        buttons,
    }
}

impl Presentation {
    /// Buttons placed in the row under the body.
    pub fn row_buttons(&self) -> impl Iterator<Item = &Button> {
        self.buttons
            .iter()
            .filter(|b| b.placement == Placement::Row)
    }

    /// The corner button, if any.
    pub fn corner_button(&self) -> Option<&Button> {
        self.buttons
            .iter()
            .find(|b| b.placement == Placement::Corner)
    }
}
