//! The widget's finite-state model.

use std::fmt;

/// Every state an open widget can be in.
///
/// A closed widget has no state at all; see
/// [`WidgetController::state`](crate::WidgetController::state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetState {
    /// Waiting for the user to type a prompt.
    Input { draft_text: String },
    /// A generation is outstanding for `prompt_text`.
    Loading { prompt_text: String },
    /// The backend answered.
    Result {
        prompt_text: String,
        result_text: String,
    },
    /// The backend failed.
    Error {
        prompt_text: String,
        message: String,
    },
}

impl WidgetState {
    /// A fresh input state with an empty draft.
    pub fn empty_input() -> Self {
        Self::Input {
            draft_text: String::new(),
        }
    }

    /// The kind of this state, without its payload.
    pub fn phase(&self) -> Phase {
        match self {
            Self::Input { .. } => Phase::Input,
            Self::Loading { .. } => Phase::Loading,
            Self::Result { .. } => Phase::Result,
            Self::Error { .. } => Phase::Error,
        }
    }

    /// The prompt this state is about. `None` while still drafting.
    pub fn prompt_text(&self) -> Option<&str> {
        match self {
            Self::Input { .. } => None,
            Self::Loading { prompt_text }
            | Self::Result { prompt_text, .. }
            | Self::Error { prompt_text, .. } => Some(prompt_text),
        }
    }
}

impl Default for WidgetState {
    fn default() -> Self {
        Self::empty_input()
    }
}

/// Payload-free discriminant of [`WidgetState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Input,
    Loading,
    Result,
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Loading => write!(f, "loading"),
            Self::Result => write!(f, "result"),
            Self::Error => write!(f, "error"),
        }
    }
}
