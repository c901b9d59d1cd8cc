//! Widget lifecycle controller.
//!
//! [`WidgetController`] is the only mutator of the widget state. It is a
//! plain synchronous state machine: submitting a prompt hands back a
//! [`Ticket`], whoever runs the inference call later passes that ticket back
//! to [`WidgetController::resolve`] together with the outcome.
//!
//! Every `open`, `close` and `submit` advances a generation counter. A
//! resolution is applied only while the controller is still loading the
//! exact request the ticket names, so a late answer for a closed or
//! restarted widget can never overwrite newer state.
//!
//! ```text
//! Input --submit(p)--> Loading --(success)--> Result --retry--> Input
//!                          \--(failure)-----> Error  --retry--> Input
//! (close) from any state --> closed (no further transitions)
//! ```

use crate::failure::InferenceFailure;
use crate::state::WidgetState;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Identifies one submitted request.
///
/// Returned by [`WidgetController::submit`] and consumed by
/// [`WidgetController::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    prompt_text: String,
}

impl Ticket {
    /// Generation the request was issued under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Prompt the request was issued for.
    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }
}

/// Owns the widget state and mediates every transition.
#[derive(Debug)]
pub struct WidgetController {
    /// `None` once the widget has been closed.
    state: Option<WidgetState>,
    generation: u64,
    in_flight: Option<Ticket>,
    view_tx: watch::Sender<Option<WidgetState>>,
}

impl WidgetController {
    /// Create an open controller in the empty input state.
    pub fn new() -> Self {
        let state = Some(WidgetState::empty_input());
        let (view_tx, _) = watch::channel(state.clone());
        Self {
            state,
            generation: 0,
            in_flight: None,
            view_tx,
        }
    }

    /// Create a controller whose widget is not shown until [`open`](Self::open).
    pub fn closed() -> Self {
        let (view_tx, _) = watch::channel(None);
        Self {
            state: None,
            generation: 0,
            in_flight: None,
            view_tx,
        }
    }

    /// Current state, or `None` if the widget is closed.
    pub fn state(&self) -> Option<&WidgetState> {
        self.state.as_ref()
    }

    /// Whether the widget is currently shown.
    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    /// Current generation. Changes on every open, close and submit.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The request currently awaiting resolution, if any.
    pub fn in_flight(&self) -> Option<&Ticket> {
        self.in_flight.as_ref()
    }

    /// Subscribe to state changes. The receiver sees the state after every
    /// transition, `None` meaning the widget was closed.
    pub fn subscribe(&self) -> watch::Receiver<Option<WidgetState>> {
        self.view_tx.subscribe()
    }

    /// Show the widget with an empty draft.
    ///
    /// Idempotent: opening an open widget just resets the draft. Any request
    /// still in flight is superseded and its result will be dropped.
    pub fn open(&mut self) {
        self.supersede();
        debug!(generation = self.generation, "widget opened");
        self.transition(Some(WidgetState::empty_input()));
    }

    /// Dismiss the widget.
    ///
    /// The in-flight request, if any, is not cancelled at the backend; its
    /// eventual resolution is simply ignored.
    pub fn close(&mut self) {
        if self.state.is_none() {
            return;
        }
        self.supersede();
        debug!(generation = self.generation, "widget closed");
        self.transition(None);
    }

    /// Replace the draft while the user is typing.
    ///
    /// Returns `false` (and changes nothing) outside the input state.
    pub fn edit_draft(&mut self, draft_text: impl Into<String>) -> bool {
        if !matches!(self.state, Some(WidgetState::Input { .. })) {
            return false;
        }
        self.transition(Some(WidgetState::Input {
            draft_text: draft_text.into(),
        }));
        true
    }

    /// Start generating for `prompt_text`.
    ///
    /// Only valid from the input state. Anywhere else, in particular while a
    /// request is already loading, this is a no-op returning `None`.
    pub fn submit(&mut self, prompt_text: impl Into<String>) -> Option<Ticket> {
        if !matches!(self.state, Some(WidgetState::Input { .. })) {
            debug!(
                phase = ?self.state.as_ref().map(WidgetState::phase),
                "submit ignored"
            );
            return None;
        }

        let prompt_text = prompt_text.into();
        self.generation += 1;
        let ticket = Ticket {
            generation: self.generation,
            prompt_text: prompt_text.clone(),
        };
        self.in_flight = Some(ticket.clone());

        info!(generation = self.generation, chars = prompt_text.chars().count(), "prompt submitted");
        self.transition(Some(WidgetState::Loading { prompt_text }));
        Some(ticket)
    }

    /// Apply the outcome of the request named by `ticket`.
    ///
    /// Returns `true` if the outcome was displayed. Outcomes for anything
    /// other than the current in-flight request are dropped.
    pub fn resolve(&mut self, ticket: &Ticket, outcome: Result<String, InferenceFailure>) -> bool {
        let is_current = self.in_flight.as_ref() == Some(ticket)
            && matches!(
                &self.state,
                Some(WidgetState::Loading { prompt_text }) if *prompt_text == ticket.prompt_text
            );
        if !is_current {
            debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "dropping stale resolution"
            );
            return false;
        }

        self.in_flight = None;
        let prompt_text = ticket.prompt_text.clone();
        let next = match outcome {
            Ok(result_text) => {
                debug!(generation = ticket.generation, "generation succeeded");
                WidgetState::Result {
                    prompt_text,
                    result_text,
                }
            }
            Err(failure) => {
                warn!(generation = ticket.generation, error = %failure, "generation failed");
                WidgetState::Error {
                    prompt_text,
                    message: failure.describe(),
                }
            }
        };
        self.transition(Some(next));
        true
    }

    /// Go back to the input state after a result or error.
    ///
    /// Policy: the draft is pre-filled with the last prompt so the user can
    /// edit or resubmit it. Retrying never re-issues the request by itself.
    /// Returns `false` outside the result and error states.
    pub fn retry(&mut self) -> bool {
        let draft_text = match &self.state {
            Some(WidgetState::Result { prompt_text, .. } | WidgetState::Error { prompt_text, .. }) => {
                prompt_text.clone()
            }
            _ => return false,
        };
        debug!("retry");
        self.transition(Some(WidgetState::Input { draft_text }));
        true
    }

    fn supersede(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }

    fn transition(&mut self, next: Option<WidgetState>) {
        self.state = next;
        self.view_tx.send_replace(self.state.clone());
    }
}

impl Default for WidgetController {
    fn default() -> Self {
        Self::new()
    }
}
