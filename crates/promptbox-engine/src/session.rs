//! Async driver tying a [`WidgetController`] to an [`InferenceClient`].
//!
//! The controller itself never awaits. `Session::submit` spawns the
//! backend call on the tokio runtime and the call's outcome comes back as a
//! [`Completion`] over a channel owned by the session. The host applies
//! completions from its event loop, so all state changes still happen on a
//! single logical thread.

use crate::client::InferenceClient;
use crate::controller::{Ticket, WidgetController};
use crate::failure::InferenceFailure;
use crate::state::WidgetState;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};

/// Outcome of one backend call, tagged with the request it belongs to.
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub outcome: Result<String, InferenceFailure>,
}

/// Shown when a backend task stops without producing an outcome.
const TASK_LOST_MESSAGE: &str = "Backend stopped without answering";

/// What woke [`Session::next_completion`].
enum Wake {
    Completion(Option<Completion>),
    TaskEnded(Result<(), JoinError>),
}

/// A widget controller plus the machinery to run its requests.
pub struct Session {
    controller: WidgetController,
    client: Arc<dyn InferenceClient>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    task: Option<JoinHandle<()>>,
}

impl Session {
    /// Create a session around an existing controller.
    pub fn new(client: Arc<dyn InferenceClient>, controller: WidgetController) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            client,
            completion_tx,
            completion_rx,
            task: None,
        }
    }

    /// The underlying controller.
    pub fn controller(&self) -> &WidgetController {
        &self.controller
    }

    /// Current widget state, `None` when closed.
    pub fn state(&self) -> Option<&WidgetState> {
        self.controller.state()
    }

    /// Name of the backend answering prompts.
    pub fn backend_name(&self) -> &str {
        self.client.name()
    }

    /// Subscribe to widget state changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<WidgetState>> {
        self.controller.subscribe()
    }

    /// Show the widget with an empty draft.
    pub fn open(&mut self) {
        self.controller.open();
        self.detach_task();
    }

    /// Dismiss the widget. A pending backend call is detached.
    pub fn close(&mut self) {
        self.controller.close();
        self.detach_task();
    }

    /// Replace the draft while typing.
    pub fn edit_draft(&mut self, draft_text: impl Into<String>) -> bool {
        self.controller.edit_draft(draft_text)
    }

    /// Go back to input after a result or error.
    pub fn retry(&mut self) -> bool {
        self.controller.retry()
    }

    /// Submit a prompt and start the backend call.
    ///
    /// Returns `false` if the controller refused the submission (for example
    /// because a request is already loading).
    pub fn submit(&mut self, prompt_text: impl Into<String>) -> bool {
        let Some(ticket) = self.controller.submit(prompt_text) else {
            return false;
        };

        let client = Arc::clone(&self.client);
        let tx = self.completion_tx.clone();
        self.task = Some(tokio::spawn(async move {
            let outcome = client.generate(ticket.prompt_text()).await;
            // The receiver lives as long as the session; a send error only
            // means the session is gone and nobody cares about this answer.
            let _ = tx.send(Completion { ticket, outcome });
        }));
        true
    }

    /// Apply a completion. Returns `true` if it changed the widget.
    pub fn apply(&mut self, completion: Completion) -> bool {
        let applied = self
            .controller
            .resolve(&completion.ticket, completion.outcome);
        if applied {
            self.task = None;
        }
        applied
    }

    /// Apply every completion that has already arrived, without waiting.
    ///
    /// Returns how many of them changed the widget. A backend task that
    /// ended without reporting counts as a failure.
    pub fn poll_completions(&mut self) -> usize {
        let finished = self.task.as_ref().is_some_and(JoinHandle::is_finished);
        let mut applied = self.drain_completions();
        if finished && self.task.is_some() {
            self.task = None;
            if self.fail_in_flight(InferenceFailure::new(TASK_LOST_MESSAGE)) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next completion and apply it.
    ///
    /// Returns whether it changed the widget. Waits forever if nothing is in
    /// flight, so callers should check [`is_loading`](Self::is_loading) first.
    pub async fn next_completion(&mut self) -> bool {
        let wake = match self.task.as_mut() {
            Some(task) => tokio::select! {
                biased;
                completion = self.completion_rx.recv() => Wake::Completion(completion),
                joined = task => Wake::TaskEnded(joined),
            },
            None => Wake::Completion(self.completion_rx.recv().await),
        };

        match wake {
            Wake::Completion(Some(completion)) => self.apply(completion),
            Wake::Completion(None) => false,
            Wake::TaskEnded(joined) => {
                self.task = None;
                // A task that finished normally has already sent its answer
                if self.drain_completions() > 0 {
                    return true;
                }
                if let Err(e) = joined {
                    tracing::error!(backend = %self.client.name(), error = %e, "backend task failed");
                }
                self.fail_in_flight(InferenceFailure::new(TASK_LOST_MESSAGE))
            }
        }
    }

    /// Whether a request is outstanding.
    pub fn is_loading(&self) -> bool {
        matches!(self.state(), Some(WidgetState::Loading { .. }))
    }

    fn drain_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            if self.apply(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Resolve the in-flight request, if any, with `failure`.
    fn fail_in_flight(&mut self, failure: InferenceFailure) -> bool {
        match self.controller.in_flight().cloned() {
            Some(ticket) => self.controller.resolve(&ticket, Err(failure)),
            None => false,
        }
    }

    /// Drop our handle on a superseded request. The backend process is
    /// killed when its future is dropped; its completion, if one still
    /// arrives, is discarded by the controller's generation check.
    fn detach_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.detach_task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockClient;
    use async_trait::async_trait;
    use std::time::Duration;

    struct PanickingClient;

    #[async_trait]
    impl InferenceClient for PanickingClient {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, InferenceFailure> {
            panic!("backend blew up");
        }
    }

    fn session_with(client: &MockClient) -> Session {
        Session::new(Arc::new(client.clone()), WidgetController::new())
    }

    #[tokio::test]
    async fn test_submit_resolves_to_result() {
        let client = MockClient::new();
        client.push_text("world");
        let mut session = session_with(&client);

        assert!(session.submit("hello"));
        assert!(session.is_loading());
        assert!(session.next_completion().await);

        assert_eq!(
            session.state(),
            Some(&WidgetState::Result {
                prompt_text: "hello".into(),
                result_text: "world".into(),
            })
        );
        assert_eq!(client.requests(), vec!["hello"]);
    }

    #[tokio::test]
    async fn test_submit_rejects_to_error() {
        let client = MockClient::new();
        client.push_failure(InferenceFailure::new("timeout"));
        let mut session = session_with(&client);

        session.submit("x");
        assert!(session.next_completion().await);
        assert_eq!(
            session.state(),
            Some(&WidgetState::Error {
                prompt_text: "x".into(),
                message: "timeout".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_close_while_loading_ignores_late_answer() {
        let client = MockClient::new();
        let gate = client.push_gated();
        let mut session = session_with(&client);

        session.submit("x");
        let ticket = session.controller().in_flight().cloned().unwrap();
        session.close();

        // The spawned call is detached; the gate may already be closed.
        let _ = gate.send(Ok("y".into()));
        assert!(!session.apply(Completion {
            ticket,
            outcome: Ok("y".into()),
        }));
        assert_eq!(session.poll_completions(), 0);
        assert!(session.state().is_none());
    }

    #[tokio::test]
    async fn test_stale_completion_through_channel_is_dropped() {
        let client = MockClient::new();
        let _first = client.push_gated();
        let second = client.push_gated();
        let mut session = session_with(&client);

        session.submit("x");
        // Let the first call take its reply before it is superseded
        while client.requests().is_empty() {
            tokio::task::yield_now().await;
        }
        let stale = session.controller().in_flight().cloned().unwrap();
        session.close();
        session.open();
        session.submit("x");

        // Same prompt, older generation
        session
            .completion_tx
            .send(Completion {
                ticket: stale,
                outcome: Ok("old answer".into()),
            })
            .unwrap();
        assert_eq!(session.poll_completions(), 0);
        assert_eq!(
            session.state(),
            Some(&WidgetState::Loading {
                prompt_text: "x".into()
            })
        );

        second.send(Ok("new answer".into())).unwrap();
        assert!(session.next_completion().await);
        assert_eq!(
            session.state(),
            Some(&WidgetState::Result {
                prompt_text: "x".into(),
                result_text: "new answer".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_panicking_backend_becomes_error() {
        let mut session = Session::new(Arc::new(PanickingClient), WidgetController::new());

        session.submit("x");
        let changed = tokio::time::timeout(Duration::from_secs(5), session.next_completion())
            .await
            .expect("session hung on a dead task");
        assert!(changed);
        assert_eq!(
            session.state(),
            Some(&WidgetState::Error {
                prompt_text: "x".into(),
                message: TASK_LOST_MESSAGE.into(),
            })
        );
    }

    #[tokio::test]
    async fn test_poll_reaps_panicking_backend() {
        let mut session = Session::new(Arc::new(PanickingClient), WidgetController::new());

        session.submit("x");
        let reaped = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if session.poll_completions() > 0 {
                    break;
                }
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(reaped.is_ok());
        assert!(matches!(session.state(), Some(WidgetState::Error { .. })));
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_second_submit_while_pending_is_ignored() {
        let client = MockClient::new();
        let gate = client.push_gated();
        client.push_text("for z");
        let mut session = session_with(&client);

        assert!(session.submit("x"));
        let in_flight = session.controller().in_flight().cloned();
        assert!(!session.submit("z"));
        assert_eq!(session.controller().in_flight().cloned(), in_flight);

        gate.send(Ok("for x".into())).unwrap();
        assert!(session.next_completion().await);
        assert_eq!(
            session.state(),
            Some(&WidgetState::Result {
                prompt_text: "x".into(),
                result_text: "for x".into(),
            })
        );
        assert_eq!(client.requests(), vec!["x"]);
    }

    #[tokio::test]
    async fn test_poll_completions_is_non_blocking() {
        let client = MockClient::new();
        let gate = client.push_gated();
        let mut session = session_with(&client);

        session.submit("x");
        assert_eq!(session.poll_completions(), 0);
        assert!(session.is_loading());

        gate.send(Ok("y".into())).unwrap();
        assert!(session.next_completion().await);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_retry_then_resubmit() {
        let client = MockClient::new();
        client.push_failure(InferenceFailure::unknown());
        client.push_text("second time lucky");
        let mut session = session_with(&client);

        session.submit("x");
        session.next_completion().await;
        assert!(session.retry());
        assert_eq!(
            session.state(),
            Some(&WidgetState::Input {
                draft_text: "x".into()
            })
        );
        // Retrying alone never calls the backend again.
        assert_eq!(client.requests().len(), 1);

        session.submit("x");
        session.next_completion().await;
        assert!(matches!(session.state(), Some(WidgetState::Result { .. })));
        assert_eq!(client.requests(), vec!["x", "x"]);
    }
}
