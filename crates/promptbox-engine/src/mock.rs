//! Scripted inference client for tests and demos.
//!
//! [`MockClient`] answers prompts from a queue of scripted replies and
//! records every prompt it receives. A gated reply stays pending until the
//! test releases it, which makes interleavings like "close while loading"
//! deterministic.

use crate::client::InferenceClient;
use crate::failure::InferenceFailure;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// Sender used to release a gated reply.
pub type ReplyGate = oneshot::Sender<Result<String, InferenceFailure>>;

/// One scripted reply.
#[derive(Debug)]
pub enum MockReply {
    /// Resolve immediately with text.
    Text(String),
    /// Fail immediately.
    Failure(InferenceFailure),
    /// Stay pending until the paired [`ReplyGate`] is used.
    Gated(oneshot::Receiver<Result<String, InferenceFailure>>),
}

/// Inference client that replays scripted replies in order.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn push_text(&self, text: impl Into<String>) -> &Self {
        lock(&self.replies).push_back(MockReply::Text(text.into()));
        self
    }

    /// Queue a failure.
    pub fn push_failure(&self, failure: InferenceFailure) -> &Self {
        lock(&self.replies).push_back(MockReply::Failure(failure));
        self
    }

    /// Queue a reply that stays pending until the returned gate is sent.
    pub fn push_gated(&self) -> ReplyGate {
        let (tx, rx) = oneshot::channel();
        lock(&self.replies).push_back(MockReply::Gated(rx));
        tx
    }

    /// Prompts received so far, in order.
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl InferenceClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String, InferenceFailure> {
        lock(&self.requests).push(prompt.to_string());
        let reply = lock(&self.replies).pop_front();

        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Failure(failure)) => Err(failure),
            Some(MockReply::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(InferenceFailure::new("reply gate dropped"))),
            None => Err(InferenceFailure::new("no scripted reply")),
        }
    }
}
