//! promptbox-engine: Headless core for the promptbox prompt overlay
//!
//! This crate provides everything that does not touch a terminal:
//! - The widget state machine and its controller
//! - The inference backend abstraction and a process-backed client
//! - An async session that runs backend calls for a controller
//! - Configuration and backend discovery

pub mod client;
pub mod config;
pub mod controller;
pub mod discovery;
pub mod failure;
pub mod mock;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use client::{CommandClient, InferenceClient, EMPTY_RESPONSE};
pub use config::{
    BackendConfig, Config, ConfigError, Hotkey, PromptDelivery, CONFIG_FILE, PROMPTBOX_DIR,
    PROMPT_PLACEHOLDER,
};
pub use controller::{Ticket, WidgetController};
pub use discovery::{discover_backend, BackendStatus};
pub use failure::{InferenceFailure, GENERIC_FAILURE_MESSAGE};
pub use mock::{MockClient, MockReply, ReplyGate};
pub use session::{Completion, Session};
pub use state::{Phase, WidgetState};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
