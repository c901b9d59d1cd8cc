//! Widgets for the promptbox TUI.

pub mod prompt_box;
pub mod status_bar;

pub use prompt_box::PromptBox;
pub use status_bar::{KeyHint, StatusBar};
