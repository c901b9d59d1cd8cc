//! UI module for the promptbox TUI.

pub mod layout;
pub mod theme;
pub mod widgets;
