//! Text rendering utilities.
//!
//! - [`wrap_text`] - Wrap result text without losing long unbroken words
//! - [`visual_width`], [`tail_to_width`] - Unicode-aware width helpers

mod width;
mod wrap;

pub use width::{tail_to_width, visual_width};
pub use wrap::wrap_text;
