//! Text width utilities.
//!
//! Provides unicode-aware text width calculation.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Get the visual width of a string in terminal cells.
///
/// Accounts for wide characters (CJK, emoji) that take 2 cells.
pub fn visual_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Keep the end of `s` that fits within `max_width` cells.
///
/// Used by single-line fields so the text nearest the cursor stays visible.
pub fn tail_to_width(s: &str, max_width: usize) -> &str {
    if visual_width(s) <= max_width {
        return s;
    }

    let mut width = 0;
    let mut start = s.len();
    for (idx, ch) in s.char_indices().rev() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        width += ch_width;
        start = idx;
    }
    &s[start..]
}
