//! Text wrapping utilities.

use std::borrow::Cow;

/// Columns a tab expands to before wrapping.
const TAB_WIDTH: usize = 4;

/// Wrap a plain text string to the specified width.
///
/// Words longer than `width` are broken across lines rather than cut off,
/// and blank lines in the input are kept. Tabs are expanded and carriage
/// returns dropped so every returned line renders at its measured width.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let normalized: Cow<'_, str> = if text.contains(['\t', '\r']) {
        Cow::Owned(
            text.replace('\r', "")
                .replace('\t', &" ".repeat(TAB_WIDTH)),
        )
    } else {
        Cow::Borrowed(text)
    };

    if width == 0 {
        return normalized.lines().map(str::to_string).collect();
    }

    let options = textwrap::Options::new(width).break_words(true);
    textwrap::wrap(&normalized, options)
        .into_iter()
        .map(Cow::into_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_short() {
        let result = wrap_text("hello", 20);
        assert_eq!(result, vec!["hello"]);
    }

    #[test]
    fn test_wrap_text_long() {
        let result = wrap_text("hello world this is a long line", 10);
        assert!(result.len() > 1);
        for line in &result {
            assert!(line.len() <= 10);
        }
    }

    #[test]
    fn test_wrap_text_breaks_unbroken_words() {
        let long = "a".repeat(25);
        let result = wrap_text(&long, 10);
        assert_eq!(result, vec!["a".repeat(10), "a".repeat(10), "a".repeat(5)]);
    }

    #[test]
    fn test_wrap_text_keeps_blank_lines() {
        let result = wrap_text("first\n\nthird", 20);
        assert_eq!(result, vec!["first", "", "third"]);
    }

    #[test]
    fn test_wrap_text_expands_tabs() {
        let result = wrap_text("a\tb\r\n", 20);
        assert_eq!(result[0], "a    b");
    }

    #[test]
    fn test_wrap_text_unicode() {
        let result = wrap_text("日本語のテキスト", 6);
        assert!(!result.is_empty());
        assert_eq!(result.concat(), "日本語のテキスト");
    }
}
