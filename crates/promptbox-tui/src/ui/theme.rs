//! Theme and styling definitions for the promptbox overlay.

use ratatui::style::{Color, Modifier, Style};

/// Color palette for the TUI.
pub struct Palette;

impl Palette {
    // Base colors
    pub const BG: Color = Color::Rgb(30, 30, 40);
    pub const FG: Color = Color::Rgb(220, 220, 230);
    pub const DIM: Color = Color::Rgb(140, 140, 160);

    // Accent colors
    pub const ACCENT: Color = Color::Rgb(85, 153, 255);

    // Host backdrop
    pub const HOST_BG: Color = Color::Rgb(18, 18, 24);

    // Status bar colors (high contrast)
    pub const STATUS_BG: Color = Color::Rgb(45, 45, 60);
    pub const STATUS_KEY_BG: Color = Color::Rgb(70, 90, 140);

    // Outcome colors
    pub const RESULT: Color = Color::Rgb(34, 238, 255);
    pub const ERROR: Color = Color::Rgb(255, 85, 85);

    // Border colors
    pub const BORDER: Color = Color::Rgb(170, 170, 170);
}

/// Glyphs used by the overlay (ASCII where a fallback matters).
pub struct Symbols;

impl Symbols {
    pub const CLOSE: &'static str = "×";
    pub const PROMPT: &'static str = "> ";
    pub const CURSOR: &'static str = "_";
    pub const SPINNER: [&'static str; 4] = ["|", "/", "-", "\\"];
}

/// Common styles used throughout the TUI.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::BG)
    }

    /// Dimmed text for secondary information.
    pub fn dim() -> Style {
        Style::default().fg(Palette::DIM).bg(Palette::BG)
    }

    /// Active/focused element.
    pub fn active() -> Style {
        Style::default().fg(Palette::ACCENT).bg(Palette::BG)
    }

    /// Generated result text.
    pub fn result() -> Style {
        Style::default().fg(Palette::RESULT).bg(Palette::BG)
    }

    /// Error text.
    pub fn error() -> Style {
        Style::default().fg(Palette::ERROR).bg(Palette::BG)
    }

    /// Title style.
    pub fn title() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Overlay border.
    pub fn border() -> Style {
        Style::default().fg(Palette::BORDER).bg(Palette::BG)
    }

    /// Clickable button in the overlay.
    pub fn button() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Palette::STATUS_KEY_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// The dismiss glyph in the overlay's corner.
    pub fn close_button() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::BG)
    }

    /// Empty host screen behind the overlay.
    pub fn host() -> Style {
        Style::default().fg(Palette::DIM).bg(Palette::HOST_BG)
    }

    /// Key hint style (for status bar) - bright on dark for visibility.
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Palette::STATUS_KEY_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint label style - readable on status bar background.
    pub fn key_label() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Status bar background style.
    pub fn status_bar() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }
}

/// Width of the moving segment in [`bounce_bar`].
const BOUNCE_SEGMENT: usize = 4;

/// One frame of an indeterminate progress bar: a short segment sliding back
/// and forth inside `[...]`, `width` cells wide in total.
pub fn bounce_bar(tick: usize, width: usize) -> String {
    let inner = width.saturating_sub(2);
    let segment = BOUNCE_SEGMENT.min(inner);
    let travel = inner - segment;

    let offset = if travel == 0 {
        0
    } else {
        let period = travel * 2;
        let step = tick % period;
        if step <= travel {
            step
        } else {
            period - step
        }
    };

    format!(
        "[{}{}{}]",
        " ".repeat(offset),
        "=".repeat(segment),
        " ".repeat(travel - offset)
    )
}

/// Spinner glyph for a tick.
pub fn spinner(tick: usize) -> &'static str {
    Symbols::SPINNER[tick % Symbols::SPINNER.len()]
}
