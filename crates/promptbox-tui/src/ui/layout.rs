//! Layout helpers for the promptbox TUI.
//!
//! [`OverlayLayout`] is computed from the host area and a presentation
//! alone, so drawing and mouse hit-testing always agree on where things are.

use crate::event::Action;
use crate::text::{visual_width, wrap_text};
use crate::view::{Body, Presentation};
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

/// Preferred overlay width, borders included.
pub const OVERLAY_WIDTH: u16 = 46;

/// Gap between the top of the host and the overlay.
pub const MARGIN_TOP: u16 = 1;

/// Gap between the right edge of the host and the overlay.
pub const MARGIN_RIGHT: u16 = 2;

/// Blank columns between the border and the body on each side.
const PADDING_X: u16 = 1;

/// Create the main layout with status bar at bottom.
pub fn main_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Screen position of one button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonHit {
    pub area: Rect,
    pub label: &'static str,
    pub action: Action,
}

/// Where every part of the overlay goes for a given host area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLayout {
    /// The whole overlay, borders included.
    pub area: Rect,
    /// Content region inside border and padding.
    pub body: Rect,
    /// Button positions, corner button first.
    pub buttons: Vec<ButtonHit>,
    /// Total body lines before any clipping.
    pub content_lines: usize,
}

/// Number of lines the body needs at a given width.
pub fn body_lines(body: &Body, width: u16) -> usize {
    match body {
        Body::Field { .. } => 1,
        Body::Progress { .. } => 2,
        Body::Text(text) | Body::Failure(text) => wrap_text(text, width as usize).len().max(1),
    }
}

impl OverlayLayout {
    /// Lay the overlay out in the top-right corner of `host`.
    pub fn compute(host: Rect, presentation: &Presentation) -> Self {
        let width = OVERLAY_WIDTH.min(host.width);
        let x = host.x + host.width.saturating_sub(width + MARGIN_RIGHT);
        let y = host.y + MARGIN_TOP.min(host.height);

        let body_width = width.saturating_sub(2 + 2 * PADDING_X);
        let content_lines = body_lines(&presentation.body, body_width);
        let has_row = presentation.row_buttons().next().is_some();
        let row_height: u16 = if has_row { 2 } else { 0 };

        let wanted = u16::try_from(content_lines)
            .unwrap_or(u16::MAX)
            .saturating_add(2 + row_height);
        let height = wanted.min(host.height.saturating_sub(MARGIN_TOP));

        let area = Rect::new(x, y, width, height);
        let body = Rect::new(
            x + 1 + PADDING_X,
            y + 1,
            body_width,
            height.saturating_sub(2 + row_height),
        );

        let mut buttons = Vec::new();
        if let Some(button) = presentation.corner_button() {
            if width >= 6 {
                buttons.push(ButtonHit {
                    area: Rect::new(x + width - 4, y, 3, 1),
                    label: button.label,
                    action: button.action.clone(),
                });
            }
        }
        if has_row && height >= 4 {
            let row_y = y + height - 2;
            let mut cursor_x = body.x;
            for button in presentation.row_buttons() {
                let button_width = u16::try_from(visual_width(button.label) + 2).unwrap_or(u16::MAX);
                if cursor_x + button_width > body.x + body.width {
                    break;
                }
                buttons.push(ButtonHit {
                    area: Rect::new(cursor_x, row_y, button_width, 1),
                    label: button.label,
                    action: button.action.clone(),
                });
                cursor_x += button_width + 1;
            }
        }

        Self {
            area,
            body,
            buttons,
            content_lines,
        }
    }

    /// The action of the button under a screen position, if any.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<&Action> {
        let position = Position::new(column, row);
        self.buttons
            .iter()
            .find(|b| b.area.contains(position))
            .map(|b| &b.action)
    }

    /// How far the body can scroll before its last line reaches the bottom.
    pub fn max_scroll(&self) -> usize {
        self.content_lines
            .saturating_sub(self.body.height as usize)
    }
}
