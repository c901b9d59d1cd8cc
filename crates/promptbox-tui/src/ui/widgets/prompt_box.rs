//! The floating prompt overlay.

use crate::text::{tail_to_width, visual_width, wrap_text};
use crate::ui::layout::OverlayLayout;
use crate::ui::theme::{bounce_bar, Styles, Symbols};
use crate::view::{Body, Presentation};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Draws a [`Presentation`] as an overlay in the top-right of the area it is
/// rendered into.
///
/// The overlay clears everything beneath it, so each render fully replaces
/// the previous one.
#[derive(Debug, Clone)]
pub struct PromptBox<'a> {
    presentation: &'a Presentation,
    /// Animation frame for the progress indicator.
    tick: usize,
    /// First body line shown, clamped to what the body can scroll.
    scroll: usize,
}

impl<'a> PromptBox<'a> {
    pub fn new(presentation: &'a Presentation) -> Self {
        Self {
            presentation,
            tick: 0,
            scroll: 0,
        }
    }

    /// Set the animation frame.
    #[must_use]
    pub fn tick(mut self, tick: usize) -> Self {
        self.tick = tick;
        self
    }

    /// Set the body scroll offset.
    #[must_use]
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

impl Widget for PromptBox<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = OverlayLayout::compute(area, self.presentation);
        if layout.area.width < 6 || layout.area.height < 3 {
            return;
        }

        Clear.render(layout.area, buf);
        Block::default()
            .title(Span::styled(self.presentation.title, Styles::title()))
            .borders(Borders::ALL)
            .border_style(Styles::border())
            .style(Styles::default())
            .render(layout.area, buf);

        let body = layout.body;
        if body.height > 0 && body.width > 0 {
            match &self.presentation.body {
                Body::Field { draft, placeholder } => {
                    render_field(draft, placeholder, body, buf);
                }
                Body::Progress { label } => render_progress(label, self.tick, body, buf),
                Body::Text(text) => {
                    let scroll = self.scroll.min(layout.max_scroll());
                    render_text(text, Styles::result(), scroll, body, buf);
                }
                Body::Failure(message) => {
                    let scroll = self.scroll.min(layout.max_scroll());
                    render_text(message, Styles::error(), scroll, body, buf);
                }
            }
        }

        for button in &layout.buttons {
            let style = if button.label == Symbols::CLOSE {
                Styles::close_button()
            } else {
                Styles::button()
            };
            buf.set_string(
                button.area.x,
                button.area.y,
                format!(" {} ", button.label),
                style,
            );
        }
    }
}

/// Single-line field: prompt marker, the tail of the draft, then a cursor.
fn render_field(draft: &str, placeholder: &str, area: Rect, buf: &mut Buffer) {
    let available = (area.width as usize)
        .saturating_sub(visual_width(Symbols::PROMPT) + visual_width(Symbols::CURSOR));

    let mut spans = vec![Span::styled(Symbols::PROMPT, Styles::active())];
    if draft.is_empty() {
        spans.push(Span::styled(Symbols::CURSOR, Styles::active()));
        spans.push(Span::styled(placeholder.to_string(), Styles::dim()));
    } else {
        spans.push(Span::styled(
            tail_to_width(draft, available).to_string(),
            Styles::default(),
        ));
        spans.push(Span::styled(Symbols::CURSOR, Styles::active()));
    }

    Paragraph::new(Line::from(spans))
        .style(Styles::default())
        .render(area, buf);
}

/// Sliding bar over a fixed label.
fn render_progress(label: &str, tick: usize, area: Rect, buf: &mut Buffer) {
    let bar_width = (area.width as usize).min(24);
    let lines = vec![
        Line::from(Span::styled(bounce_bar(tick, bar_width), Styles::active())),
        Line::from(Span::styled(label.to_string(), Styles::default())),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Styles::default())
        .render(area, buf);
}

/// Pre-wrapped text so long unbroken words still break at the edge.
fn render_text(text: &str, style: Style, scroll: usize, area: Rect, buf: &mut Buffer) {
    let lines: Vec<Line<'_>> = wrap_text(text, area.width as usize)
        .into_iter()
        .skip(scroll)
        .take(area.height as usize)
        .map(|line| Line::from(Span::styled(line, style)))
        .collect();
    Paragraph::new(lines)
        .style(Styles::default())
        .render(area, buf);
}
