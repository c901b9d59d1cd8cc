//! Host screen - the backdrop the prompt overlay floats over.

use crate::app::App;
use crate::screens::Screen;
use crate::ui::layout::main_layout;
use crate::ui::theme::{spinner, Styles, Symbols};
use crate::ui::widgets::{KeyHint, PromptBox, StatusBar};
use promptbox_engine::WidgetState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// The host screen.
pub struct HostScreen;

impl Screen for HostScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let (main_area, status_area) = main_layout(area);

        render_backdrop(app, main_area, buf);

        let presentation = app.presentation();
        let hotkey = app.hotkey().to_string();

        let (mode, hints) = match (app.state(), &presentation) {
            (Some(state), Some(presentation)) => {
                let mut hints = Vec::new();
                if matches!(state, WidgetState::Input { .. }) {
                    hints.push(KeyHint::new("Enter", "Submit"));
                }
                for button in &presentation.buttons {
                    let label = if button.label == Symbols::CLOSE {
                        "Close"
                    } else {
                        button.label
                    };
                    hints.push(KeyHint::new(button.key, label));
                }
                let mode = match state {
                    WidgetState::Loading { .. } => {
                        format!("{} {}", spinner(app.tick_count()), state.phase())
                    }
                    _ => state.phase().to_string(),
                };
                (mode, hints)
            }
            _ => (
                "promptbox".to_string(),
                vec![KeyHint::new(hotkey, "Open"), KeyHint::new("q", "Quit")],
            ),
        };

        StatusBar::new(&mode)
            .hints(hints)
            .right(app.backend_name())
            .render(status_area, buf);

        if let Some(presentation) = &presentation {
            PromptBox::new(presentation)
                .tick(app.tick_count())
                .scroll(app.scroll())
                .render(main_area, buf);
        }
    }
}

fn render_backdrop(app: &App, area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("  promptbox", Styles::title())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Backend: ", Styles::host()),
            Span::styled(app.backend_name().to_string(), Styles::host()),
        ]),
        Line::from(Span::styled(
            format!("  {} opens the prompt box.", app.hotkey()),
            Styles::host(),
        )),
    ];

    Paragraph::new(lines)
        .style(Styles::host())
        .render(area, buf);
}
