use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::util::unicode;

const NAVIGATE_HINTS: &str =
    "a add  e edit  space done  d delete  s subtask  m move  / search  ? help";

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let bright = Style::default().fg(app.theme.text_bright).bg(bg);

    let (left, hint): (Vec<Span>, &str) = match app.mode {
        Mode::Navigate if app.drag.is_active() => (
            vec![Span::styled(" Drop on a task to move it", bright)],
            "",
        ),
        Mode::Navigate => {
            let hint = if app.config.ui.show_key_hints {
                NAVIGATE_HINTS
            } else {
                ""
            };
            (Vec::new(), hint)
        }
        Mode::Search => (
            vec![Span::styled(" Filtering as you type", dim)],
            "Enter keep  Esc clear",
        ),
        Mode::NewTask => (
            vec![Span::styled(" New task", bright)],
            "Tab switch field  Enter add  Esc cancel",
        ),
        Mode::Edit => (
            vec![Span::styled(" Editing", bright)],
            "Tab switch field  Enter save  Esc cancel",
        ),
        Mode::Subtask => (
            vec![Span::styled(" New subtask", bright)],
            "Enter add  Esc cancel",
        ),
        Mode::Confirm => {
            let prompt = app
                .confirm
                .as_ref()
                .map(|c| c.prompt.clone())
                .unwrap_or_default();
            (
                vec![Span::styled(
                    format!(" {} ", prompt),
                    Style::default()
                        .fg(app.theme.highlight)
                        .bg(bg)
                        .add_modifier(Modifier::BOLD),
                )],
                "y yes  n no",
            )
        }
        Mode::Move => {
            let name = app
                .drag
                .dragging()
                .and_then(|id| app.task(id))
                .map(|t| unicode::truncate_to_width(&t.description, 30))
                .unwrap_or_default();
            (
                vec![Span::styled(format!(" Moving \"{}\"", name), bright)],
                "j/k target  Enter drop  Esc cancel",
            )
        }
    };

    let width = area.width as usize;
    let mut spans = left;
    let used: usize = spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum();
    let hint_width = unicode::display_width(hint);
    if !hint.is_empty() && used + hint_width + 1 < width {
        spans.push(Span::styled(
            " ".repeat(width - used - hint_width - 1),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(hint, dim));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
