use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::filter::FilterMode;
use crate::tui::app::{App, Hit};
use crate::util::unicode;

use super::helpers::spans_width;

/// Render the header: title, filter tabs, remaining count, separator line
pub fn render_header(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // separator
        ])
        .split(area);

    render_tabs(frame, app, chunks[0]);

    let sep = Paragraph::new("\u{2500}".repeat(area.width as usize))
        .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
    frame.render_widget(sep, chunks[1]);
}

fn render_tabs(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let bg_style = Style::default().bg(bg);
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));

    let mut spans: Vec<Span> = vec![
        Span::styled(" ", bg_style),
        Span::styled("\u{25B6}", Style::default().fg(app.theme.purple).bg(bg)),
        Span::styled(
            " Planner ",
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    spans.push(sep.clone());

    for mode in FilterMode::ALL {
        let is_current = app.filter == mode;
        let label = format!(" {} ", mode.label());
        let x = area.x + spans_width(&spans) as u16;
        let w = unicode::display_width(&label) as u16;
        if x < area.right() {
            let w = w.min(area.right() - x);
            app.hits
                .push((Rect::new(x, area.y, w, 1), Hit::Filter(mode)));
        }
        spans.push(Span::styled(label, tab_style(app, is_current)));
        spans.push(sep.clone());
    }

    let remaining = app.remaining();
    let count = format!(
        "{} {} left ",
        remaining,
        if remaining == 1 { "item" } else { "items" }
    );
    let used = spans_width(&spans);
    let count_width = unicode::display_width(&count);
    let width = area.width as usize;
    if used + count_width < width {
        spans.push(Span::styled(" ".repeat(width - used - count_width), bg_style));
        spans.push(Span::styled(
            count,
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    let tabs = Paragraph::new(Line::from(spans)).style(bg_style);
    frame.render_widget(tabs, area);
}

fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text).bg(app.theme.background)
    }
}
