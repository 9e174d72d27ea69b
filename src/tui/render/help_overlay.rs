use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("\u{2191}\u{2193}/jk", "Move cursor"),
            ("g/G", "Jump to top/bottom"),
            ("Tab/S-Tab", "Next/previous filter"),
            ("1-4", "All, Active, Completed, Overdue"),
            ("/", "Search"),
        ],
    ),
    (
        "Tasks",
        &[
            ("a", "Add a task"),
            ("space/x", "Toggle done"),
            ("e/Enter", "Edit inline"),
            ("d/Del", "Delete (asks first)"),
            ("A", "Toggle all visible"),
            ("m", "Move: j/k target, Enter drop"),
        ],
    ),
    (
        "Subtasks",
        &[
            ("s", "Add subtask to task"),
            ("space/x", "Toggle subtask"),
            ("d/Del", "Delete subtask"),
        ],
    ),
    (
        "Mouse",
        &[
            ("click", "Checkbox, [e], [d], tabs, [Add]"),
            ("drag", "Drop a task on another to move it"),
        ],
    ),
    (
        "Global",
        &[("?", "Toggle this help"), ("q/Ctrl+C", "Quit")],
    ),
];

const OVERLAY_WIDTH: u16 = 56;

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(" Key Bindings", header_style)),
        Line::from(""),
    ];
    for (title, bindings) in SECTIONS {
        lines.push(Line::from(Span::styled(format!(" {}", title), header_style)));
        for (key, desc) in *bindings {
            lines.push(Line::from(vec![
                Span::styled(format!(" {:<14}", key), key_style),
                Span::styled(*desc, desc_style),
            ]));
        }
        lines.push(Line::from(""));
    }

    let overlay_area = overlay_rect(area, OVERLAY_WIDTH, lines.len() as u16 + 2);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, overlay_area);
}

/// A `width` x `height` box centered in `area`, shrunk to fit
fn overlay_rect(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}
