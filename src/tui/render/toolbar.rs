use chrono::Utc;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Field, Hit, Mode};

use super::helpers::{checkbox, field_spans, spans_width};

const DEADLINE_WIDTH: usize = 18;

/// Render the search line, the new-task line and the select-all line
pub fn render_toolbar(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // search
            Constraint::Length(1), // new task
            Constraint::Length(1), // select all
        ])
        .split(area);

    render_search_line(frame, app, chunks[0]);
    render_new_task_line(frame, app, chunks[1]);
    render_select_all_line(frame, app, chunks[2]);
}

fn field_style(app: &App, focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
    } else {
        Style::default()
            .fg(app.theme.text)
            .bg(app.theme.background)
            .add_modifier(Modifier::UNDERLINED)
    }
}

fn render_search_line(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let focused = app.mode == Mode::Search;
    let mut spans = vec![Span::styled(
        " / ",
        Style::default().fg(app.theme.highlight).bg(bg),
    )];
    let prefix = spans_width(&spans);
    let width = (area.width as usize).saturating_sub(prefix + 1);
    let (field, cursor) = field_spans(
        &app.search,
        "Search tasks",
        width,
        field_style(app, focused),
        Style::default().fg(app.theme.dim).bg(bg),
    );
    spans.extend(field);

    app.hits.push((area, Hit::SearchBox));
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        area,
    );
    if focused {
        frame.set_cursor_position(Position::new(
            area.x + (prefix + cursor) as u16,
            area.y,
        ));
    }
}

fn render_new_task_line(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let active = app.mode == Mode::NewTask;
    let focus = app.new_task.field;

    // " + " desc " due " deadline " [Add]"
    let total = area.width as usize;
    let fixed = 3 + 5 + DEADLINE_WIDTH + 6;
    let desc_width = total.saturating_sub(fixed).max(1);

    let mut spans = vec![Span::styled(
        " + ",
        Style::default().fg(app.theme.green).bg(bg),
    )];
    let desc_x = spans_width(&spans);
    let (desc, desc_cursor) = field_spans(
        &app.new_task.description,
        "What needs to be done?",
        desc_width,
        field_style(app, active && focus == Field::Description),
        dim,
    );
    spans.extend(desc);
    spans.push(Span::styled(" due ", dim));
    let deadline_x = spans_width(&spans);
    let (deadline, deadline_cursor) = field_spans(
        &app.new_task.deadline,
        "YYYY-MM-DD HH:MM",
        DEADLINE_WIDTH,
        field_style(app, active && focus == Field::Deadline),
        dim,
    );
    spans.extend(deadline);
    spans.push(Span::styled(" ", Style::default().bg(bg)));
    let add_x = spans_width(&spans);
    spans.push(Span::styled(
        "[Add]",
        Style::default()
            .fg(app.theme.green)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    ));

    let hit = |x: usize, w: usize| {
        let x = area.x + x as u16;
        Rect::new(x, area.y, (w as u16).min(area.right().saturating_sub(x)), 1)
    };
    app.hits.push((
        hit(desc_x, desc_width),
        Hit::NewTaskField(Field::Description),
    ));
    app.hits.push((
        hit(deadline_x, DEADLINE_WIDTH),
        Hit::NewTaskField(Field::Deadline),
    ));
    app.hits.push((hit(add_x, 5), Hit::AddButton));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        area,
    );

    if active {
        let col = match focus {
            Field::Description => desc_x + desc_cursor,
            Field::Deadline => deadline_x + deadline_cursor,
        };
        frame.set_cursor_position(Position::new(area.x + col as u16, area.y));
    }
}

fn render_select_all_line(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let checked = app.all_visible_completed(Utc::now());
    let spans = vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(
            checkbox(checked),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ),
        Span::styled(
            " Mark all visible complete",
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    ];
    let w = (spans_width(&spans) as u16).min(area.width);
    app.hits
        .push((Rect::new(area.x, area.y, w, 1), Hit::SelectAll));
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        area,
    );
}
