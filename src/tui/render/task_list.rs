use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use regex::Regex;

use crate::model::{Source, Subtask, Task};
use crate::ops::deadline::format_deadline;
use crate::tui::app::{App, EditState, Field, Hit, Mode, Row};
use crate::util::unicode;

use super::helpers::{checkbox, field_spans, push_highlighted_spans, spans_width};

const EDIT_HINT: &str = "  Enter save \u{00B7} Esc cancel";
const TASK_CONTROLS: &str = "[e] [d] ";
const SUBTASK_CONTROLS: &str = "[d] ";

/// Render the flattened task list
pub fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    if app.rows.is_empty() {
        let message = if app.seed_pending() {
            " Loading sample tasks\u{2026}"
        } else if app.tasks.is_empty() {
            " No tasks yet. Press a to add one."
        } else {
            " No tasks match the current filter."
        };
        let empty = Paragraph::new(message).style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let height = area.height as usize;
    app.clamp_scroll(height);

    let now = Utc::now();
    let search_re = app.search_regex();
    let mut lines: Vec<Line> = Vec::new();
    let mut hits: Vec<(Rect, Hit)> = Vec::new();
    let mut cursor_pos: Option<Position> = None;

    let end = (app.scroll_offset + height).min(app.rows.len());
    for (offset, idx) in (app.scroll_offset..end).enumerate() {
        let row = app.rows[idx];
        let y = area.y + offset as u16;
        let ctx = RowCtx {
            app: &*app,
            idx,
            area: Rect::new(area.x, y, area.width, 1),
            now,
            search_re: search_re.as_ref(),
        };
        hits.push((ctx.area, Hit::Row(idx)));
        let line = match row {
            Row::Task { task_id } => match app.task(task_id) {
                Some(task) => match &app.edit {
                    Some(edit) if edit.task_id == task_id && app.mode == Mode::Edit => {
                        let (line, cursor) = edit_line(&ctx, edit);
                        cursor_pos = Some(cursor);
                        line
                    }
                    _ => task_line(&ctx, task, &mut hits),
                },
                None => Line::from(""),
            },
            Row::Subtask {
                task_id,
                subtask_id,
            } => match app.task(task_id).and_then(|t| t.find_subtask(subtask_id)) {
                Some(sub) => subtask_line(&ctx, task_id, sub, &mut hits),
                None => Line::from(""),
            },
            Row::AddSubtask { task_id } => {
                let (line, cursor) = add_subtask_line(&ctx, task_id);
                if cursor.is_some() {
                    cursor_pos = cursor;
                }
                line
            }
        };
        lines.push(line);
    }

    app.hits.extend(hits);
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
    if let Some(pos) = cursor_pos {
        frame.set_cursor_position(pos);
    }
}

/// Per-row render inputs
struct RowCtx<'a> {
    app: &'a App,
    idx: usize,
    area: Rect,
    now: DateTime<Utc>,
    search_re: Option<&'a Regex>,
}

impl RowCtx<'_> {
    fn is_cursor(&self) -> bool {
        self.idx == self.app.cursor
    }

    fn row_bg(&self, task_id: u64) -> ratatui::style::Color {
        let theme = &self.app.theme;
        if self.app.drag.target() == Some(task_id) {
            theme.drop_target_bg
        } else if self.is_cursor() {
            theme.selection_bg
        } else {
            theme.background
        }
    }

    fn width(&self) -> usize {
        self.area.width as usize
    }

    fn hit_at(&self, col: usize, width: usize) -> Rect {
        let x = self.area.x + col as u16;
        let w = (width as u16).min(self.area.right().saturating_sub(x));
        Rect::new(x, self.area.y, w, 1)
    }
}

/// Pad `spans` with `fill` so that `tail` ends at the right edge
fn right_align(spans: &mut Vec<Span<'static>>, tail: Vec<Span<'static>>, width: usize, fill: Style) {
    let used = spans_width(spans) + spans_width(&tail);
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), fill));
    }
    spans.extend(tail);
}

fn task_line(ctx: &RowCtx, task: &Task, hits: &mut Vec<(Rect, Hit)>) -> Line<'static> {
    let theme = &ctx.app.theme;
    let bg = ctx.row_bg(task.id);
    let base = Style::default().bg(bg);
    let dragged = ctx.app.drag.dragging() == Some(task.id);
    let overdue = task.is_overdue(ctx.now);

    let marker = if ctx.is_cursor() { "\u{258C}" } else { " " };
    let mut spans: Vec<Span<'static>> = vec![
        Span::styled(marker, base.fg(theme.highlight)),
        Span::styled(checkbox(task.completed), base.fg(theme.text_bright)),
        Span::styled(" ", base),
    ];
    let checkbox_col = 1;

    // Right-hand parts: deadline, source tag, controls
    let mut tail: Vec<Span<'static>> = Vec::new();
    if let Some(deadline) = task.deadline {
        let color = if overdue { theme.red } else { theme.dim };
        let label = if overdue {
            format!(" overdue {} ", format_deadline(deadline))
        } else {
            format!(" due {} ", format_deadline(deadline))
        };
        tail.push(Span::styled(label, base.fg(color)));
    }
    if task.source == Source::Api {
        tail.push(Span::styled("sample ", base.fg(theme.purple)));
    }
    tail.push(Span::styled(TASK_CONTROLS, base.fg(theme.dim)));

    let avail = ctx
        .width()
        .saturating_sub(spans_width(&spans) + spans_width(&tail) + 1);
    let desc = unicode::truncate_to_width(&task.description, avail);

    let mut text_style = base.fg(if task.completed { theme.dim } else { theme.text });
    if task.completed {
        text_style = text_style.add_modifier(Modifier::CROSSED_OUT);
    }
    if dragged {
        text_style = text_style.add_modifier(Modifier::DIM);
    }
    let match_style = Style::default()
        .fg(theme.search_match_fg)
        .bg(theme.search_match_bg);
    push_highlighted_spans(&mut spans, &desc, text_style, match_style, ctx.search_re);

    right_align(&mut spans, tail, ctx.width(), base);

    let controls_col = ctx.width().saturating_sub(TASK_CONTROLS.len());
    hits.push((ctx.hit_at(checkbox_col, 3), Hit::Checkbox(ctx.idx)));
    hits.push((ctx.hit_at(controls_col, 3), Hit::EditTask(task.id)));
    hits.push((ctx.hit_at(controls_col + 4, 3), Hit::DeleteTask(task.id)));

    Line::from(spans)
}

fn subtask_line(
    ctx: &RowCtx,
    task_id: u64,
    sub: &Subtask,
    hits: &mut Vec<(Rect, Hit)>,
) -> Line<'static> {
    let theme = &ctx.app.theme;
    let bg = if ctx.is_cursor() {
        theme.selection_bg
    } else {
        theme.background
    };
    let base = Style::default().bg(bg);

    let mut spans: Vec<Span<'static>> = vec![
        Span::styled("     \u{2514} ", base.fg(theme.dim)),
        Span::styled(checkbox(sub.completed), base.fg(theme.text)),
        Span::styled(" ", base),
    ];
    let checkbox_col = 7;

    let tail = vec![Span::styled(SUBTASK_CONTROLS, base.fg(theme.dim))];
    let avail = ctx
        .width()
        .saturating_sub(spans_width(&spans) + spans_width(&tail) + 1);
    let text = unicode::truncate_to_width(&sub.text, avail);
    let mut text_style = base.fg(theme.text);
    if sub.completed {
        text_style = text_style
            .fg(theme.dim)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    let match_style = Style::default()
        .fg(theme.search_match_fg)
        .bg(theme.search_match_bg);
    push_highlighted_spans(&mut spans, &text, text_style, match_style, ctx.search_re);
    right_align(&mut spans, tail, ctx.width(), base);

    let controls_col = ctx.width().saturating_sub(SUBTASK_CONTROLS.len());
    hits.push((ctx.hit_at(checkbox_col, 3), Hit::Checkbox(ctx.idx)));
    hits.push((
        ctx.hit_at(controls_col, 3),
        Hit::DeleteSubtask {
            task_id,
            subtask_id: sub.id,
        },
    ));

    Line::from(spans)
}

fn add_subtask_line(ctx: &RowCtx, task_id: u64) -> (Line<'static>, Option<Position>) {
    let app = ctx.app;
    let theme = &app.theme;
    let bg = if ctx.is_cursor() {
        theme.selection_bg
    } else {
        theme.background
    };
    let base = Style::default().bg(bg);
    let prefix = "     + ";
    let mut spans: Vec<Span<'static>> = vec![Span::styled(prefix, base.fg(theme.green))];

    let typing = app.mode == Mode::Subtask && app.subtask_parent == Some(task_id);
    if !typing {
        spans.push(Span::styled("add subtask", base.fg(theme.dim)));
        return (Line::from(spans), None);
    }

    let hint = "  Enter add \u{00B7} Esc cancel";
    let width = ctx
        .width()
        .saturating_sub(prefix.len() + hint.len())
        .max(1);
    let (field, cursor) = field_spans(
        &app.subtask_input,
        "Subtask",
        width,
        Style::default()
            .fg(theme.text_bright)
            .bg(theme.selection_bg),
        base.fg(theme.dim),
    );
    spans.extend(field);
    spans.push(Span::styled(hint, base.fg(theme.dim)));
    let pos = Position::new(ctx.area.x + (prefix.len() + cursor) as u16, ctx.area.y);
    (Line::from(spans), Some(pos))
}

/// Inline edit form replacing a task row
fn edit_line(ctx: &RowCtx, edit: &EditState) -> (Line<'static>, Position) {
    let theme = &ctx.app.theme;
    let base = Style::default().bg(theme.selection_bg);
    let focused = Style::default()
        .fg(theme.text_bright)
        .bg(theme.background);
    let unfocused = Style::default()
        .fg(theme.text)
        .bg(theme.selection_bg)
        .add_modifier(Modifier::UNDERLINED);
    let placeholder = base.fg(theme.dim);

    let prefix = " \u{270E} ";
    let deadline_width = 18;
    let fixed = unicode::display_width(prefix) + 5 + deadline_width + EDIT_HINT.len();
    let desc_width = ctx.width().saturating_sub(fixed).max(1);

    let mut spans: Vec<Span<'static>> = vec![Span::styled(prefix, base.fg(theme.highlight))];
    let desc_x = spans_width(&spans);
    let (desc, desc_cursor) = field_spans(
        &edit.form.description,
        "Description",
        desc_width,
        if edit.form.field == Field::Description {
            focused
        } else {
            unfocused
        },
        placeholder,
    );
    spans.extend(desc);
    spans.push(Span::styled(" due ", base.fg(theme.dim)));
    let deadline_x = spans_width(&spans);
    let (deadline, deadline_cursor) = field_spans(
        &edit.form.deadline,
        "none",
        deadline_width,
        if edit.form.field == Field::Deadline {
            focused
        } else {
            unfocused
        },
        placeholder,
    );
    spans.extend(deadline);
    spans.push(Span::styled(EDIT_HINT, base.fg(theme.dim)));
    let used = spans_width(&spans);
    if used < ctx.width() {
        spans.push(Span::styled(" ".repeat(ctx.width() - used), base));
    }

    let col = match edit.form.field {
        Field::Description => desc_x + desc_cursor,
        Field::Deadline => deadline_x + deadline_cursor,
    };
    (
        Line::from(spans),
        Position::new(ctx.area.x + col as u16, ctx.area.y),
    )
}

#[cfg(test)]
mod tests {
    use crate::model::{Source, Subtask, Task};
    use crate::tui::app::{Hit, Mode, Row};
    use crate::tui::render::render;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn task_rows_show_checkbox_controls_and_subtasks() {
        let mut t = Task::new(1, "Buy milk");
        t.subtasks.push(Subtask {
            id: 7,
            text: "oat".into(),
            completed: true,
        });
        let mut api = Task::new(2, "delectus aut autem");
        api.source = Source::Api;
        api.completed = true;
        let (mut app, _tmp) = app_with_tasks(vec![t, api]);
        let out = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        assert!(out.contains("[ ] Buy milk"));
        assert!(out.contains("\u{2514} [x] oat"));
        assert!(out.contains("+ add subtask"));
        assert!(out.contains("[x] delectus aut autem"));
        assert!(out.contains("sample [e] [d]"));
    }

    #[test]
    fn deadline_is_shown_localized() {
        let t = task_due(1, "Renew passport", far_future());
        let (mut app, _tmp) = app_with_tasks(vec![t]);
        let out = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        let expected = crate::ops::deadline::format_deadline(far_future());
        assert!(out.contains(&format!("due {}", expected)));
    }

    #[test]
    fn empty_states() {
        let (mut app, _tmp) = app_with_tasks(vec![]);
        let out = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        assert!(out.contains("No tasks yet"));

        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "open")]);
        app.set_filter(crate::ops::filter::FilterMode::Completed);
        let out = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        assert!(out.contains("No tasks match"));
    }

    #[test]
    fn edit_mode_replaces_row_with_form() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "Call bank")]);
        app.begin_edit(1);
        assert_eq!(app.mode, Mode::Edit);
        let out = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        assert!(out.contains("\u{270E} Call bank"));
        assert!(out.contains("Enter save"));
        assert!(!out.contains("[ ] Call bank"));
    }

    #[test]
    fn subtask_input_renders_under_parent() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "Plan trip")]);
        app.begin_subtask(1);
        app.subtask_input.set("book hotel");
        let out = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        assert!(out.contains("+ book hotel"));
    }

    #[test]
    fn render_records_row_and_control_hits() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "a")]);
        render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        assert!(app.hits.iter().any(|(_, h)| *h == Hit::Row(0)));
        assert!(app.hits.iter().any(|(_, h)| *h == Hit::Checkbox(0)));
        assert!(app.hits.iter().any(|(_, h)| *h == Hit::DeleteTask(1)));
        assert_eq!(app.rows[0], Row::Task { task_id: 1 });
    }
}
