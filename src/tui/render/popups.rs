use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};

use crate::tui::app::App;
use crate::tui::popup::{Phase, Severity};
use crate::util::unicode;

fn icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "\u{2713}",
        Severity::Info => "i",
        Severity::Warning => "!",
        Severity::Error => "\u{2717}",
    }
}

/// Render live popups stacked in the top-right corner of `area`, newest on top
pub fn render_popups(frame: &mut Frame, app: &App, area: Rect) {
    let now = Instant::now();
    let max_width = (area.width as usize).saturating_sub(2).min(60);
    if max_width < 8 {
        return;
    }

    let visible = app.popups.visible(now);
    for (i, (popup, phase)) in visible.iter().rev().enumerate() {
        if i as u16 >= area.height {
            break;
        }
        let text = format!(" {} {} ", icon(popup.severity), popup.message);
        let text = unicode::truncate_to_width(&text, max_width);
        let w = unicode::display_width(&text) as u16;
        let rect = Rect::new(area.right().saturating_sub(w + 1), area.y + i as u16, w, 1);

        let mut style = Style::default()
            .fg(app.theme.severity_color(popup.severity))
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD);
        if *phase == Phase::Fading {
            style = style.fg(app.theme.dim).remove_modifier(Modifier::BOLD);
        }

        frame.render_widget(Clear, rect);
        frame.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), rect);
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Task;
    use crate::tui::popup::Severity;
    use crate::tui::render::render;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn popups_render_newest_first() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "a")]);
        app.popups.show("Task added", Severity::Success);
        app.popups.show("Could not save tasks", Severity::Error);
        let out = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        let error_line = out.lines().position(|l| l.contains("Could not save tasks"));
        let added_line = out.lines().position(|l| l.contains("\u{2713} Task added"));
        assert!(error_line.unwrap() < added_line.unwrap());
    }
}
