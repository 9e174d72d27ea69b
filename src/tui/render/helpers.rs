use ratatui::style::Style;
use ratatui::text::Span;
use regex::Regex;

use crate::tui::text_input::TextInput;
use crate::util::unicode;

pub(super) fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// Push spans for text with regex match highlighting. If no regex or no matches,
/// pushes a single span with `base_style`. Otherwise splits text at match boundaries.
pub(super) fn push_highlighted_spans(
    spans: &mut Vec<Span<'static>>,
    text: &str,
    base_style: Style,
    highlight_style: Style,
    search_re: Option<&Regex>,
) {
    let Some(re) = search_re else {
        spans.push(Span::styled(text.to_string(), base_style));
        return;
    };

    let mut last_end = 0;
    for m in re.find_iter(text) {
        if m.start() > last_end {
            spans.push(Span::styled(
                text[last_end..m.start()].to_string(),
                base_style,
            ));
        }
        spans.push(Span::styled(m.as_str().to_string(), highlight_style));
        last_end = m.end();
    }
    if last_end < text.len() || last_end == 0 {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }
}

/// The part of an input that fits in `width` cells, scrolled so the cursor
/// stays visible, and the cursor column within it.
pub(super) fn input_window(input: &TextInput, width: usize) -> (String, usize) {
    if width == 0 {
        return (String::new(), 0);
    }
    let value = input.value();
    let cursor_col = input.cursor_col();
    // One cell reserved for the cursor past the last character
    let start_col = (cursor_col + 1).saturating_sub(width);
    let start = unicode::display_col_to_byte_offset(value, start_col);
    let shown = unicode::truncate_to_width(&value[start..], width);
    let skipped = unicode::byte_offset_to_display_col(value, start);
    (shown, cursor_col - skipped)
}

/// Spans for a text field: value (or dim placeholder when empty), padded
/// to `width`. Returns the spans and the cursor column inside the field.
pub(super) fn field_spans(
    input: &TextInput,
    placeholder: &str,
    width: usize,
    style: Style,
    placeholder_style: Style,
) -> (Vec<Span<'static>>, usize) {
    if input.is_empty() {
        let text = unicode::truncate_to_width(placeholder, width);
        let pad = width.saturating_sub(unicode::display_width(&text));
        return (
            vec![
                Span::styled(text, placeholder_style),
                Span::styled(" ".repeat(pad), style),
            ],
            0,
        );
    }
    let (shown, cursor) = input_window(input, width);
    let pad = width.saturating_sub(unicode::display_width(&shown));
    (
        vec![Span::styled(shown, style), Span::styled(" ".repeat(pad), style)],
        cursor,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(spans: &[Span]) -> Vec<String> {
        spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn highlight_splits_on_matches() {
        let re = Regex::new("(?i)milk").unwrap();
        let mut spans = Vec::new();
        push_highlighted_spans(
            &mut spans,
            "Milk and oat milk!",
            Style::default(),
            Style::default(),
            Some(&re),
        );
        assert_eq!(texts(&spans), vec!["Milk", " and oat ", "milk", "!"]);
    }

    #[test]
    fn highlight_without_match_is_single_span() {
        let re = Regex::new("zzz").unwrap();
        let mut spans = Vec::new();
        push_highlighted_spans(&mut spans, "eggs", Style::default(), Style::default(), Some(&re));
        assert_eq!(texts(&spans), vec!["eggs"]);
    }

    #[test]
    fn input_window_scrolls_to_cursor() {
        let input = TextInput::with_value("abcdefghij");
        let (shown, cursor) = input_window(&input, 5);
        assert_eq!(shown, "ghij");
        assert_eq!(cursor, 4);

        let mut input = input;
        input.home();
        let (shown, cursor) = input_window(&input, 5);
        assert_eq!(shown, "abcd\u{2026}");
        assert_eq!(cursor, 0);
    }

    #[test]
    fn empty_field_shows_placeholder() {
        let (spans, cursor) = field_spans(
            &TextInput::default(),
            "Search tasks",
            15,
            Style::default(),
            Style::default(),
        );
        assert_eq!(spans_width(&spans), 15);
        assert_eq!(spans[0].content, "Search tasks");
        assert_eq!(cursor, 0);
    }
}
