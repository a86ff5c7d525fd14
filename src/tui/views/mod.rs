//! The four workflow panes: Upload, Library, Chat, Generate.
//!
//! Each pane owns its form state, a loading flag, and a result slot, and
//! drives exactly one backend operation. Results come back over a
//! pane-local channel tagged with a request sequence number; `poll()`
//! (called every tick) applies a result only when its sequence number is
//! the latest issued, so overlapping requests cannot clobber a newer one.

pub mod chat;
pub mod generate;
pub mod library;
pub mod upload;

use crossterm::event::KeyCode;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use super::theme;
use super::widgets::input_buffer::InputBuffer;
use crate::api::models::Citation;

/// Prefix for backend/transport failures shown in a pane.
pub(crate) const FAIL_PREFIX: &str = "Failed: ";

/// Apply an editing key to an input buffer. Returns true if handled.
pub(crate) fn apply_edit_key(buf: &mut InputBuffer, code: KeyCode) -> bool {
    match code {
        KeyCode::Char(c) => buf.insert_char(c),
        KeyCode::Backspace => buf.backspace(),
        KeyCode::Delete => buf.delete(),
        KeyCode::Left => buf.move_left(),
        KeyCode::Right => buf.move_right(),
        KeyCode::Home => buf.move_home(),
        KeyCode::End => buf.move_end(),
        _ => return false,
    }
    true
}

/// Label + value lines for one form field.
pub(crate) fn push_field(
    lines: &mut Vec<Line<'static>>,
    label: &str,
    value: &str,
    focused: bool,
) {
    let label_style = if focused {
        Style::default()
            .fg(theme::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    } else {
        theme::muted()
    };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(label.to_string(), label_style),
    ]));

    let pointer = if focused { "\u{25b8} " } else { "  " };
    let cursor = if focused { "_" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(pointer, Style::default().fg(theme::ACCENT)),
        Span::styled(
            format!("{value}{cursor}"),
            if focused {
                Style::default().fg(theme::TEXT)
            } else {
                theme::muted()
            },
        ),
    ]));
}

/// Render a citation set in backend order: filename with page number plus the
/// snippet. Returns no lines for an empty set, so callers never show an
/// empty citation block. Shared by the Chat and Generate panes so both
/// render citations identically.
pub(crate) fn citation_lines(citations: &[Citation]) -> Vec<Line<'static>> {
    if citations.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![
        Line::raw(""),
        Line::from(Span::styled("  Citations", theme::heading())),
    ];

    for cite in citations {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                cite.filename.clone(),
                Style::default()
                    .fg(theme::PRIMARY_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" \u{2014} page {}", cite.page_label()),
                theme::muted(),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(cite.snippet.clone(), theme::dim()),
        ]));
    }

    lines
}

/// Collect the plain text of a line (test helper for render assertions).
#[cfg(test)]
pub(crate) fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cite(page: Option<i64>) -> Citation {
        Citation {
            filename: "a.pdf".to_string(),
            page,
            snippet: "relevant excerpt".to_string(),
            document_id: None,
            chunk_id: None,
        }
    }

    #[test]
    fn test_citation_lines_empty_set_renders_nothing() {
        assert!(citation_lines(&[]).is_empty());
    }

    #[test]
    fn test_citation_lines_page_present() {
        let lines = citation_lines(&[cite(Some(2))]);
        let text: Vec<String> = lines.iter().map(line_text).collect();
        assert!(text.iter().any(|l| l.contains("a.pdf \u{2014} page 2")));
        assert!(text.iter().any(|l| l.contains("relevant excerpt")));
    }

    #[test]
    fn test_citation_lines_page_absent_renders_placeholder() {
        let lines = citation_lines(&[cite(None)]);
        let text: Vec<String> = lines.iter().map(line_text).collect();
        assert!(text.iter().any(|l| l.contains("page ?")));
    }

    #[test]
    fn test_citation_lines_preserve_backend_order() {
        let mut second = cite(Some(9));
        second.filename = "b.pdf".to_string();
        let lines = citation_lines(&[cite(Some(1)), second]);
        let joined: String = lines.iter().map(line_text).collect::<Vec<_>>().join("\n");
        let a = joined.find("a.pdf").unwrap();
        let b = joined.find("b.pdf").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_apply_edit_key_handles_text_keys() {
        let mut buf = InputBuffer::new();
        assert!(apply_edit_key(&mut buf, KeyCode::Char('x')));
        assert!(apply_edit_key(&mut buf, KeyCode::Backspace));
        assert!(!apply_edit_key(&mut buf, KeyCode::Enter));
        assert!(!apply_edit_key(&mut buf, KeyCode::Tab));
    }
}
