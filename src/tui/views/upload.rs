//! Upload pane - sends one document to the backend for ingestion.
//!
//! A form with a file path plus optional metadata (source unit, year,
//! tags). The file path is the only locally validated field; year and
//! tags are forwarded verbatim and validated, if at all, by the backend.

use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::mpsc;

use crate::api::models::IngestResponse;
use crate::api::{ApiError, ApiClient};
use crate::tui::events::NotificationLevel;
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::input_buffer::InputBuffer;

use super::{apply_edit_key, push_field, FAIL_PREFIX};

const VALIDATION_NO_FILE: &str = "Select a PDF or DOCX file first.";
const DEFAULT_TAGS: &str = r#"{"process":"audit"}"#;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UploadField {
    File,
    SourceUnit,
    Year,
    Tags,
}

impl UploadField {
    fn next(self) -> Self {
        match self {
            Self::File => Self::SourceUnit,
            Self::SourceUnit => Self::Year,
            Self::Year => Self::Tags,
            Self::Tags => Self::File,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::File => Self::Tags,
            Self::SourceUnit => Self::File,
            Self::Year => Self::SourceUnit,
            Self::Tags => Self::Year,
        }
    }
}

/// Kind of the inline status line, for coloring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StatusKind {
    Info,
    Success,
    Error,
}

pub struct UploadState {
    file_input: InputBuffer,
    source_unit: InputBuffer,
    year: InputBuffer,
    /// Opaque tag payload, forwarded verbatim. The backend decides
    /// whether it is well-formed.
    tags: InputBuffer,
    focused: UploadField,
    status: Option<(StatusKind, String)>,
    loading: bool,
    /// Latest issued request number; stale resolutions are discarded.
    seq: u64,
    result_rx: mpsc::UnboundedReceiver<(u64, Result<IngestResponse, ApiError>)>,
    result_tx: mpsc::UnboundedSender<(u64, Result<IngestResponse, ApiError>)>,
}

impl UploadState {
    pub fn new() -> Self {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        Self {
            file_input: InputBuffer::new(),
            source_unit: InputBuffer::new(),
            year: InputBuffer::new(),
            tags: InputBuffer::with_text(DEFAULT_TAGS),
            focused: UploadField::File,
            status: None,
            loading: false,
            seq: 0,
            result_rx,
            result_tx,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    // ── Input ────────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, services: &Services) -> bool {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        match (*modifiers, *code) {
            (KeyModifiers::NONE, KeyCode::Down) => {
                self.focused = self.focused.next();
                true
            }
            (KeyModifiers::NONE, KeyCode::Up) => {
                self.focused = self.focused.prev();
                true
            }
            (KeyModifiers::NONE, KeyCode::Enter) => {
                self.submit(services);
                true
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => {
                apply_edit_key(self.focused_buffer(), code)
            }
            _ => false,
        }
    }

    fn focused_buffer(&mut self) -> &mut InputBuffer {
        match self.focused {
            UploadField::File => &mut self.file_input,
            UploadField::SourceUnit => &mut self.source_unit,
            UploadField::Year => &mut self.year,
            UploadField::Tags => &mut self.tags,
        }
    }

    // ── Submission ───────────────────────────────────────────────────────

    fn submit(&mut self, services: &Services) {
        if self.loading {
            return;
        }
        if self.file_input.is_blank() {
            self.status = Some((StatusKind::Error, VALIDATION_NO_FILE.to_string()));
            return;
        }

        self.seq += 1;
        self.loading = true;
        self.status = Some((StatusKind::Info, "Uploading...".to_string()));

        let api: ApiClient = services.api.clone();
        let tx = self.result_tx.clone();
        let seq = self.seq;
        let path = PathBuf::from(self.file_input.text().trim());
        let source_unit = self.source_unit.text().trim().to_string();
        let year = self.year.text().trim().to_string();
        let tags = self.tags.text().trim().to_string();

        tokio::spawn(async move {
            let result = api.ingest_document(&path, &source_unit, &year, &tags).await;
            let _ = tx.send((seq, result));
        });
    }

    /// Poll for request resolutions. Call from on_tick.
    pub fn poll(&mut self, services: &Services) {
        while let Ok((seq, result)) = self.result_rx.try_recv() {
            if seq != self.seq {
                // A newer request was issued meanwhile
                continue;
            }
            self.loading = false;
            match result {
                Ok(resp) => {
                    log::info!("Document ingested: document_id={}", resp.document_id);
                    self.status = Some((
                        StatusKind::Success,
                        format!("Success. document_id={}", resp.document_id),
                    ));
                    self.file_input.clear();
                    services.notify(
                        NotificationLevel::Success,
                        format!("Document {} ingested", resp.document_id),
                    );
                }
                Err(e) => {
                    log::warn!("Ingest failed: {e}");
                    self.status = Some((StatusKind::Error, format!("{FAIL_PREFIX}{e}")));
                }
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_focused("Upload & Tagging");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = vec![
            Line::from(Span::styled(
                "  PDF/DOCX are chunked, embedded, and indexed by the backend.",
                theme::muted(),
            )),
            Line::raw(""),
        ];

        push_field(
            &mut lines,
            "Document path",
            self.file_input.text(),
            self.focused == UploadField::File,
        );
        lines.push(Line::raw(""));
        push_field(
            &mut lines,
            "Source unit",
            self.source_unit.text(),
            self.focused == UploadField::SourceUnit,
        );
        lines.push(Line::raw(""));
        push_field(
            &mut lines,
            "Year",
            self.year.text(),
            self.focused == UploadField::Year,
        );
        lines.push(Line::raw(""));
        push_field(
            &mut lines,
            "Tags (JSON)",
            self.tags.text(),
            self.focused == UploadField::Tags,
        );

        lines.push(Line::raw(""));
        let submit_label = if self.loading { "Uploading..." } else { "Upload" };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled("\u{21b5} ", theme::key_hint()),
            Span::styled(submit_label, theme::heading()),
        ]));

        if let Some((kind, ref message)) = self.status {
            let style = match kind {
                StatusKind::Info => ratatui::style::Style::default().fg(theme::INFO),
                StatusKind::Success => ratatui::style::Style::default().fg(theme::SUCCESS),
                StatusKind::Error => ratatui::style::Style::default().fg(theme::ERROR),
            };
            lines.push(Line::raw(""));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(message.clone(), style),
            ]));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("  \u{2191}/\u{2193}", theme::key_hint()),
            Span::raw(":field "),
            Span::styled("\u{21b5}", theme::key_hint()),
            Span::raw(":upload "),
            Span::styled("Tab", theme::key_hint()),
            Span::raw(":next pane"),
        ]));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::tui::events::AppEvent;

    fn services() -> (Services, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Services::new(&AppConfig::default(), tx), rx)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn test_submit_without_file_sets_validation_message_and_no_request() {
        let (services, _rx) = services();
        let mut state = UploadState::new();
        state.handle_input(&key(KeyCode::Enter), &services);
        assert!(!state.loading);
        assert_eq!(state.seq, 0, "no request may be issued");
        let (kind, message) = state.status.clone().unwrap();
        assert_eq!(kind, StatusKind::Error);
        assert_eq!(message, VALIDATION_NO_FILE);
    }

    #[tokio::test]
    async fn test_submit_while_loading_is_ignored() {
        let (services, _rx) = services();
        let mut state = UploadState::new();
        state.file_input.set_text("/tmp/report.pdf");
        state.loading = true;
        state.handle_input(&key(KeyCode::Enter), &services);
        assert_eq!(state.seq, 0);
    }

    #[tokio::test]
    async fn test_submit_issues_request_and_failure_is_prefixed() {
        let (services, _rx) = services();
        let mut state = UploadState::new();
        // Path that cannot be read - resolves as a file error without
        // touching the network.
        state.file_input.set_text("/nonexistent/report.pdf");
        state.handle_input(&key(KeyCode::Enter), &services);
        assert!(state.loading);
        assert_eq!(state.seq, 1);

        // Wait for the spawned request to resolve, then apply it.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        state.poll(&services);
        assert!(!state.loading);
        let (kind, message) = state.status.clone().unwrap();
        assert_eq!(kind, StatusKind::Error);
        assert!(message.starts_with(FAIL_PREFIX), "got: {message}");
    }

    #[tokio::test]
    async fn test_success_clears_file_and_shows_document_id() {
        let (services, mut notif_rx) = services();
        let mut state = UploadState::new();
        state.file_input.set_text("/tmp/report.pdf");
        state.seq = 1;
        state.loading = true;
        state
            .result_tx
            .send((1, Ok(IngestResponse { document_id: 42 })))
            .unwrap();
        state.poll(&services);

        assert!(!state.loading);
        assert!(state.file_input.text().is_empty(), "file path is cleared");
        // Metadata fields survive for the next upload
        assert_eq!(state.tags.text(), DEFAULT_TAGS);
        let (kind, message) = state.status.clone().unwrap();
        assert_eq!(kind, StatusKind::Success);
        assert!(message.contains("document_id=42"));
        assert!(matches!(
            notif_rx.try_recv(),
            Ok(AppEvent::Notification(_))
        ));
    }

    #[tokio::test]
    async fn test_stale_resolution_is_discarded() {
        let (services, _rx) = services();
        let mut state = UploadState::new();
        state.seq = 2; // a second request was issued
        state.loading = true;
        state
            .result_tx
            .send((1, Ok(IngestResponse { document_id: 7 })))
            .unwrap();
        state.poll(&services);
        // The stale success from request 1 must not surface
        assert!(state.loading);
        assert!(state.status.is_none());
    }

    #[test]
    fn test_field_cycle_covers_all_fields() {
        let mut f = UploadField::File;
        for _ in 0..4 {
            f = f.next();
        }
        assert_eq!(f, UploadField::File);
        assert_eq!(UploadField::File.prev(), UploadField::Tags);
    }

    #[tokio::test]
    async fn test_typing_goes_to_focused_field() {
        let (services, _rx) = services();
        let mut state = UploadState::new();
        state.handle_input(&key(KeyCode::Char('a')), &services);
        assert_eq!(state.file_input.text(), "a");
        state.handle_input(&key(KeyCode::Down), &services);
        state.handle_input(&key(KeyCode::Char('b')), &services);
        assert_eq!(state.source_unit.text(), "b");
    }
}
