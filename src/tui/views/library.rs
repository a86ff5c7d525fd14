//! Library pane: read-only listing of every ingested document.
//!
//! Loaded on entry and on demand with `r`. The whole listing is replaced
//! wholesale on refresh, never merged.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::mpsc;

use crate::api::models::DocumentItem;
use crate::api::ApiError;
use crate::tui::services::Services;
use crate::tui::theme;

use super::FAIL_PREFIX;

const PAGE_STEP: usize = 10;

pub struct LibraryState {
    /// None until the first load resolves.
    docs: Option<Vec<DocumentItem>>,
    error: Option<String>,
    loading: bool,
    seq: u64,
    scroll: usize,
    result_rx: mpsc::UnboundedReceiver<(u64, Result<Vec<DocumentItem>, ApiError>)>,
    result_tx: mpsc::UnboundedSender<(u64, Result<Vec<DocumentItem>, ApiError>)>,
}

impl LibraryState {
    pub fn new() -> Self {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        Self {
            docs: None,
            error: None,
            loading: false,
            seq: 0,
            scroll: 0,
            result_rx,
            result_tx,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fetch the listing. Safe to call repeatedly; only the newest
    /// request's result is applied.
    pub fn load(&mut self, services: &Services) {
        self.seq += 1;
        self.loading = true;

        let api = services.api.clone();
        let tx = self.result_tx.clone();
        let seq = self.seq;
        tokio::spawn(async move {
            let result = api.list_documents().await;
            let _ = tx.send((seq, result));
        });
    }

    pub fn poll(&mut self) {
        while let Ok((seq, result)) = self.result_rx.try_recv() {
            if seq != self.seq {
                continue;
            }
            self.loading = false;
            match result {
                Ok(docs) => {
                    log::debug!("Library refreshed: {} documents", docs.len());
                    self.docs = Some(docs);
                    self.error = None;
                    self.scroll = 0;
                }
                Err(e) => {
                    log::warn!("Library refresh failed: {e}");
                    // Keep the stale listing visible alongside the error
                    self.error = Some(format!("{FAIL_PREFIX}{e}"));
                }
            }
        }
    }

    pub fn handle_input(&mut self, event: &Event, services: &Services) -> bool {
        let Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE | KeyModifiers::SHIFT,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        match code {
            KeyCode::Char('r') => {
                self.load(services);
                true
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll = (self.scroll + 1).min(self.max_scroll());
                true
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                true
            }
            KeyCode::PageDown => {
                self.scroll = (self.scroll + PAGE_STEP).min(self.max_scroll());
                true
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(PAGE_STEP);
                true
            }
            KeyCode::Char('g') => {
                self.scroll = 0;
                true
            }
            KeyCode::Char('G') => {
                self.scroll = self.max_scroll();
                true
            }
            // q, ?, digits fall through to the global mapper
            _ => false,
        }
    }

    fn max_scroll(&self) -> usize {
        self.docs
            .as_ref()
            .map(|d| d.len().saturating_sub(1))
            .unwrap_or(0)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let count = self.docs.as_ref().map(Vec::len).unwrap_or(0);
        let title = if self.loading {
            "Document Library (loading...)".to_string()
        } else {
            format!("Document Library ({count})")
        };
        let block = theme::block_focused(&title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = Vec::new();
        if let Some(ref error) = self.error {
            lines.push(Line::from(Span::styled(
                format!("  {error}"),
                Style::default().fg(theme::ERROR),
            )));
            lines.push(Line::raw(""));
        }
        lines.extend(listing_lines(self.docs.as_deref(), self.loading));

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("  r", theme::key_hint()),
            Span::raw(":refresh "),
            Span::styled("j/k", theme::key_hint()),
            Span::raw(":scroll "),
            Span::styled("g/G", theme::key_hint()),
            Span::raw(":top/bottom"),
        ]));

        frame.render_widget(
            Paragraph::new(lines).scroll((self.scroll as u16, 0)),
            inner,
        );
    }
}

/// Table-style lines for the listing body, in backend order.
fn listing_lines(docs: Option<&[DocumentItem]>, loading: bool) -> Vec<Line<'static>> {
    let Some(docs) = docs else {
        let message = if loading {
            "  Loading documents..."
        } else {
            "  Press r to load the document library."
        };
        return vec![Line::from(Span::styled(message, theme::muted()))];
    };

    if docs.is_empty() {
        return vec![Line::from(Span::styled(
            "  No documents yet. Upload one from the Upload pane.",
            theme::muted(),
        ))];
    }

    let mut lines = vec![Line::from(Span::styled(
        format!(
            "  {:<28} {:<6} {:<18} {:>6}  {}",
            "Filename", "Type", "Source unit", "Year", "Uploaded"
        ),
        Style::default()
            .fg(theme::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD),
    ))];

    for doc in docs {
        lines.push(Line::from(Span::styled(
            format!(
                "  {:<28} {:<6} {:<18} {:>6}  {}",
                doc.filename,
                doc.doc_type,
                doc.source_unit_label(),
                doc.year_label(),
                doc.uploaded_label(),
            ),
            Style::default().fg(theme::TEXT),
        )));
    }

    lines
}
