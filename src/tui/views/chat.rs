//! Chat pane: one-shot retrieval-augmented question answering.
//!
//! Single question in, single answer out. Submitting clears the previous
//! answer and citations before the request goes out, so a failure never
//! leaves a stale answer next to a fresh error.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use tokio::sync::mpsc;

use crate::api::models::{ChatResponse, Citation};
use crate::api::ApiError;
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::input_buffer::InputBuffer;

use super::{apply_edit_key, citation_lines, FAIL_PREFIX};

const PAGE_STEP: u16 = 10;

pub struct ChatState {
    input: InputBuffer,
    answer: String,
    citations: Vec<Citation>,
    loading: bool,
    seq: u64,
    scroll: u16,
    result_rx: mpsc::UnboundedReceiver<(u64, Result<ChatResponse, ApiError>)>,
    result_tx: mpsc::UnboundedSender<(u64, Result<ChatResponse, ApiError>)>,
}

impl ChatState {
    pub fn new() -> Self {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        Self {
            input: InputBuffer::new(),
            answer: String::new(),
            citations: Vec::new(),
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
            (KeyModifiers::NONE, KeyCode::Enter) => {
                self.submit(services);
                true
            }
            (KeyModifiers::NONE, KeyCode::PageDown) => {
                self.scroll = self.scroll.saturating_add(PAGE_STEP);
                true
            }
            (KeyModifiers::NONE, KeyCode::PageUp) => {
                self.scroll = self.scroll.saturating_sub(PAGE_STEP);
                true
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => {
                apply_edit_key(&mut self.input, code)
            }
            _ => false,
        }
    }

    fn submit(&mut self, services: &Services) {
        if self.loading || self.input.is_blank() {
            return;
        }

        self.seq += 1;
        self.loading = true;
        // Clear before the request so a failure never sits next to the
        // previous answer
        self.answer.clear();
        self.citations.clear();
        self.scroll = 0;

        let api = services.api.clone();
        let user = services.user.clone();
        let tx = self.result_tx.clone();
        let seq = self.seq;
        let query = self.input.text().trim().to_string();
        log::info!("Chat query submitted ({} chars)", query.len());

        tokio::spawn(async move {
            let result = api.ask_chat(&user, &query).await;
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
                Ok(resp) => {
                    self.answer = resp.answer;
                    self.citations = resp.citations;
                }
                Err(e) => {
                    log::warn!("Chat request failed: {e}");
                    self.answer = format!("{FAIL_PREFIX}{e}");
                    self.citations.clear();
                }
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let input_block = theme::block_focused("Ask the knowledge base");
        let input_inner = input_block.inner(chunks[0]);
        frame.render_widget(input_block, chunks[0]);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("\u{25b8} ", ratatui::style::Style::default().fg(theme::ACCENT)),
                Span::raw(format!("{}_", self.input.text())),
            ])),
            input_inner,
        );

        let answer_title = if self.loading { "Answer (thinking...)" } else { "Answer" };
        let answer_block = theme::block_default(answer_title);
        let answer_inner = answer_block.inner(chunks[1]);
        frame.render_widget(answer_block, chunks[1]);

        let mut lines = answer_body_lines(&self.answer, self.loading);
        lines.extend(citation_lines(&self.citations));
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("  \u{21b5}", theme::key_hint()),
            Span::raw(":ask "),
            Span::styled("PgUp/PgDn", theme::key_hint()),
            Span::raw(":scroll"),
        ]));

        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0)),
            answer_inner,
        );
    }
}

fn answer_body_lines(answer: &str, loading: bool) -> Vec<Line<'static>> {
    if loading {
        return vec![Line::from(Span::styled(
            "  Retrieving and generating...",
            theme::muted(),
        ))];
    }
    if answer.is_empty() {
        return vec![Line::from(Span::styled(
            "  Ask a question about the ingested documents.",
            theme::muted(),
        ))];
    }

    let style = if answer.starts_with(FAIL_PREFIX) {
        ratatui::style::Style::default().fg(theme::ERROR)
    } else {
        ratatui::style::Style::default().fg(theme::TEXT)
    };
    answer
        .lines()
        .map(|l| Line::from(Span::styled(format!("  {l}"), style)))
        .collect()
}
