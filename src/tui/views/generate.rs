//! Generate pane: agent-produced drafts from an engagement payload.
//!
//! Four free-form fields (scope, criteria, period, risk) and a mode
//! selector. Nothing is validated locally; empty fields are sent as-is
//! and the agent works with whatever it gets.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use tokio::sync::mpsc;

use crate::api::models::{AgentMode, AgentResponse, Citation, DraftRequest};
use crate::api::ApiError;
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::input_buffer::InputBuffer;

use super::{apply_edit_key, citation_lines, push_field, FAIL_PREFIX};

const PAGE_STEP: u16 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DraftField {
    Scope,
    Criteria,
    Period,
    Risk,
    Mode,
}

impl DraftField {
    fn next(self) -> Self {
        match self {
            Self::Scope => Self::Criteria,
            Self::Criteria => Self::Period,
            Self::Period => Self::Risk,
            Self::Risk => Self::Mode,
            Self::Mode => Self::Scope,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Scope => Self::Mode,
            Self::Criteria => Self::Scope,
            Self::Period => Self::Criteria,
            Self::Risk => Self::Period,
            Self::Mode => Self::Risk,
        }
    }
}

pub struct GenerateState {
    scope: InputBuffer,
    criteria: InputBuffer,
    period: InputBuffer,
    risk: InputBuffer,
    mode: AgentMode,
    focused: DraftField,
    content: String,
    citations: Vec<Citation>,
    loading: bool,
    seq: u64,
    scroll: u16,
    result_rx: mpsc::UnboundedReceiver<(u64, Result<AgentResponse, ApiError>)>,
    result_tx: mpsc::UnboundedSender<(u64, Result<AgentResponse, ApiError>)>,
}

impl GenerateState {
    pub fn new() -> Self {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        Self {
            scope: InputBuffer::new(),
            criteria: InputBuffer::new(),
            period: InputBuffer::new(),
            risk: InputBuffer::new(),
            mode: AgentMode::DraftAuditPlan,
            focused: DraftField::Scope,
            content: String::new(),
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
            (KeyModifiers::NONE, KeyCode::PageDown) => {
                self.scroll = self.scroll.saturating_add(PAGE_STEP);
                true
            }
            (KeyModifiers::NONE, KeyCode::PageUp) => {
                self.scroll = self.scroll.saturating_sub(PAGE_STEP);
                true
            }
            (KeyModifiers::NONE, KeyCode::Right) if self.focused == DraftField::Mode => {
                self.mode = self.mode.next();
                true
            }
            (KeyModifiers::NONE, KeyCode::Left) if self.focused == DraftField::Mode => {
                self.mode = self.mode.prev();
                true
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => {
                if self.focused == DraftField::Mode {
                    return false;
                }
                apply_edit_key(self.focused_buffer(), code)
            }
            _ => false,
        }
    }

    fn focused_buffer(&mut self) -> &mut InputBuffer {
        match self.focused {
            DraftField::Scope => &mut self.scope,
            DraftField::Criteria => &mut self.criteria,
            DraftField::Period => &mut self.period,
            DraftField::Risk => &mut self.risk,
            DraftField::Mode => &mut self.scope, // unreachable via handle_input
        }
    }

    fn submit(&mut self, services: &Services) {
        if self.loading {
            return;
        }

        self.seq += 1;
        self.loading = true;
        self.content.clear();
        self.citations.clear();
        self.scroll = 0;

        let payload = DraftRequest {
            scope: self.scope.text().trim().to_string(),
            criteria: self.criteria.text().trim().to_string(),
            period: self.period.text().trim().to_string(),
            risk: self.risk.text().trim().to_string(),
        };

        let api = services.api.clone();
        let user = services.user.clone();
        let mode = self.mode;
        let tx = self.result_tx.clone();
        let seq = self.seq;
        log::info!("Agent run requested: mode={mode:?}");

        tokio::spawn(async move {
            let result = api.run_agent(mode, &user, payload).await;
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
                    self.content = resp.content;
                    self.citations = resp.citations;
                }
                Err(e) => {
                    log::warn!("Agent run failed: {e}");
                    self.content = format!("{FAIL_PREFIX}{e}");
                    self.citations.clear();
                }
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(42), Constraint::Min(0)])
            .split(area);

        self.render_form(frame, chunks[0]);
        self.render_draft(frame, chunks[1]);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_focused("Engagement");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = Vec::new();
        push_field(&mut lines, "Scope", self.scope.text(), self.focused == DraftField::Scope);
        lines.push(Line::raw(""));
        push_field(
            &mut lines,
            "Criteria",
            self.criteria.text(),
            self.focused == DraftField::Criteria,
        );
        lines.push(Line::raw(""));
        push_field(
            &mut lines,
            "Period",
            self.period.text(),
            self.focused == DraftField::Period,
        );
        lines.push(Line::raw(""));
        push_field(&mut lines, "Risk", self.risk.text(), self.focused == DraftField::Risk);
        lines.push(Line::raw(""));

        let mode_focused = self.focused == DraftField::Mode;
        let mode_label_style = if mode_focused {
            Style::default()
                .fg(theme::PRIMARY_LIGHT)
                .add_modifier(ratatui::style::Modifier::BOLD)
        } else {
            theme::muted()
        };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled("Mode", mode_label_style),
        ]));
        let pointer = if mode_focused { "\u{25b8} " } else { "  " };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(pointer, Style::default().fg(theme::ACCENT)),
            Span::styled(
                if mode_focused {
                    format!("\u{2190} {} \u{2192}", self.mode.label())
                } else {
                    self.mode.label().to_string()
                },
                if mode_focused {
                    Style::default().fg(theme::TEXT)
                } else {
                    theme::muted()
                },
            ),
        ]));

        lines.push(Line::raw(""));
        let submit_label = if self.loading { "Generating..." } else { "Generate" };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled("\u{21b5} ", theme::key_hint()),
            Span::styled(submit_label, theme::heading()),
        ]));

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_draft(&self, frame: &mut Frame, area: Rect) {
        let title = if self.loading { "Draft (generating...)" } else { "Draft" };
        let block = theme::block_default(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = draft_body_lines(&self.content, self.loading);
        lines.extend(citation_lines(&self.citations));

        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0)),
            inner,
        );
    }
}

fn draft_body_lines(content: &str, loading: bool) -> Vec<Line<'static>> {
    if loading {
        return vec![Line::from(Span::styled(
            "  Drafting from the knowledge base...",
            theme::muted(),
        ))];
    }
    if content.is_empty() {
        return vec![Line::from(Span::styled(
            "  Fill in the engagement and press Enter to generate.",
            theme::muted(),
        ))];
    }

    let style = if content.starts_with(FAIL_PREFIX) {
        Style::default().fg(theme::ERROR)
    } else {
        Style::default().fg(theme::TEXT)
    };
    content
        .lines()
        .map(|l| Line::from(Span::styled(format!("  {l}"), style)))
        .collect()
}
