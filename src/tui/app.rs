//! Application state and the Elm-architecture event loop.
//!
//! One `AppState` owns the four pane states, the sidebar, notifications,
//! and the help modal. Every frame is a pure function of this state.
//! Input is dispatched in priority order: help modal, then sidebar (when
//! focused), then the visible pane, then the global key map.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::Backend,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use super::events::{Action, AppEvent, AreaFocus, Focus, Notification, NotificationLevel};
use super::layout::AppLayout;
use super::services::Services;
use super::sidebar::SidebarState;
use super::theme;
use super::views::{chat::ChatState, generate::GenerateState, library::LibraryState, upload::UploadState};

/// At most this many notifications are shown at once; older ones are
/// dropped first.
const MAX_NOTIFICATIONS: usize = 3;

pub struct AppState {
    running: bool,
    focus: Focus,
    area_focus: AreaFocus,
    sidebar: SidebarState,
    show_help: bool,

    upload: UploadState,
    library: LibraryState,
    chat: ChatState,
    generate: GenerateState,

    notifications: Vec<Notification>,
    notification_counter: u64,

    services: Services,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl AppState {
    pub fn new(services: Services, event_rx: mpsc::UnboundedReceiver<AppEvent>) -> Self {
        Self {
            running: true,
            focus: Focus::Upload,
            area_focus: AreaFocus::Main,
            sidebar: SidebarState::new(),
            show_help: false,
            upload: UploadState::new(),
            library: LibraryState::new(),
            chat: ChatState::new(),
            generate: GenerateState::new(),
            notifications: Vec::new(),
            notification_counter: 0,
            services,
            event_rx,
        }
    }

    /// Drive the terminal until quit. Ticks fire at `tick_rate` and are
    /// the only place pane results and notification TTLs advance.
    pub async fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        tick_rate: Duration,
    ) -> std::io::Result<()>
    where
        std::io::Error: From<<B as Backend>::Error>,
    {
        let mut ticker = tokio::time::interval(tick_rate);
        let mut input = EventStream::new();

        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = ticker.tick() => {
                    self.on_tick();
                }
                Some(event) = input.next() => {
                    self.handle_event(AppEvent::Input(event?));
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
            }
        }

        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    // ── Event dispatch ──────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => self.on_tick(),
            AppEvent::Input(input) => self.handle_input(&input),
            AppEvent::Action(action) => self.apply_action(action),
            AppEvent::Notification(n) => self.push_notification(n),
            AppEvent::Quit => self.running = false,
        }
    }

    fn handle_input(&mut self, event: &Event) {
        if self.show_help {
            if let Event::Key(KeyEvent { kind: KeyEventKind::Press, .. }) = event {
                self.show_help = false;
            }
            return;
        }

        if self.area_focus == AreaFocus::Sidebar {
            if self.handle_sidebar_input(event) {
                return;
            }
        } else if self.focused_view_handles(event) {
            return;
        }

        if let Some(action) = self.map_global_key(event) {
            self.apply_action(action);
        }
    }

    /// Give the visible pane first claim on the event.
    fn focused_view_handles(&mut self, event: &Event) -> bool {
        match self.focus {
            Focus::Upload => self.upload.handle_input(event, &self.services),
            Focus::Library => self.library.handle_input(event, &self.services),
            Focus::Chat => self.chat.handle_input(event, &self.services),
            Focus::Generate => self.generate.handle_input(event, &self.services),
        }
    }

    fn handle_sidebar_input(&mut self, event: &Event) -> bool {
        let Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        match code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.sidebar.select_next();
                true
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.sidebar.select_prev();
                true
            }
            KeyCode::Enter => {
                let target = self.sidebar.selected_focus();
                self.area_focus = AreaFocus::Main;
                self.apply_action(target.to_action());
                true
            }
            KeyCode::Esc => {
                self.area_focus = AreaFocus::Main;
                true
            }
            _ => false,
        }
    }

    /// Keys the panes do not consume. Plain chars only arrive here from
    /// the Library pane; form panes swallow them as text.
    fn map_global_key(&self, event: &Event) -> Option<Action> {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };

        match (*modifiers, *code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
            (KeyModifiers::CONTROL, KeyCode::Char('b')) => Some(Action::ToggleSidebar),
            (KeyModifiers::NONE, KeyCode::F(1)) => Some(Action::ShowHelp),
            (KeyModifiers::NONE, KeyCode::Tab) => Some(Action::TabNext),
            (KeyModifiers::SHIFT, KeyCode::BackTab) | (KeyModifiers::NONE, KeyCode::BackTab) => {
                Some(Action::TabPrev)
            }
            (KeyModifiers::NONE, KeyCode::Char('q')) => Some(Action::Quit),
            (KeyModifiers::SHIFT, KeyCode::Char('?')) | (KeyModifiers::NONE, KeyCode::Char('?')) => {
                Some(Action::ShowHelp)
            }
            (KeyModifiers::NONE, KeyCode::Char('1')) => Some(Action::FocusUpload),
            (KeyModifiers::NONE, KeyCode::Char('2')) => Some(Action::FocusLibrary),
            (KeyModifiers::NONE, KeyCode::Char('3')) => Some(Action::FocusChat),
            (KeyModifiers::NONE, KeyCode::Char('4')) => Some(Action::FocusGenerate),
            (KeyModifiers::NONE, KeyCode::Esc) => {
                if self.area_focus == AreaFocus::Main {
                    // Hand focus to the sidebar for j/k navigation
                    return Some(Action::ToggleSidebarFocus);
                }
                None
            }
            _ => None,
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::FocusUpload => self.set_focus(Focus::Upload),
            Action::FocusLibrary => self.set_focus(Focus::Library),
            Action::FocusChat => self.set_focus(Focus::Chat),
            Action::FocusGenerate => self.set_focus(Focus::Generate),
            Action::TabNext => self.set_focus(self.focus.next()),
            Action::TabPrev => self.set_focus(self.focus.prev()),
            Action::ToggleSidebar => self.sidebar.toggle_collapse(),
            Action::ToggleSidebarFocus => {
                self.area_focus = match self.area_focus {
                    AreaFocus::Main => AreaFocus::Sidebar,
                    AreaFocus::Sidebar => AreaFocus::Main,
                };
                self.sidebar.sync_to_focus(self.focus);
            }
            Action::ShowHelp => self.show_help = true,
            Action::Quit => self.running = false,
        }
    }

    /// Pane switch. Form state in the hidden panes is preserved; only
    /// the Library reloads on entry.
    fn set_focus(&mut self, focus: Focus) {
        if self.focus == focus {
            return;
        }
        self.focus = focus;
        self.sidebar.sync_to_focus(focus);
        if focus == Focus::Library {
            self.library.load(&self.services);
        }
    }

    fn on_tick(&mut self) {
        self.upload.poll(&self.services);
        self.library.poll();
        self.chat.poll();
        self.generate.poll();

        for n in &mut self.notifications {
            n.ttl_ticks = n.ttl_ticks.saturating_sub(1);
        }
        self.notifications.retain(|n| n.ttl_ticks > 0);
    }

    fn push_notification(&mut self, mut notification: Notification) {
        // Repeats refresh the existing entry instead of stacking
        if let Some(existing) = self
            .notifications
            .iter_mut()
            .find(|n| n.message == notification.message)
        {
            existing.ttl_ticks = notification.ttl_ticks;
            return;
        }

        self.notification_counter += 1;
        notification.id = self.notification_counter;
        self.notifications.push(notification);
        if self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(
            ratatui::widgets::Block::default().style(Style::default().bg(theme::BG_BASE)),
            area,
        );

        let (layout, visibility) = AppLayout::compute(area, self.sidebar.user_collapsed);

        if let Some(sidebar_area) = layout.sidebar {
            self.sidebar
                .render(frame, sidebar_area, visibility, self.focus, self.area_focus);
        }

        match self.focus {
            Focus::Upload => self.upload.render(frame, layout.main),
            Focus::Library => self.library.render(frame, layout.main),
            Focus::Chat => self.chat.render(frame, layout.main),
            Focus::Generate => self.generate.render(frame, layout.main),
        }

        self.render_status_bar(frame, layout.status);
        self.render_notifications(frame, area);

        if self.show_help {
            self.render_help(frame, area);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let busy = self.upload.is_loading()
            || self.library.is_loading()
            || self.chat.is_loading()
            || self.generate.is_loading();

        let mut spans = vec![
            Span::styled(" Audit AI ", theme::brand_badge()),
            Span::raw(" "),
            Span::styled(self.focus.label(), theme::heading()),
            Span::raw("  "),
            Span::styled(format!("user:{}", self.services.user), theme::muted()),
        ];
        if busy {
            spans.push(Span::raw("  "));
            spans.push(Span::styled("\u{2026}working", Style::default().fg(theme::INFO)));
        }
        spans.push(Span::raw("  "));
        spans.push(Span::styled("Tab", theme::key_hint()));
        spans.push(Span::raw(":pane "));
        spans.push(Span::styled("F1", theme::key_hint()));
        spans.push(Span::raw(":help "));
        spans.push(Span::styled("Ctrl+C", theme::key_hint()));
        spans.push(Span::raw(":quit"));

        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(theme::BG_SURFACE)),
            area,
        );
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        for (idx, n) in self.notifications.iter().rev().enumerate() {
            let width = notification_width(&n.message, area.width);
            let rect = Rect::new(
                area.width.saturating_sub(width + 1),
                1 + idx as u16 * 3,
                width,
                3,
            );
            if rect.bottom() > area.bottom() {
                break;
            }

            let color = match n.level {
                NotificationLevel::Info => theme::INFO,
                NotificationLevel::Success => theme::SUCCESS,
                NotificationLevel::Error => theme::ERROR,
            };
            let block = ratatui::widgets::Block::default()
                .borders(ratatui::widgets::Borders::ALL)
                .border_style(Style::default().fg(color));
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    format!(" {} ", n.message),
                    Style::default().fg(color),
                )))
                .block(block),
                rect,
            );
        }
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let rect = centered_rect(50, 60, area);
        frame.render_widget(Clear, rect);

        let block = theme::block_focused("Help");
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let entries: [(&str, &str); 10] = [
            ("Tab / Shift+Tab", "next / previous pane"),
            ("1-4", "jump to pane (Library pane)"),
            ("\u{2191}/\u{2193}", "move between form fields"),
            ("\u{21b5}", "submit the focused form"),
            ("r", "refresh the document library"),
            ("PgUp/PgDn", "scroll answer or draft"),
            ("Esc", "focus the sidebar"),
            ("Ctrl+B", "collapse the sidebar"),
            ("F1", "this help"),
            ("Ctrl+C", "quit"),
        ];

        let mut lines = vec![Line::raw("")];
        for (keys, what) in entries {
            lines.push(Line::from(vec![
                Span::styled(format!("  {keys:<16}"), theme::key_hint()),
                Span::styled(what, Style::default().fg(theme::TEXT)),
            ]));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  press any key to close",
            theme::dim(),
        )));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Box width for one notification: display width of the padded message
/// plus the border columns, clamped to the terminal.
fn notification_width(message: &str, max: u16) -> u16 {
    let text = Span::raw(format!(" {message} "));
    (text.width() as u16).saturating_add(2).min(max)
}

/// Centered sub-rectangle, `percent_x`/`percent_y` of the available area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    // Widened so the product cannot overflow on very wide terminals
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(percent_y) / 100) as u16;
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn app() -> AppState {
        let (tx, rx) = mpsc::unbounded_channel();
        let services = Services::new(&AppConfig::default(), tx);
        AppState::new(services, rx)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Input(Event::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::CONTROL,
        )))
    }

    #[tokio::test]
    async fn test_starts_on_upload_pane() {
        let app = app();
        assert_eq!(app.focus(), Focus::Upload);
        assert!(app.is_running());
    }

    #[tokio::test]
    async fn test_tab_cycles_panes() {
        let mut app = app();
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.focus(), Focus::Library);
        app.handle_event(key(KeyCode::BackTab));
        assert_eq!(app.focus(), Focus::Upload);
    }

    #[tokio::test]
    async fn test_entering_library_triggers_load() {
        let mut app = app();
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.focus(), Focus::Library);
        assert!(app.library.is_loading());
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_even_with_form_focused() {
        let mut app = app();
        assert_eq!(app.focus(), Focus::Upload);
        app.handle_event(ctrl('c'));
        assert!(!app.is_running());
    }

    #[tokio::test]
    async fn test_plain_q_is_text_on_form_panes() {
        let mut app = app();
        app.handle_event(key(KeyCode::Char('q')));
        assert!(app.is_running(), "q types into the Upload form");
    }

    #[tokio::test]
    async fn test_plain_q_quits_from_library() {
        let mut app = app();
        app.handle_event(key(KeyCode::Tab)); // Library
        app.handle_event(key(KeyCode::Char('q')));
        assert!(!app.is_running());
    }

    #[tokio::test]
    async fn test_digit_jump_from_library() {
        let mut app = app();
        app.handle_event(key(KeyCode::Tab)); // Library
        app.handle_event(key(KeyCode::Char('3')));
        assert_eq!(app.focus(), Focus::Chat);
    }

    #[tokio::test]
    async fn test_hidden_pane_state_survives_navigation() {
        let mut app = app();
        app.handle_event(key(KeyCode::Char('h'))); // types into Upload file field
        app.handle_event(key(KeyCode::Tab));
        app.handle_event(key(KeyCode::BackTab));
        // Typing again appends rather than starting over
        app.handle_event(key(KeyCode::Char('i')));
        app.handle_event(key(KeyCode::Enter));
        // "hi" is a non-blank path, so a request was issued
        assert!(app.upload.is_loading());
    }

    #[tokio::test]
    async fn test_help_opens_and_any_key_closes() {
        let mut app = app();
        app.handle_event(key(KeyCode::F(1)));
        assert!(app.show_help);
        // While open, keys do not reach the panes or global map
        app.handle_event(ctrl('c'));
        assert!(!app.show_help);
        assert!(app.is_running());
    }

    #[tokio::test]
    async fn test_esc_moves_focus_to_sidebar_and_enter_opens() {
        let mut app = app();
        app.handle_event(key(KeyCode::Esc));
        assert_eq!(app.area_focus, AreaFocus::Sidebar);
        app.handle_event(key(KeyCode::Char('j')));
        app.handle_event(key(KeyCode::Char('j')));
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.area_focus, AreaFocus::Main);
        assert_eq!(app.focus(), Focus::Chat);
    }

    #[tokio::test]
    async fn test_ctrl_b_toggles_sidebar_collapse() {
        let mut app = app();
        app.handle_event(ctrl('b'));
        assert!(app.sidebar.user_collapsed);
        app.handle_event(ctrl('b'));
        assert!(!app.sidebar.user_collapsed);
    }

    #[tokio::test]
    async fn test_notifications_dedup_and_cap() {
        let mut app = app();
        for message in ["a", "b", "c", "d"] {
            app.push_notification(Notification {
                id: 0,
                message: message.to_string(),
                level: NotificationLevel::Info,
                ttl_ticks: 10,
            });
        }
        assert_eq!(app.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(app.notifications[0].message, "b");

        // A repeat refreshes instead of stacking
        app.push_notification(Notification {
            id: 0,
            message: "d".to_string(),
            level: NotificationLevel::Info,
            ttl_ticks: 99,
        });
        assert_eq!(app.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(
            app.notifications.iter().find(|n| n.message == "d").unwrap().ttl_ticks,
            99
        );
    }

    #[tokio::test]
    async fn test_notifications_expire_on_tick() {
        let mut app = app();
        app.push_notification(Notification {
            id: 0,
            message: "soon gone".to_string(),
            level: NotificationLevel::Info,
            ttl_ticks: 2,
        });
        app.on_tick();
        assert_eq!(app.notifications.len(), 1);
        app.on_tick();
        assert!(app.notifications.is_empty());
    }

    #[test]
    fn test_centered_rect_within_bounds() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(50, 50, area);
        assert_eq!(rect.width, 50);
        assert_eq!(rect.height, 20);
        assert!(rect.right() <= area.right());
        assert!(rect.bottom() <= area.bottom());
    }

    #[test]
    fn test_centered_rect_very_wide_terminal() {
        // u16 arithmetic would overflow at 2000 * 50
        let area = Rect::new(0, 0, 2000, 500);
        let rect = centered_rect(50, 60, area);
        assert_eq!(rect.width, 1000);
        assert_eq!(rect.height, 300);
        assert!(rect.right() <= area.right());
    }

    #[test]
    fn test_notification_width_uses_display_width() {
        // ASCII: 4 columns of text + 2 padding + 2 border
        assert_eq!(notification_width("abcd", 80), 8);
        // Multibyte but single-column: byte length must not inflate the box
        assert_eq!(notification_width("héllo", 80), 9);
        // Wide CJK glyphs occupy two columns each
        assert_eq!(notification_width("\u{65e5}\u{672c}", 80), 8);
        // Clamped to the terminal width
        assert_eq!(notification_width("a very long message indeed", 10), 10);
    }

    #[tokio::test]
    async fn test_render_smoke() {
        use ratatui::{backend::TestBackend, Terminal};
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        for _ in 0..4 {
            terminal.draw(|frame| app.render(frame)).unwrap();
            app.handle_event(key(KeyCode::Tab));
        }
        app.handle_event(key(KeyCode::F(1)));
        terminal.draw(|frame| app.render(frame)).unwrap();
    }
}
