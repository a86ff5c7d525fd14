//! Collapsible left sidebar listing the four workflow panes.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::events::{AreaFocus, Focus};
use super::layout::SidebarVisibility;
use super::theme;

/// Sidebar navigation state.
pub struct SidebarState {
    /// Whether the user has toggled collapse (Ctrl+B).
    pub user_collapsed: bool,
    /// Currently highlighted item index (into Focus::ALL).
    pub selected: usize,
}

impl SidebarState {
    pub fn new() -> Self {
        Self {
            user_collapsed: false,
            selected: 0,
        }
    }

    /// Toggle user collapse preference.
    pub fn toggle_collapse(&mut self) {
        self.user_collapsed = !self.user_collapsed;
    }

    /// Move selection down.
    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % Focus::ALL.len();
    }

    /// Move selection up.
    pub fn select_prev(&mut self) {
        if self.selected == 0 {
            self.selected = Focus::ALL.len() - 1;
        } else {
            self.selected -= 1;
        }
    }

    /// Get the currently highlighted Focus.
    pub fn selected_focus(&self) -> Focus {
        Focus::ALL[self.selected]
    }

    /// Sync selection to match the active focus (e.g., after Tab navigation).
    pub fn sync_to_focus(&mut self, focus: Focus) {
        if let Some(idx) = Focus::ALL.iter().position(|&f| f == focus) {
            self.selected = idx;
        }
    }

    /// Render the sidebar.
    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        visibility: SidebarVisibility,
        current_focus: Focus,
        area_focus: AreaFocus,
    ) {
        match visibility {
            SidebarVisibility::Hidden => {}
            SidebarVisibility::Collapsed => {
                self.render_collapsed(frame, area, current_focus);
            }
            SidebarVisibility::Expanded => {
                self.render_expanded(frame, area, current_focus, area_focus);
            }
        }
    }

    fn render_collapsed(&self, frame: &mut Frame, area: Rect, current_focus: Focus) {
        let mut lines: Vec<Line> = vec![Line::raw("")];

        for view in Focus::ALL {
            let style = if view == current_focus {
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::TEXT_MUTED)
            };
            lines.push(Line::from(Span::styled(format!(" {}", view.icon()), style)));
        }

        frame.render_widget(
            Paragraph::new(lines).style(Style::default().bg(theme::BG_SURFACE)),
            area,
        );
    }

    fn render_expanded(
        &self,
        frame: &mut Frame,
        area: Rect,
        current_focus: Focus,
        area_focus: AreaFocus,
    ) {
        let sidebar_focused = area_focus == AreaFocus::Sidebar;

        let mut lines: Vec<Line> = vec![
            Line::from(Span::styled(" Audit AI", theme::heading())),
            Line::raw(""),
        ];

        for (idx, view) in Focus::ALL.into_iter().enumerate() {
            let is_current = view == current_focus;
            let is_highlighted = sidebar_focused && idx == self.selected;

            let style = if is_highlighted {
                Style::default()
                    .fg(theme::PRIMARY_LIGHT)
                    .add_modifier(Modifier::BOLD)
            } else if is_current {
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::TEXT_MUTED)
            };

            let pointer = if is_highlighted { "\u{25b8}" } else { " " };
            lines.push(Line::from(vec![
                Span::styled(format!(" {pointer} "), Style::default().fg(theme::ACCENT)),
                Span::styled(format!("{} {}", view.icon(), view.label()), style),
            ]));
        }

        if sidebar_focused {
            lines.push(Line::raw(""));
            lines.push(Line::from(vec![
                Span::styled(" j/k", theme::key_hint()),
                Span::raw(":move "),
                Span::styled("\u{21b5}", theme::key_hint()),
                Span::raw(":open"),
            ]));
        }

        frame.render_widget(
            Paragraph::new(lines).style(Style::default().bg(theme::BG_SURFACE)),
            area,
        );
    }
}
