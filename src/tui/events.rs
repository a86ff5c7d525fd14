/// Events flowing through the Elm-architecture event loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic tick; drives notification TTLs and pane result polling.
    Tick,
    /// Raw terminal input (keyboard/mouse).
    Input(crossterm::event::Event),
    /// A resolved action to execute.
    Action(Action),
    /// Notification to display to the user.
    Notification(Notification),
    /// Request to quit the application.
    Quit,
}

/// High-level actions dispatched by the input mapper or sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Navigation
    FocusUpload,
    FocusLibrary,
    FocusChat,
    FocusGenerate,
    TabNext,
    TabPrev,
    ToggleSidebar,
    /// Move input focus between the sidebar and the main pane.
    ToggleSidebarFocus,

    // Modals
    ShowHelp,

    // Application
    Quit,
}

/// Which workflow pane is visible. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Focus {
    Upload,
    Library,
    Chat,
    Generate,
}

impl Focus {
    pub const ALL: [Focus; 4] = [
        Focus::Upload,
        Focus::Library,
        Focus::Chat,
        Focus::Generate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Focus::Upload => "Upload",
            Focus::Library => "Library",
            Focus::Chat => "Chat RAG",
            Focus::Generate => "Generate Draft",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Focus::Upload => "\u{2191}",
            Focus::Library => "\u{2261}",
            Focus::Chat => "?",
            Focus::Generate => "\u{270e}",
        }
    }

    pub fn next(self) -> Focus {
        let idx = Focus::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Focus::ALL[(idx + 1) % Focus::ALL.len()]
    }

    pub fn prev(self) -> Focus {
        let idx = Focus::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Focus::ALL[(idx + Focus::ALL.len() - 1) % Focus::ALL.len()]
    }

    pub fn to_action(self) -> Action {
        match self {
            Focus::Upload => Action::FocusUpload,
            Focus::Library => Action::FocusLibrary,
            Focus::Chat => Action::FocusChat,
            Focus::Generate => Action::FocusGenerate,
        }
    }
}

/// Whether sidebar or main content has input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaFocus {
    Sidebar,
    Main,
}

/// Notification level for the overlay system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A timed notification shown in the overlay.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub level: NotificationLevel,
    /// Ticks remaining before auto-dismiss.
    pub ttl_ticks: u32,
}
