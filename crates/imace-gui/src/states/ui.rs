use std::fmt;
use std::time::{Duration, Instant};

/// Oldest log lines are dropped past this count.
const MAX_LOG_LINES: usize = 500;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Gallery,
    Explore,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gallery => write!(f, "Gallery"),
            Self::Explore => write!(f, "Explore 3D"),
        }
    }
}

/// Overall UI state.
pub struct UIState {
    pub tab: Tab,

    /// Text in the search box. Reaches the store once typing settles.
    pub search_input: String,
    search_edited_at: Option<Instant>,

    /// Set when the gallery page changed; consumed by the grid.
    pub scroll_to_top: bool,

    pub show_settings: bool,
    pub show_about: bool,

    /// Log messages.
    pub log_messages: Vec<String>,
}

impl Default for UIState {
    fn default() -> Self {
        Self {
            tab: Tab::default(),
            search_input: String::new(),
            search_edited_at: None,
            scroll_to_top: false,
            show_settings: true,
            show_about: false,
            log_messages: Vec::new(),
        }
    }
}

impl UIState {
    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_LINES {
            let excess = self.log_messages.len() - MAX_LOG_LINES;
            self.log_messages.drain(..excess);
        }
    }

    pub fn mark_search_edited(&mut self) {
        self.search_edited_at = Some(Instant::now());
    }

    /// The typed query, once `debounce` has passed since the last keystroke.
    pub fn take_settled_search(&mut self, debounce: Duration) -> Option<String> {
        let edited = self.search_edited_at?;
        if edited.elapsed() < debounce {
            return None;
        }
        self.search_edited_at = None;
        Some(self.search_input.clone())
    }

    /// Time left until the pending edit settles.
    pub fn search_settles_in(&self, debounce: Duration) -> Option<Duration> {
        self.search_edited_at
            .map(|edited| debounce.saturating_sub(edited.elapsed()))
    }

    /// Replace the box contents and skip the debounce.
    pub fn set_search_now(&mut self, query: &str) -> String {
        self.search_input = query.to_string();
        self.search_edited_at = None;
        self.search_input.clone()
    }
}
