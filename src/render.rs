use crate::provider::Provider;
use crate::session::PLACEHOLDER;
use crate::tea::{Focus, Notification};
use std::sync::atomic::{AtomicU64, Ordering};

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Immutable view of the page handed to the render thread.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub version: u64,
    pub provider: Provider,
    /// Whether the provider's credential variable is set
    pub credential_present: bool,
    /// Catalog rows; row 0 is the placeholder
    pub catalog: Vec<String>,
    pub catalog_cursor: usize,
    pub selected: Option<String>,
    pub focus: Focus,
    pub editing_name: String,
    pub definition_text: String,
    pub cursor_line: usize,
    pub cursor_col: usize,
    pub result: Option<String>,
    /// Rows of the result scrolled past (PgUp/PgDn)
    pub result_scroll: u16,
    pub log_lines: Vec<String>,
    pub running: bool,
    pub notification: Option<Notification>,
    /// Whether the keymap legend is expanded (toggled by '?')
    pub show_keymap: bool,
}

impl RenderState {
    pub fn selected_label(&self) -> &str {
        self.selected.as_deref().unwrap_or(PLACEHOLDER)
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            version: 0,
            provider: Provider::default(),
            credential_present: false,
            catalog: vec![PLACEHOLDER.to_string()],
            catalog_cursor: 0,
            selected: None,
            focus: Focus::default(),
            editing_name: String::new(),
            definition_text: String::new(),
            cursor_line: 0,
            cursor_col: 0,
            result: None,
            result_scroll: 0,
            log_lines: Vec::new(),
            running: false,
            notification: None,
            show_keymap: false,
        }
    }
}
