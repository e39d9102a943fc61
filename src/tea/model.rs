//! Model for the TEA (The Elm Architecture) pattern.
//!
//! The Model is pure application state - no channels, no handles, no runtime infrastructure.

use std::path::PathBuf;

use crate::config::Config;
use crate::editor::Cursor;
use crate::provider::Provider;
use crate::render::{next_version, RenderState};
use crate::session::{SessionState, PLACEHOLDER};
use crate::store::Orchestrations;

/// Level of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Error notification - displayed in red with "Error:" prefix
    Error,
    /// Warning notification - displayed in yellow
    Warning,
    /// Informational notification - displayed in green
    Info,
}

/// A notification message to display to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// The severity level of the notification
    pub level: NotificationLevel,
    /// The notification message text
    pub message: String,
}

/// Which part of the page receives typed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Catalog,
    Name,
    Editor,
}

impl Focus {
    pub fn label(&self) -> &'static str {
        match self {
            Focus::Catalog => "Saved",
            Focus::Name => "Name",
            Focus::Editor => "Definition",
        }
    }

    /// Cycle to the next field (Tab behavior).
    pub fn next(&self) -> Focus {
        match self {
            Focus::Catalog => Focus::Name,
            Focus::Name => Focus::Editor,
            Focus::Editor => Focus::Catalog,
        }
    }

    pub fn prev(&self) -> Focus {
        match self {
            Focus::Catalog => Focus::Editor,
            Focus::Name => Focus::Catalog,
            Focus::Editor => Focus::Name,
        }
    }
}

/// Pure application state - the single source of truth.
pub struct Model {
    pub session: SessionState,

    /// Last known store contents (refreshed by the store watcher)
    pub orchestrations: Orchestrations,
    /// Highlighted row of the catalog; row 0 is the placeholder
    pub catalog_cursor: usize,

    pub focus: Focus,
    pub cursor: Cursor,
    /// Rows of the result panel scrolled past
    pub result_scroll: u16,

    /// Set while a run is in flight; actions are refused until it clears
    pub running: bool,
    /// Set while a save or delete is being written
    pub store_pending: bool,

    pub notification: Option<Notification>,

    /// Whether the keymap legend is expanded (toggled by '?')
    pub show_keymap: bool,

    // Dirty flag - set when state changes and render is needed
    pub dirty: bool,

    // Config (immutable after init)
    pub config: Config,
    pub store_path: PathBuf,
}

impl Model {
    pub fn new(
        orchestrations: Orchestrations,
        provider: Provider,
        config: Config,
        store_path: PathBuf,
    ) -> Self {
        let session = SessionState::new(provider);
        let cursor = Cursor::default();
        Self {
            session,
            orchestrations,
            catalog_cursor: 0,
            focus: Focus::default(),
            cursor,
            result_scroll: 0,
            running: false,
            store_pending: false,
            notification: None,
            show_keymap: false,
            dirty: true,
            config,
            store_path,
        }
    }

    /// Catalog rows as shown: the placeholder, then saved names in order.
    pub fn catalog_rows(&self) -> Vec<String> {
        std::iter::once(PLACEHOLDER.to_string())
            .chain(self.orchestrations.keys().cloned())
            .collect()
    }

    /// Saved name under the catalog cursor; `None` for the placeholder row.
    pub fn highlighted_name(&self) -> Option<&String> {
        self.catalog_cursor
            .checked_sub(1)
            .and_then(|i| self.orchestrations.keys().nth(i))
    }

    /// Move the catalog cursor onto `name`, or the placeholder.
    pub fn highlight(&mut self, name: Option<&str>) {
        self.catalog_cursor = name
            .and_then(|n| self.orchestrations.keys().position(|k| k == n))
            .map(|i| i + 1)
            .unwrap_or(0);
    }

    /// A run or store write is in flight; only quit is accepted.
    pub fn busy(&self) -> bool {
        self.running || self.store_pending
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notification = Some(Notification {
            level,
            message: message.into(),
        });
        self.dirty = true;
    }

    /// Create an immutable snapshot for the render thread.
    ///
    /// Each snapshot gets a monotonically increasing version number so the
    /// render thread can skip redundant frames.
    pub fn snapshot(&self) -> RenderState {
        let (cursor_line, cursor_col) = self.cursor.line_col(&self.session.definition_text);
        RenderState {
            version: next_version(),
            provider: self.session.provider,
            credential_present: self.session.provider.credential_present(),
            catalog: self.catalog_rows(),
            catalog_cursor: self.catalog_cursor,
            selected: self.session.selected.clone(),
            focus: self.focus,
            editing_name: self.session.editing_name.clone(),
            definition_text: self.session.definition_text.clone(),
            cursor_line,
            cursor_col,
            result: self.session.result.clone(),
            result_scroll: self.result_scroll,
            log_lines: self.session.log.iter().map(|e| e.line()).collect(),
            running: self.running,
            notification: self.notification.clone(),
            show_keymap: self.show_keymap,
        }
    }
}
