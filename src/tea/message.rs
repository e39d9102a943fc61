//! Messages for the TEA (The Elm Architecture) pattern.
//!
//! Messages are inputs to the update function - they come from external sources
//! like keyboard events, background actors, or command completion callbacks.

use crossterm::event::KeyEvent;

use crate::orchestration::{LogEntry, RunResult};
use crate::store::Orchestrations;
use crate::Error;

use super::update::Action;

/// Input messages to the update function.
#[derive(Debug)]
pub enum Message {
    // Keyboard/terminal events
    Key(KeyEvent),
    Resize(u16, u16),

    /// A page action, independent of the key that triggered it
    Action(Action),

    // From the store watcher
    CatalogLoaded {
        orchestrations: Orchestrations,
        error: Option<String>,
    },

    // Command completion callbacks
    OrchestrationSaved {
        name: String,
        orchestrations: Orchestrations,
    },
    OrchestrationSaveFailed(String),
    OrchestrationDeleted {
        name: String,
        orchestrations: Orchestrations,
    },
    OrchestrationDeleteFailed {
        name: String,
        not_found: bool,
        error: String,
    },

    // Run progress
    RunLogged(LogEntry),
    RunFinished(RunResult),
    RunFailed(Error),
}
