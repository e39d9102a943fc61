//! Working memory of the single-page form.
//!
//! `SessionState` is the part of the UI state that means something outside
//! the terminal: what is in the editor, which saved orchestration is selected,
//! which provider runs, and the outcome of the last run. It is plain data and
//! serializable; it is never persisted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::orchestration::{to_pretty, LogEntry, EXAMPLE_DEFINITION};
use crate::provider::Provider;

/// Label of the "nothing selected" entry in the saved-orchestration list.
pub const PLACEHOLDER: &str = "Select an orchestration...";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Raw editor text. May be invalid JSON.
    pub definition_text: String,
    /// Name the definition will be saved under.
    pub editing_name: String,
    pub provider: Provider,
    /// Saved orchestration currently selected, if any.
    pub selected: Option<String>,
    /// Pretty-printed result of the last successful run.
    pub result: Option<String>,
    pub log: Vec<LogEntry>,
}

impl SessionState {
    pub fn new(provider: Provider) -> Self {
        Self {
            definition_text: EXAMPLE_DEFINITION.to_string(),
            editing_name: String::new(),
            provider,
            selected: None,
            result: None,
            log: Vec::new(),
        }
    }

    /// Editor back to the example; selection, name, result and log cleared.
    pub fn reset_to_example(&mut self) {
        self.definition_text = EXAMPLE_DEFINITION.to_string();
        self.editing_name.clear();
        self.selected = None;
        self.clear_run();
    }

    pub fn load_saved(&mut self, name: &str, definition: &Value) {
        self.definition_text = to_pretty(definition);
        self.editing_name = name.to_string();
        self.selected = Some(name.to_string());
        self.clear_run();
    }

    pub fn clear_run(&mut self) {
        self.result = None;
        self.log.clear();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Provider::default())
    }
}
