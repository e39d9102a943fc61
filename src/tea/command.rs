//! Commands for the TEA (The Elm Architecture) pattern.
//!
//! Commands are outputs from the update function - they represent side effects
//! to be executed by the runtime.

use serde_json::Value;

use crate::orchestration::OrchestrationDefinition;
use crate::provider::Provider;

/// Output commands from the update function.
#[derive(Debug, PartialEq)]
pub enum Command {
    // Store operations (spawn blocking tasks)
    SaveOrchestration { name: String, definition: Value },
    DeleteOrchestration { name: String },
    ReloadCatalog,

    // Orchestration run (spawns the runner)
    Execute {
        definition: OrchestrationDefinition,
        provider: Provider,
    },

    // App lifecycle
    Quit,
}
