use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::definition::to_pretty;

pub const NO_TASKS: &str = "No tasks defined";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub output: String,
}

/// Outcome of a run that did not fail.
///
/// Serializes as `{"<task>": {"output": ...}, ...}` or `{"error": "No tasks defined"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunResult {
    NoTasks { error: String },
    Completed(IndexMap<String, TaskOutput>),
}

impl RunResult {
    pub fn no_tasks() -> Self {
        RunResult::NoTasks {
            error: NO_TASKS.to_string(),
        }
    }

    pub fn outputs(&self) -> Option<&IndexMap<String, TaskOutput>> {
        match self {
            RunResult::Completed(outputs) => Some(outputs),
            RunResult::NoTasks { .. } => None,
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    pub fn to_pretty(&self) -> String {
        to_pretty(&self.to_value())
    }
}
