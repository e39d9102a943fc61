//! Orchestration documents.
//!
//! The store and the editor deal in raw JSON values so that whatever the user
//! wrote is saved back untouched. [`OrchestrationDefinition`] is the lenient,
//! typed view the runner reads: every field is optional and unknown fields
//! are ignored.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Editor content for "Load example", "Clear all" and a fresh session.
pub const EXAMPLE_DEFINITION: &str = r#"{
  "name": "Simple Greeting",
  "description": "A basic orchestration to generate a greeting.",
  "tasks": {
    "greeting_task": {
      "model": "gemini-pro",
      "prompt": "Generate a warm greeting for a new user. Keep it concise.",
      "output_parser": "text",
      "next_tasks": []
    }
  }
}"#;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Executed in document order. `null` and other empty values mean no tasks.
    #[serde(default, deserialize_with = "tasks_or_empty")]
    pub tasks: IndexMap<String, TaskDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_parser: Option<String>,
    /// Not consulted: tasks run in document order regardless.
    #[serde(default)]
    pub next_tasks: Vec<String>,
}

fn tasks_or_empty<'de, D>(
    deserializer: D,
) -> std::result::Result<IndexMap<String, TaskDefinition>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if is_blank(&value) {
        return Ok(IndexMap::new());
    }
    IndexMap::<String, TaskDefinition>::deserialize(value).map_err(serde::de::Error::custom)
}

impl OrchestrationDefinition {
    pub fn from_value(value: &Value) -> Result<Self> {
        Self::deserialize(value).map_err(Error::DefinitionParse)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed Orchestration")
    }
}

impl TaskDefinition {
    pub fn effective_model<'a>(&'a self, default: &'a str) -> &'a str {
        self.model.as_deref().unwrap_or(default)
    }

    pub fn prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or_default()
    }
}

/// Parse editor text as JSON. Any JSON is accepted; no schema check.
pub fn parse_document(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(Error::DefinitionParse)
}

/// True for documents with nothing to run: `null`, `false`, `0`, `""`, `[]`, `{}`.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Pretty-print with 2-space indentation, as the store file and editor use.
pub fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
