//! Structured run log.
//!
//! Entries are kept as data and turned into text only when displayed. An
//! observer can be attached to see each entry as it is appended, which is how
//! the TUI shows progress while a run is in flight.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::provider::Provider;
use crate::util::snippet;

/// Characters of task output quoted in a completion entry.
pub const OUTPUT_SNIPPET_CHARS: usize = 70;

/// Identifier for one execution, used to correlate diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogPhase {
    Started,
    TaskStarted,
    TaskCompleted,
    Warning,
    Failed,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub task_id: Option<String>,
    pub phase: LogPhase,
    pub message: String,
}

impl LogEntry {
    pub fn new(phase: LogPhase, task_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            task_id: task_id.map(String::from),
            phase,
            message: message.into(),
        }
    }

    /// Display text for this entry.
    pub fn line(&self) -> String {
        match self.phase {
            LogPhase::Warning => format!("[WARNING] {}", self.message),
            LogPhase::Failed => format!("[ERROR] {}", self.message),
            _ => self.message.clone(),
        }
    }
}

/// Newline-terminated text for a sequence of entries.
pub fn render_log(entries: &[LogEntry]) -> String {
    entries.iter().map(|e| e.line() + "\n").collect()
}

type Observer = Box<dyn Fn(&LogEntry) + Send + Sync>;

/// Append-only log for a single run.
pub struct RunLog {
    run_id: RunId,
    entries: Vec<LogEntry>,
    observer: Option<Observer>,
}

impl RunLog {
    pub fn new() -> Self {
        Self {
            run_id: RunId::new(),
            entries: Vec::new(),
            observer: None,
        }
    }

    pub fn with_observer(observer: impl Fn(&LogEntry) + Send + Sync + 'static) -> Self {
        Self {
            observer: Some(Box::new(observer)),
            ..Self::new()
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn push(&mut self, entry: LogEntry) {
        if let Some(observer) = &self.observer {
            observer(&entry);
        }
        self.entries.push(entry);
    }

    pub fn started(&mut self, provider: Provider) {
        self.push(LogEntry::new(
            LogPhase::Started,
            None,
            format!("Starting orchestration using {}...", provider),
        ));
    }

    pub fn task_started(&mut self, task_id: &str, provider: Provider) {
        self.push(LogEntry::new(
            LogPhase::TaskStarted,
            Some(task_id),
            format!("Executing task: {} using {}", task_id, provider),
        ));
    }

    pub fn task_completed(&mut self, task_id: &str, output: &str) {
        self.push(LogEntry::new(
            LogPhase::TaskCompleted,
            Some(task_id),
            format!(
                "Task {} completed. Output: {}...",
                task_id,
                snippet(output, OUTPUT_SNIPPET_CHARS)
            ),
        ));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(LogEntry::new(LogPhase::Warning, None, message));
    }

    pub fn failed(&mut self, task_id: Option<&str>, error: &crate::Error) {
        self.push(LogEntry::new(
            LogPhase::Failed,
            task_id,
            format!("An error occurred during orchestration: {}", error),
        ));
    }

    pub fn completed(&mut self) {
        self.push(LogEntry::new(
            LogPhase::Completed,
            None,
            "Orchestration completed.",
        ));
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    pub fn render(&self) -> String {
        render_log(&self.entries)
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLog")
            .field("run_id", &self.run_id)
            .field("entries", &self.entries)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}
