//! Orchestration documents and their execution.

pub mod definition;
pub mod result;
pub mod run_log;
pub mod runner;

pub use definition::{
    is_blank, parse_document, to_pretty, OrchestrationDefinition, TaskDefinition,
    EXAMPLE_DEFINITION,
};
pub use result::{RunResult, TaskOutput, NO_TASKS};
pub use run_log::{render_log, LogEntry, LogPhase, RunId, RunLog, OUTPUT_SNIPPET_CHARS};
pub use runner::{execute, TaskRunner};
