pub mod config;
pub mod editor;
pub mod error;
pub mod log;
pub mod orchestration;
pub mod provider;
pub mod session;
pub mod store;
pub mod util;

// Decoupled logic/render loop
pub mod actors;
pub mod app;
pub mod render;
pub mod tea;
pub mod ui;

pub use error::{Error, Result};
pub use orchestration::{OrchestrationDefinition, RunLog, RunResult};
pub use provider::{CompletionClient, Provider};
pub use session::SessionState;
pub use store::{OrchestrationStore, Orchestrations};
