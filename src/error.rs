use std::path::PathBuf;

use thiserror::Error;

use crate::provider::Provider;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Task join error: {0}")]
    TaskJoin(String),

    /// The store file exists but could not be read as a JSON object.
    #[error("Error reading {}: {message}", path.display())]
    StoreRead { path: PathBuf, message: String },

    #[error("Error saving orchestrations to {}: {source}", path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid orchestration definition: {0}")]
    DefinitionParse(#[source] serde_json::Error),

    /// Nothing to execute: the document is blank or no source was given.
    #[error("Cannot execute with an invalid or empty orchestration definition.")]
    EmptyDefinition,

    /// A provider credential is missing.
    #[error("{0}")]
    Configuration(String),

    #[error("{provider} API error ({}): {message}", status.map(|s| s.to_string()).unwrap_or_else(|| "no status".to_string()))]
    Provider {
        provider: Provider,
        status: Option<u16>,
        message: String,
    },

    #[error("Orchestration not found: {0}")]
    OrchestrationNotFound(String),
}

impl Error {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
