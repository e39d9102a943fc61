use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::provider::Provider;
use crate::{mlog_debug, Error, Result};

const DEFAULT_STORE_FILE: &str = "orchestrations.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Path of the saved-orchestrations file. Relative paths resolve against
    /// the working directory.
    pub store_path: Option<String>,
    pub default_provider: Option<Provider>,
    pub gemini_base_url: Option<String>,
    pub openai_base_url: Option<String>,
    /// Model used when a task does not name one.
    pub gemini_model: Option<String>,
    pub openai_model: Option<String>,
}

impl Config {
    pub fn maestro_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".maestro"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::maestro_dir()?.join("maestro.toml"))
    }

    pub fn effective_store_path(&self) -> PathBuf {
        match &self.store_path {
            Some(path) => expand_tilde(path),
            None => PathBuf::from(DEFAULT_STORE_FILE),
        }
    }

    pub fn effective_provider(&self) -> Provider {
        self.default_provider.unwrap_or_default()
    }

    pub fn base_url(&self, provider: Provider) -> &str {
        let configured = match provider {
            Provider::Gemini => self.gemini_base_url.as_deref(),
            Provider::OpenAi => self.openai_base_url.as_deref(),
        };
        configured
            .unwrap_or_else(|| provider.default_base_url())
            .trim_end_matches('/')
    }

    pub fn default_model(&self, provider: Provider) -> &str {
        let configured = match provider {
            Provider::Gemini => self.gemini_model.as_deref(),
            Provider::OpenAi => self.openai_model.as_deref(),
        };
        configured.unwrap_or_else(|| provider.default_model())
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        mlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            mlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        mlog_debug!(
            "Config loaded: store_path={:?}, default_provider={:?}",
            config.store_path,
            config.default_provider
        );
        Ok(config)
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
