//! Text-generation providers.
//!
//! A run talks to exactly one provider through a [`CompletionClient`]. The
//! client is built once, up front, from the provider's credential variable;
//! a missing credential fails before any task is attempted.

pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::{mlog_debug, Error, Result};

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// The external service a run is submitted to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    #[serde(rename = "openai")]
    #[value(name = "openai")]
    OpenAi,
}

impl Provider {
    /// Human-readable name, as shown in the provider selector and run log.
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::OpenAi => "OpenAI ChatGPT",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn credential_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GOOGLE_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-pro",
            Provider::OpenAi => "gpt-4o",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::OpenAi => "https://api.openai.com",
        }
    }

    pub fn toggle(&self) -> Provider {
        match self {
            Provider::Gemini => Provider::OpenAi,
            Provider::OpenAi => Provider::Gemini,
        }
    }

    pub fn credential_present(&self) -> bool {
        read_credential(self.credential_var()).is_some()
    }

    /// Build a client from the credential in the process environment.
    pub fn client(self, config: &Config) -> Result<Box<dyn CompletionClient>> {
        self.client_with_key(config, read_credential(self.credential_var()))
    }

    pub fn client_with_key(
        self,
        config: &Config,
        api_key: Option<String>,
    ) -> Result<Box<dyn CompletionClient>> {
        let Some(api_key) = api_key.filter(|k| !k.trim().is_empty()) else {
            return Err(Error::Configuration(format!(
                "{} environment variable not set.",
                self.credential_var()
            )));
        };
        let base_url = config.base_url(self).to_string();
        mlog_debug!("Provider::client provider={} base_url={}", self, base_url);
        Ok(match self {
            Provider::Gemini => Box::new(GeminiClient::new(api_key, base_url)),
            Provider::OpenAi => Box::new(OpenAiClient::new(api_key, base_url)),
        })
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn read_credential(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// One blocking-from-the-caller's-view completion request per call.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}

/// Error envelope shared by both APIs: `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub(crate) fn api_error(provider: Provider, status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                "empty error response".to_string()
            } else {
                body.trim().to_string()
            }
        });
    Error::Provider {
        provider,
        status: Some(status),
        message,
    }
}
