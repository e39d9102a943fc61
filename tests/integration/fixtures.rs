//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - A scripted completion client
//! - Temporary orchestration stores
//! - A page harness that runs update commands synchronously

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;

use maestro::config::Config;
use maestro::orchestration::{RunLog, TaskRunner};
use maestro::store::{OrchestrationStore, Orchestrations};
use maestro::tea::{update, Action, Command, Message, Model};
use maestro::{CompletionClient, Error, Provider, Result};

/// One request seen by [`StubClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub model: String,
    pub prompt: String,
}

/// Replies from a queue; an exhausted queue or a `None` entry fails the call.
pub struct StubClient {
    provider: Provider,
    replies: Mutex<VecDeque<Option<String>>>,
    calls: Mutex<Vec<Call>>,
}

impl StubClient {
    pub fn replying(provider: Provider, replies: &[&str]) -> Self {
        Self::scripted(provider, replies.iter().map(|r| Some(*r)).collect())
    }

    pub fn scripted(provider: Provider, replies: Vec<Option<&str>>) -> Self {
        Self {
            provider,
            replies: Mutex::new(replies.into_iter().map(|r| r.map(String::from)).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for StubClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push(Call {
            model: model.to_string(),
            prompt: prompt.to_string(),
        });
        match self.replies.lock().unwrap().pop_front() {
            Some(Some(text)) => Ok(text),
            _ => Err(Error::Provider {
                provider: self.provider,
                status: Some(503),
                message: "The model is overloaded. Please try again later.".to_string(),
            }),
        }
    }
}

/// A store file inside a temporary directory.
pub struct TestStore {
    /// Kept alive for the lifetime of the store.
    pub temp_dir: TempDir,
    pub store: OrchestrationStore,
}

impl TestStore {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = OrchestrationStore::new(temp_dir.path().join("orchestrations.json"));
        Self { temp_dir, store }
    }

    pub fn path(&self) -> PathBuf {
        self.store.path().to_path_buf()
    }

    pub fn with(entries: &[(&str, Value)]) -> Self {
        let test_store = Self::new();
        let orchestrations: Orchestrations = entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        test_store
            .store
            .save(&orchestrations)
            .expect("Failed to seed store");
        test_store
    }
}

/// The page's update loop with commands executed inline.
///
/// Mirrors the logic thread: store commands go to the real store, runs go to
/// a [`StubClient`], and completions come back as messages.
pub struct PageHarness {
    pub model: Model,
    pub store: TestStore,
    pub client: StubClient,
    pub quit: bool,
}

impl PageHarness {
    pub fn new(store: TestStore, client: StubClient) -> Self {
        let load = store.store.load();
        let model = Model::new(
            load.orchestrations,
            client.provider(),
            Config::default(),
            store.path(),
        );
        Self {
            model,
            store,
            client,
            quit: false,
        }
    }

    pub async fn act(&mut self, action: Action) {
        self.send(Message::Action(action)).await;
    }

    pub async fn send(&mut self, msg: Message) {
        let mut pending = VecDeque::from([msg]);
        while let Some(msg) = pending.pop_front() {
            for cmd in update(&mut self.model, msg) {
                pending.extend(self.execute(cmd).await);
            }
        }
    }

    async fn execute(&mut self, cmd: Command) -> Vec<Message> {
        let store = &self.store.store;
        match cmd {
            Command::SaveOrchestration { name, definition } => {
                vec![match store.upsert(&name, definition) {
                    Ok(orchestrations) => Message::OrchestrationSaved {
                        name,
                        orchestrations,
                    },
                    Err(e) => Message::OrchestrationSaveFailed(e.to_string()),
                }]
            }
            Command::DeleteOrchestration { name } => vec![match store.remove(&name) {
                Ok(orchestrations) => Message::OrchestrationDeleted {
                    name,
                    orchestrations,
                },
                Err(e) => Message::OrchestrationDeleteFailed {
                    name,
                    not_found: matches!(e, Error::OrchestrationNotFound(_)),
                    error: e.to_string(),
                },
            }],
            Command::ReloadCatalog => {
                let load = store.load();
                vec![Message::CatalogLoaded {
                    orchestrations: load.orchestrations,
                    error: load.error.map(|e| e.to_string()),
                }]
            }
            Command::Execute { definition, .. } => {
                let mut log = RunLog::new();
                let outcome = TaskRunner::new(&self.client, &Config::default())
                    .run(&definition, &mut log)
                    .await;
                let mut msgs: Vec<Message> =
                    log.into_entries().into_iter().map(Message::RunLogged).collect();
                msgs.push(match outcome {
                    Ok(result) => Message::RunFinished(result),
                    Err(e) => Message::RunFailed(e),
                });
                msgs
            }
            Command::Quit => {
                self.quit = true;
                Vec::new()
            }
        }
    }

    pub fn notification(&self) -> String {
        self.model
            .notification
            .as_ref()
            .map(|n| n.message.clone())
            .unwrap_or_default()
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.model.session.log.iter().map(|e| e.line()).collect()
    }
}
