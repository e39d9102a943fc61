//! Saved orchestrations, kept as a single JSON object on disk.
//!
//! The file maps orchestration name to the raw definition document. Loading
//! never fails: a missing file is an empty store, and an unreadable one is an
//! empty store plus the read error for the caller to report. Every save
//! rewrites the whole file. There is no locking; the last writer wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::util::blocking;
use crate::{mlog_debug, mlog_warn, Error, Result};

/// Name → definition document, sorted by name.
pub type Orchestrations = BTreeMap<String, Value>;

/// Result of [`OrchestrationStore::load`].
#[derive(Debug, Default)]
pub struct StoreLoad {
    pub orchestrations: Orchestrations,
    /// Set when the file existed but could not be read. `orchestrations` is
    /// empty in that case.
    pub error: Option<Error>,
}

impl StoreLoad {
    pub fn names(&self) -> Vec<String> {
        self.orchestrations.keys().cloned().collect()
    }
}

#[derive(Debug, Clone)]
pub struct OrchestrationStore {
    path: PathBuf,
}

impl OrchestrationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> StoreLoad {
        mlog_debug!("OrchestrationStore::load path={}", self.path.display());
        if !self.path.exists() {
            mlog_debug!("Store file not found, returning empty store");
            return StoreLoad::default();
        }

        let parsed = fs::read_to_string(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|contents| {
                serde_json::from_str::<Orchestrations>(&contents).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(orchestrations) => {
                mlog_debug!("Store loaded: {} orchestrations", orchestrations.len());
                StoreLoad {
                    orchestrations,
                    error: None,
                }
            }
            Err(message) => {
                mlog_warn!("Store read failed: {}: {}", self.path.display(), message);
                StoreLoad {
                    orchestrations: Orchestrations::new(),
                    error: Some(Error::StoreRead {
                        path: self.path.clone(),
                        message,
                    }),
                }
            }
        }
    }

    /// Write the whole mapping, pretty-printed with 2-space indentation.
    pub fn save(&self, orchestrations: &Orchestrations) -> Result<()> {
        mlog_debug!(
            "OrchestrationStore::save path={} count={}",
            self.path.display(),
            orchestrations.len()
        );
        let contents = serde_json::to_string_pretty(orchestrations)?;
        fs::write(&self.path, contents).map_err(|source| {
            mlog_warn!("Store write failed: {}: {}", self.path.display(), source);
            Error::StoreWrite {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Load fresh, insert or replace `name`, save. Returns the saved mapping.
    ///
    /// An unreadable file is replaced by a store holding just this entry.
    pub fn upsert(&self, name: &str, definition: Value) -> Result<Orchestrations> {
        let mut orchestrations = self.load().orchestrations;
        orchestrations.insert(name.to_string(), definition);
        self.save(&orchestrations)?;
        Ok(orchestrations)
    }

    /// Load fresh, remove `name`, save. Returns the saved mapping.
    pub fn remove(&self, name: &str) -> Result<Orchestrations> {
        let mut orchestrations = self.load().orchestrations;
        if orchestrations.remove(name).is_none() {
            return Err(Error::OrchestrationNotFound(name.to_string()));
        }
        self.save(&orchestrations)?;
        Ok(orchestrations)
    }

    pub async fn load_async(&self) -> StoreLoad {
        let store = self.clone();
        match blocking(move || Ok(store.load())).await {
            Ok(load) => load,
            Err(e) => StoreLoad {
                orchestrations: Orchestrations::new(),
                error: Some(e),
            },
        }
    }

    pub async fn upsert_async(&self, name: String, definition: Value) -> Result<Orchestrations> {
        let store = self.clone();
        blocking(move || store.upsert(&name, definition)).await
    }

    pub async fn remove_async(&self, name: String) -> Result<Orchestrations> {
        let store = self.clone();
        blocking(move || store.remove(&name)).await
    }
}
