//! Store watcher: reloads the catalog when the store file changes on disk.
//!
//! Another maestro (or an editor) may rewrite the file at any time. The
//! containing directory is watched, since the file itself may not exist yet.
//! A burst of events is collapsed into one full reload.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::store::OrchestrationStore;
use crate::tea::Message;
use crate::{mlog_debug, mlog_trace, mlog_warn};

use super::ActorHandle;

const DEBOUNCE: Duration = Duration::from_millis(150);

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn is_store_event(event: &Event, file_name: &OsString) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

pub struct StoreWatchActor {
    msg_tx: mpsc::UnboundedSender<Message>,
    store: OrchestrationStore,
    debounce: Duration,
}

impl StoreWatchActor {
    pub fn new(msg_tx: mpsc::UnboundedSender<Message>, store: OrchestrationStore) -> Self {
        Self {
            msg_tx,
            store,
            debounce: DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Start watching. Changes made before this returns are not reported.
    ///
    /// If the watcher cannot be created the actor does nothing; the catalog
    /// still refreshes after the page's own saves and deletes.
    pub fn spawn(self) -> ActorHandle {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        let path = self.store.path().to_path_buf();
        let dir = watch_dir(&path);
        mlog_debug!(
            "StoreWatchActor::spawn path={} dir={}",
            path.display(),
            dir.display()
        );

        let Some(file_name) = path.file_name().map(OsString::from) else {
            mlog_warn!("StoreWatchActor: store path has no file name");
            return ActorHandle::new(cancel);
        };

        let (change_tx, mut change_rx) = mpsc::unbounded_channel::<()>();
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                if let Ok(event) = res {
                    if is_store_event(&event, &file_name) {
                        let _ = change_tx.send(());
                    }
                }
            },
            notify::Config::default(),
        )
        .and_then(|mut watcher| {
            watcher.watch(&dir, RecursiveMode::NonRecursive)?;
            Ok(watcher)
        });

        let watcher = match watcher {
            Ok(watcher) => watcher,
            Err(e) => {
                mlog_warn!("StoreWatchActor: cannot watch {}: {}", dir.display(), e);
                return ActorHandle::new(cancel);
            }
        };

        tokio::spawn(async move {
            // Dropping the watcher stops delivery.
            let _watcher = watcher;

            loop {
                tokio::select! {
                    _ = cancel_clone.cancelled() => {
                        mlog_debug!("StoreWatchActor cancelled");
                        break;
                    }
                    change = change_rx.recv() => {
                        if change.is_none() || self.msg_tx.is_closed() {
                            mlog_debug!("StoreWatchActor: channel closed");
                            break;
                        }

                        tokio::time::sleep(self.debounce).await;
                        let mut collapsed = 1;
                        while change_rx.try_recv().is_ok() {
                            collapsed += 1;
                        }
                        mlog_trace!("StoreWatchActor: {} events, reloading", collapsed);

                        let load = self.store.load_async().await;
                        let msg = Message::CatalogLoaded {
                            orchestrations: load.orchestrations,
                            error: load.error.map(|e| e.to_string()),
                        };
                        if self.msg_tx.send(msg).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        ActorHandle::new(cancel)
    }
}
