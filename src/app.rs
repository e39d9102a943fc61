use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use crossterm::event::{self, Event, KeyEventKind};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::actors::{ActorHandle, StoreWatchActor};
use crate::config::Config;
use crate::orchestration::{execute, RunLog};
use crate::provider::Provider;
use crate::render::RenderState;
use crate::store::OrchestrationStore;
use crate::tea::{update, Command, Message, Model};
use crate::{mlog, mlog_debug, mlog_error, Error, Result};

const MAX_BG_MESSAGES: usize = 50;

/// Render-state channel ends. The logic thread keeps a receiver so it can
/// drop a stale snapshot before sending a newer one.
pub struct StateChannel {
    pub tx: Sender<RenderState>,
    pub rx: Receiver<RenderState>,
}

pub struct LogicThread;

impl LogicThread {
    pub fn run(
        config: Config,
        store: OrchestrationStore,
        provider: Provider,
        state: StateChannel,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        Runtime::new()?.block_on(Self::run_async(config, store, provider, state, shutdown))
    }

    async fn run_async(
        config: Config,
        store: OrchestrationStore,
        provider: Provider,
        state: StateChannel,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        mlog_debug!(
            "LogicThread::run_async store={} provider={}",
            store.path().display(),
            provider
        );

        let initial = store.load_async().await;
        let initial_error = initial.error.map(|e| e.to_string());
        let mut model = Model::new(
            initial.orchestrations,
            provider,
            config,
            store.path().to_path_buf(),
        );
        if initial_error.is_some() {
            let msg = Message::CatalogLoaded {
                orchestrations: model.orchestrations.clone(),
                error: initial_error,
            };
            update(&mut model, msg);
        }
        mlog_debug!("Model loaded: {} orchestrations", model.orchestrations.len());

        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Message>();
        let actors = spawn_actors(msg_tx.clone(), store.clone());

        send_state(&state, &model);

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Keyboard input (priority)
            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        for cmd in update(&mut model, Message::Key(key)) {
                            if execute_command(&model, cmd, &msg_tx, &store) {
                                shutdown.store(true, Ordering::Relaxed);
                                shutdown_actors(&actors);
                                return Ok(());
                            }
                        }
                    }
                    Event::Resize(w, h) => {
                        update(&mut model, Message::Resize(w, h));
                    }
                    _ => {}
                }

                if model.dirty {
                    send_state(&state, &model);
                    model.dirty = false;
                }
            }

            // Background messages (bounded)
            for _ in 0..MAX_BG_MESSAGES {
                let Ok(msg) = msg_rx.try_recv() else { break };
                for cmd in update(&mut model, msg) {
                    if execute_command(&model, cmd, &msg_tx, &store) {
                        shutdown.store(true, Ordering::Relaxed);
                        shutdown_actors(&actors);
                        return Ok(());
                    }
                }
            }

            if model.dirty {
                send_state(&state, &model);
                model.dirty = false;
            }

            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        shutdown_actors(&actors);
        Ok(())
    }
}

/// Run a command's side effect. Returns true when the app should quit.
fn execute_command(
    model: &Model,
    cmd: Command,
    msg_tx: &mpsc::UnboundedSender<Message>,
    store: &OrchestrationStore,
) -> bool {
    match cmd {
        Command::SaveOrchestration { name, definition } => {
            mlog_debug!("Command::SaveOrchestration name={}", name);
            let store = store.clone();
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                match store.upsert_async(name.clone(), definition).await {
                    Ok(orchestrations) => {
                        let _ = tx.send(Message::OrchestrationSaved {
                            name,
                            orchestrations,
                        });
                    }
                    Err(e) => {
                        mlog_error!("Save failed: {} - {}", name, e);
                        let _ = tx.send(Message::OrchestrationSaveFailed(e.to_string()));
                    }
                }
            });
        }

        Command::DeleteOrchestration { name } => {
            mlog_debug!("Command::DeleteOrchestration name={}", name);
            let store = store.clone();
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                match store.remove_async(name.clone()).await {
                    Ok(orchestrations) => {
                        let _ = tx.send(Message::OrchestrationDeleted {
                            name,
                            orchestrations,
                        });
                    }
                    Err(e) => {
                        mlog_error!("Delete failed: {} - {}", name, e);
                        let not_found = matches!(e, Error::OrchestrationNotFound(_));
                        let _ = tx.send(Message::OrchestrationDeleteFailed {
                            name,
                            not_found,
                            error: e.to_string(),
                        });
                    }
                }
            });
        }

        Command::ReloadCatalog => {
            mlog_debug!("Command::ReloadCatalog");
            let store = store.clone();
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                let load = store.load_async().await;
                let _ = tx.send(Message::CatalogLoaded {
                    orchestrations: load.orchestrations,
                    error: load.error.map(|e| e.to_string()),
                });
            });
        }

        Command::Execute {
            definition,
            provider,
        } => {
            mlog!(
                "Command::Execute orchestration={:?} provider={}",
                definition.display_name(),
                provider
            );
            let config = model.config.clone();
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                let log_tx = tx.clone();
                let mut log = RunLog::with_observer(move |entry| {
                    let _ = log_tx.send(Message::RunLogged(entry.clone()));
                });
                let outcome = execute(&definition, provider, &config, &mut log).await;
                let _ = match outcome {
                    Ok(result) => tx.send(Message::RunFinished(result)),
                    Err(e) => tx.send(Message::RunFailed(e)),
                };
            });
        }

        Command::Quit => {
            mlog_debug!("Command::Quit");
            return true;
        }
    }

    false
}

/// Latest wins: a snapshot the render thread has not taken yet is replaced.
fn send_state(state: &StateChannel, model: &Model) {
    let _ = state.rx.try_recv();
    let _ = state.tx.try_send(model.snapshot());
}

fn spawn_actors(msg_tx: mpsc::UnboundedSender<Message>, store: OrchestrationStore) -> Vec<ActorHandle> {
    mlog_debug!("Spawning actors");
    vec![StoreWatchActor::new(msg_tx, store).spawn()]
}

fn shutdown_actors(actors: &[ActorHandle]) {
    mlog_debug!("Shutting down {} actors", actors.len());
    for actor in actors {
        actor.shutdown();
    }
}
