use std::collections::BTreeSet;
use std::path::PathBuf;

use tokio::{
    sync::{broadcast, mpsc, oneshot},
    time::{Duration, Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, warn};

use crate::{
    core::store::{InventoryStore, StoreError},
    label::{CompositionError, compositor::LabelCompositor},
    persist::{PersistError, TableStore},
    record::{InventoryRecord, RecordDraft},
    types::RecordId,
};

use super::events::InventoryEvent;

/// Errors surfaced by [`InventoryHandle`] calls.
#[derive(Debug)]
pub enum RuntimeError {
    /// Store-level mutation failure.
    Store(StoreError),
    /// Durable storage failure.
    Persist(PersistError),
    /// Label composition failure.
    Compose(CompositionError),
    /// Label generation requested but no compositor was configured.
    LabelsUnavailable,
    /// The runtime task is gone.
    ChannelClosed,
}

impl From<StoreError> for RuntimeError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<PersistError> for RuntimeError {
    fn from(value: PersistError) -> Self {
        Self::Persist(value)
    }
}

impl From<CompositionError> for RuntimeError {
    fn from(value: CompositionError) -> Self {
        Self::Compose(value)
    }
}

/// Tunables for [`spawn_inventory`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Command queue depth shared by all handles.
    pub cmd_queue_bound: usize,
    /// Event buffer capacity per subscriber.
    pub events_capacity: usize,
    /// Optional periodic reload from durable storage.
    ///
    /// The timer runs inside the command loop, so reloads serialize against
    /// user mutations instead of racing them.
    pub refresh_interval: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            cmd_queue_bound: 256,
            events_capacity: 1024,
            refresh_interval: None,
        }
    }
}

/// Cloneable handle to the single-writer inventory runtime.
pub struct InventoryHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<InventoryEvent>,
}

impl Clone for InventoryHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    Add {
        draft: RecordDraft,
        resp: oneshot::Sender<Result<InventoryRecord, RuntimeError>>,
    },
    Remove {
        ids: BTreeSet<RecordId>,
        resp: oneshot::Sender<Result<Vec<RecordId>, RuntimeError>>,
    },
    SetAvailability {
        ids: BTreeSet<RecordId>,
        available: bool,
        resp: oneshot::Sender<Result<Vec<RecordId>, RuntimeError>>,
    },
    Scan {
        id: RecordId,
        available: bool,
        resp: oneshot::Sender<Result<bool, RuntimeError>>,
    },
    Get {
        id: RecordId,
        resp: oneshot::Sender<Option<InventoryRecord>>,
    },
    Rows {
        resp: oneshot::Sender<Vec<InventoryRecord>>,
    },
    Reload {
        resp: oneshot::Sender<Result<usize, RuntimeError>>,
    },
    Label {
        id: RecordId,
        resp: oneshot::Sender<Result<PathBuf, RuntimeError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
}

/// Spawns the single-writer command loop and returns its handle.
///
/// One task exclusively owns `store`; every command, including its full-table
/// persist, runs to completion before the next command is taken. With
/// `sink = None` the table is in-memory only. `labels = None` disables the
/// label operation.
pub fn spawn_inventory(
    store: InventoryStore,
    sink: Option<Box<dyn TableStore>>,
    labels: Option<LabelCompositor>,
    config: RuntimeConfig,
) -> InventoryHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.cmd_queue_bound);
    let (events_tx, _) = broadcast::channel::<InventoryEvent>(config.events_capacity);

    let events_tx_loop = events_tx.clone();
    let refresh_interval = config.refresh_interval;

    tokio::spawn(async move {
        let mut store = store;
        let mut sink = sink;
        let labels = labels;

        let mut refresh = refresh_interval.map(|period| {
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            timer
        });

        loop {
            if let Some(timer) = refresh.as_mut() {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        let Some(cmd) = cmd else { break };
                        if handle_command(cmd, &mut store, &mut sink, &labels, &events_tx_loop) {
                            break;
                        }
                    }
                    _ = timer.tick() => {
                        reload_table(&mut store, &mut sink, &events_tx_loop);
                    }
                }
            } else {
                let Some(cmd) = cmd_rx.recv().await else { break };
                if handle_command(cmd, &mut store, &mut sink, &labels, &events_tx_loop) {
                    break;
                }
            }
        }
    });

    InventoryHandle { cmd_tx, events_tx }
}

impl InventoryHandle {
    /// Subscribes to the runtime event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<InventoryEvent> {
        self.events_tx.subscribe()
    }

    /// Resolves once the runtime task has stopped accepting commands.
    pub async fn closed(&self) {
        self.cmd_tx.closed().await;
    }

    /// Adds a record and persists the table.
    pub async fn add(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<InventoryRecord, RuntimeError> {
        let draft = RecordDraft {
            name: name.into(),
            description: description.into(),
        };
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Add { draft, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Removes a batch of records, ignoring absent ids, and persists once.
    ///
    /// Returns the ids actually removed.
    pub async fn remove(
        &self,
        ids: impl IntoIterator<Item = RecordId>,
    ) -> Result<Vec<RecordId>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Remove {
                ids: ids.into_iter().collect(),
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Re-flags a batch of records, ignoring absent ids, and persists once.
    ///
    /// Returns the ids actually matched.
    pub async fn set_availability(
        &self,
        ids: impl IntoIterator<Item = RecordId>,
        available: bool,
    ) -> Result<Vec<RecordId>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::SetAvailability {
                ids: ids.into_iter().collect(),
                available,
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Scanner flow: flags one record, ignoring an unknown id.
    ///
    /// Returns `true` when the id matched a record.
    pub async fn scan(&self, id: RecordId, available: bool) -> Result<bool, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Scan {
                id,
                available,
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Fetches one record.
    pub async fn get(&self, id: RecordId) -> Result<Option<InventoryRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Get { id, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Fetches the full table in display order.
    pub async fn rows(&self) -> Result<Vec<InventoryRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Rows { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Replaces the table from durable storage.
    ///
    /// On failure the in-memory table is left unchanged. Returns the row
    /// count after the reload.
    pub async fn reload(&self) -> Result<usize, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Reload { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Ensures a label artifact exists for `id` and returns its path.
    pub async fn label(&self, id: RecordId) -> Result<PathBuf, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Label { id, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Stops the runtime after one final persist.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }
}

fn handle_command(
    cmd: Command,
    store: &mut InventoryStore,
    sink: &mut Option<Box<dyn TableStore>>,
    labels: &Option<LabelCompositor>,
    events_tx: &broadcast::Sender<InventoryEvent>,
) -> bool {
    match cmd {
        Command::Add { draft, resp } => {
            let res = match store.add(draft) {
                Ok(rec) => {
                    persist_table(store, sink, events_tx);
                    let _ = events_tx.send(InventoryEvent::Added { id: rec.id });
                    Ok(rec)
                }
                Err(err) => Err(RuntimeError::from(err)),
            };
            let _ = resp.send(res);
        }
        Command::Remove { ids, resp } => {
            let removed = store.remove_batch(&ids);
            persist_table(store, sink, events_tx);
            let _ = events_tx.send(InventoryEvent::Removed {
                ids: removed.clone(),
            });
            let _ = resp.send(Ok(removed));
        }
        Command::SetAvailability {
            ids,
            available,
            resp,
        } => {
            let touched = store.set_availability_batch(&ids, available);
            persist_table(store, sink, events_tx);
            let _ = events_tx.send(InventoryEvent::AvailabilityChanged {
                ids: touched.clone(),
                available,
            });
            let _ = resp.send(Ok(touched));
        }
        Command::Scan {
            id,
            available,
            resp,
        } => {
            let hit = store.set_availability_by_scan(id, available);
            persist_table(store, sink, events_tx);
            if hit {
                let _ = events_tx.send(InventoryEvent::AvailabilityChanged {
                    ids: vec![id],
                    available,
                });
            }
            let _ = resp.send(Ok(hit));
        }
        Command::Get { id, resp } => {
            let _ = resp.send(store.get_cloned(id));
        }
        Command::Rows { resp } => {
            let _ = resp.send(store.rows_cloned());
        }
        Command::Reload { resp } => {
            let res = match sink.as_deref_mut() {
                Some(sink) => match load_snapshot(sink) {
                    Ok(replacement) => {
                        *store = replacement;
                        let rows = store.len();
                        let _ = events_tx.send(InventoryEvent::Reloaded { rows });
                        Ok(rows)
                    }
                    Err(err) => {
                        let _ = events_tx.send(InventoryEvent::LoadFailed {
                            detail: format!("{err:?}"),
                        });
                        Err(RuntimeError::Persist(err))
                    }
                },
                None => Ok(store.len()),
            };
            let _ = resp.send(res);
        }
        Command::Label { id, resp } => {
            let res = match (store.get(id), labels) {
                (None, _) => Err(RuntimeError::Store(StoreError::MissingRecord(id))),
                (Some(_), None) => Err(RuntimeError::LabelsUnavailable),
                (Some(rec), Some(compositor)) => match compositor.ensure_label(id, &rec.name) {
                    Ok(path) => {
                        let _ = events_tx.send(InventoryEvent::LabelReady {
                            id,
                            path: path.clone(),
                        });
                        Ok(path)
                    }
                    Err(err) => Err(RuntimeError::Compose(err)),
                },
            };
            let _ = resp.send(res);
        }
        Command::Shutdown { resp } => {
            let out = match sink.as_deref_mut() {
                Some(sink) => sink
                    .save(&store.export_snapshot())
                    .map_err(RuntimeError::Persist),
                None => Ok(()),
            };
            let _ = resp.send(out);
            return true;
        }
    }

    false
}

/// Full-table rewrite after a mutation.
///
/// Failure is surfaced as an event; the in-memory mutation stands either
/// way (the system tolerates a window of durability loss rather than rolling
/// back).
fn persist_table(
    store: &InventoryStore,
    sink: &mut Option<Box<dyn TableStore>>,
    events_tx: &broadcast::Sender<InventoryEvent>,
) {
    let Some(sink) = sink.as_deref_mut() else {
        let _ = events_tx.send(InventoryEvent::Persisted);
        return;
    };

    match sink.save(&store.export_snapshot()) {
        Ok(()) => {
            let _ = events_tx.send(InventoryEvent::Persisted);
        }
        Err(err) => {
            warn!(?err, "full-table rewrite failed; keeping in-memory state");
            let _ = events_tx.send(InventoryEvent::PersistFailed {
                detail: format!("{err:?}"),
            });
        }
    }
}

fn reload_table(
    store: &mut InventoryStore,
    sink: &mut Option<Box<dyn TableStore>>,
    events_tx: &broadcast::Sender<InventoryEvent>,
) {
    let Some(sink) = sink.as_deref_mut() else {
        return;
    };

    match load_snapshot(sink) {
        Ok(replacement) => {
            *store = replacement;
            debug!(rows = store.len(), "periodic refresh reloaded table");
            let _ = events_tx.send(InventoryEvent::Reloaded { rows: store.len() });
        }
        Err(err) => {
            warn!(?err, "periodic refresh failed; keeping in-memory state");
            let _ = events_tx.send(InventoryEvent::LoadFailed {
                detail: format!("{err:?}"),
            });
        }
    }
}

fn load_snapshot(sink: &mut dyn TableStore) -> Result<InventoryStore, PersistError> {
    let snapshot = sink.load()?;
    Ok(InventoryStore::from_snapshot(snapshot)?)
}
