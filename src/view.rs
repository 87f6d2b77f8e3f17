//! View-controller boundary: rendering surface contract and event bridge.
//!
//! The actual UI is an external collaborator; this module pins down the call
//! contract it consumes. The bridge keeps no business logic: it translates
//! runtime events into `render`/`notify`/`deliver_artifact` calls and nothing
//! else.

use std::path::Path;
use std::sync::Arc;

use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::debug;

use crate::{
    record::InventoryRecord,
    runtime::{events::InventoryEvent, handle::InventoryHandle},
};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Routine confirmation.
    Info,
    /// Something failed; the table may be stale or not durable.
    Error,
}

/// One-shot user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Notification severity.
    pub severity: Severity,
    /// Display text.
    pub message: String,
}

impl Notice {
    fn info(message: &str) -> Self {
        Self {
            severity: Severity::Info,
            message: message.to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            severity: Severity::Error,
            message: message.to_string(),
        }
    }
}

/// Rendering surface driven by the runtime event stream.
///
/// Implementations hold transient UI state only (current selection, filter
/// text); every durable mutation goes through
/// [`InventoryHandle`](crate::runtime::handle::InventoryHandle). Whether a
/// removal needs a confirmation prompt is the surface's decision; by the
/// time `remove` is invoked the operation is unconditional.
pub trait ViewSurface: Send + Sync {
    /// Replaces the displayed rows with the current table.
    fn render(&self, rows: &[InventoryRecord]);

    /// Shows a one-shot notification.
    fn notify(&self, notice: Notice);

    /// Offers a generated label artifact for download.
    fn deliver_artifact(&self, path: &Path) {
        let _ = path;
    }
}

/// Bridges the runtime event stream onto a view surface.
///
/// Re-renders after every mutation or reload, surfaces persistence failures
/// as error notices, and hands finished label artifacts to the surface. The
/// task ends when the runtime shuts down.
pub fn bind_view(handle: InventoryHandle, view: Arc<dyn ViewSurface>) -> JoinHandle<()> {
    let mut events = handle.subscribe();

    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                received = events.recv() => received,
                // The runtime stopped; there is nothing left to bridge.
                _ = handle.closed() => break,
            };

            let event = match received {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    // Dropped events are fine; one fresh render catches up.
                    debug!(skipped, "view bridge lagged; re-rendering");
                    if !render_current(&handle, view.as_ref()).await {
                        break;
                    }
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            match event {
                InventoryEvent::Added { .. }
                | InventoryEvent::Removed { .. }
                | InventoryEvent::AvailabilityChanged { .. }
                | InventoryEvent::Reloaded { .. } => {
                    if !render_current(&handle, view.as_ref()).await {
                        break;
                    }
                }
                InventoryEvent::Persisted => {
                    view.notify(Notice::info("Saved"));
                }
                InventoryEvent::PersistFailed { .. } => {
                    view.notify(Notice::error("Error Saving File!"));
                }
                InventoryEvent::LoadFailed { .. } => {
                    view.notify(Notice::error("Error Loading File!"));
                }
                InventoryEvent::LabelReady { path, .. } => {
                    view.deliver_artifact(&path);
                }
            }
        }
    })
}

async fn render_current(handle: &InventoryHandle, view: &dyn ViewSurface) -> bool {
    match handle.rows().await {
        Ok(rows) => {
            view.render(&rows);
            true
        }
        Err(_) => false,
    }
}
