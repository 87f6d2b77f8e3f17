//! Runtime event stream payloads.

use std::path::PathBuf;

use crate::types::RecordId;

/// Events emitted from the single-writer runtime loop.
///
/// View surfaces subscribe to this stream and re-render after every
/// mutation; persistence failures arrive here as notifications rather than
/// as errors on the triggering call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    /// A record was appended to the table.
    Added {
        /// New record id.
        id: RecordId,
    },
    /// Records were removed from the table.
    Removed {
        /// Removed ids in table order; absent requested ids are not listed.
        ids: Vec<RecordId>,
    },
    /// Availability changed for a batch of records.
    AvailabilityChanged {
        /// Matched ids in table order.
        ids: Vec<RecordId>,
        /// Value the matched records now carry.
        available: bool,
    },
    /// The table was replaced from durable storage.
    Reloaded {
        /// Row count after the reload.
        rows: usize,
    },
    /// The full table reached durable storage.
    Persisted,
    /// A full-table rewrite failed; the in-memory mutation was kept.
    PersistFailed {
        /// Human-readable failure description.
        detail: String,
    },
    /// A reload failed; the in-memory table was left unchanged.
    LoadFailed {
        /// Human-readable failure description.
        detail: String,
    },
    /// A label artifact is ready for delivery.
    LabelReady {
        /// Record the artifact belongs to.
        id: RecordId,
        /// Artifact location on disk.
        path: PathBuf,
    },
}
