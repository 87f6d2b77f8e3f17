//! Persistence abstraction and JSON document implementation.

/// Full-rewrite JSON document store.
pub mod json;

use crate::core::store::{InventoryStore, StoreError, TableSnapshotV1};

/// Failure modes for durable table storage.
#[derive(Debug)]
pub enum PersistError {
    /// The durable document could not be read.
    Read(std::io::Error),
    /// The durable document could not be written.
    Write(std::io::Error),
    /// Durable content did not decode as a table document.
    Decode(serde_json::Error),
    /// The table could not be encoded.
    Encode(serde_json::Error),
    /// Any other failure.
    Message(String),
}

impl PersistError {
    /// True when a read failed because the document does not exist yet.
    ///
    /// First run is the one read failure the caller recovers from by
    /// starting with an empty table instead of surfacing an error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Read(err) if err.kind() == std::io::ErrorKind::NotFound)
    }
}

impl From<StoreError> for PersistError {
    fn from(value: StoreError) -> Self {
        Self::Message(format!("store error: {value:?}"))
    }
}

/// Result alias for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Durable storage holding exactly one full table.
///
/// `save` overwrites all prior content; there is no row-level update. `load`
/// reads the complete table back. Round-trip fidelity (`save` then `load`
/// yields an equal snapshot) is required of every implementation.
pub trait TableStore: Send {
    /// Reads the complete table.
    fn load(&mut self) -> PersistResult<TableSnapshotV1>;

    /// Overwrites durable content with `snapshot`.
    fn save(&mut self, snapshot: &TableSnapshotV1) -> PersistResult<()>;
}

/// Loads a store from durable storage, starting empty on first run.
///
/// A missing document yields an empty table; every other load failure is
/// surfaced so the caller can notify the user and keep its last-known-good
/// state.
pub fn load_or_default(store: &mut dyn TableStore) -> PersistResult<InventoryStore> {
    match store.load() {
        Ok(snapshot) => Ok(InventoryStore::from_snapshot(snapshot)?),
        Err(err) if err.is_not_found() => Ok(InventoryStore::new()),
        Err(err) => Err(err),
    }
}
