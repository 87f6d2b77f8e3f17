use std::collections::BTreeSet;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{
    record::{InventoryRecord, RecordDraft},
    types::{FIRST_RECORD_ID, RecordId},
};

/// Errors surfaced by [`InventoryStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Referenced record does not exist.
    MissingRecord(RecordId),
    /// A snapshot carried two rows with the same id.
    DuplicateId(RecordId),
    /// Record names must be non-empty.
    EmptyName,
}

/// Serializable full-table snapshot in display order.
///
/// This is the unit of persistence: durable storage always holds exactly
/// one snapshot, rewritten in full after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TableSnapshotV1 {
    /// Rows in insertion order.
    pub rows: Vec<InventoryRecord>,
}

/// Authoritative in-memory inventory table.
///
/// The table is exclusively owned by whoever holds it; the runtime wraps it
/// in a single-writer command loop. Batch mutations silently ignore absent
/// ids and report which ids they actually touched.
#[derive(Debug, Default)]
pub struct InventoryStore {
    records: HashMap<RecordId, InventoryRecord>,
    order: Vec<RecordId>,
}

impl InventoryStore {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a table from a persisted snapshot.
    pub fn from_snapshot(snapshot: TableSnapshotV1) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for rec in snapshot.rows {
            if store.records.contains_key(&rec.id) {
                return Err(StoreError::DuplicateId(rec.id));
            }
            store.order.push(rec.id);
            store.records.insert(rec.id, rec);
        }
        Ok(store)
    }

    /// Clones the full table in display order.
    pub fn export_snapshot(&self) -> TableSnapshotV1 {
        TableSnapshotV1 {
            rows: self.rows_cloned(),
        }
    }

    /// Next id to assign: one past the current maximum, or
    /// [`FIRST_RECORD_ID`] on an empty table.
    ///
    /// Recomputed from the live table, so removing the current maximum makes
    /// that id eligible again on the next add.
    pub fn next_id(&self) -> RecordId {
        self.records
            .keys()
            .copied()
            .max()
            .map_or(FIRST_RECORD_ID, |max| max + 1)
    }

    /// Appends a new record with the next id and `available = true`.
    pub fn add(&mut self, draft: RecordDraft) -> Result<InventoryRecord, StoreError> {
        if draft.name.is_empty() {
            return Err(StoreError::EmptyName);
        }

        let rec = InventoryRecord {
            id: self.next_id(),
            name: draft.name,
            description: draft.description,
            available: true,
        };

        self.order.push(rec.id);
        self.records.insert(rec.id, rec.clone());
        Ok(rec)
    }

    /// Removes every record whose id is in `ids`.
    ///
    /// Absent ids are silently ignored. Returns the removed ids in table
    /// order.
    pub fn remove_batch(&mut self, ids: &BTreeSet<RecordId>) -> Vec<RecordId> {
        let removed: Vec<RecordId> = self
            .order
            .iter()
            .copied()
            .filter(|id| ids.contains(id))
            .collect();

        for id in &removed {
            self.records.remove(id);
        }
        self.order.retain(|id| !ids.contains(id));
        removed
    }

    /// Sets `available` on every record whose id is in `ids`.
    ///
    /// Absent ids are silently ignored. Returns the matched ids in table
    /// order.
    pub fn set_availability_batch(
        &mut self,
        ids: &BTreeSet<RecordId>,
        available: bool,
    ) -> Vec<RecordId> {
        let mut touched = Vec::new();
        for id in &self.order {
            if ids.contains(id) {
                if let Some(rec) = self.records.get_mut(id) {
                    rec.available = available;
                    touched.push(*id);
                }
            }
        }
        touched
    }

    /// Single-id scanner form of [`Self::set_availability_batch`].
    ///
    /// Returns `true` when the id matched a record; an unknown id is ignored
    /// and yields `false`.
    pub fn set_availability_by_scan(&mut self, id: RecordId, available: bool) -> bool {
        match self.records.get_mut(&id) {
            Some(rec) => {
                rec.available = available;
                true
            }
            None => false,
        }
    }

    /// Borrows a record by id.
    pub fn get(&self, id: RecordId) -> Option<&InventoryRecord> {
        self.records.get(&id)
    }

    /// Clones a record by id.
    pub fn get_cloned(&self, id: RecordId) -> Option<InventoryRecord> {
        self.get(id).cloned()
    }

    /// Borrows all records in display order.
    pub fn rows(&self) -> Vec<&InventoryRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Clones all records in display order.
    pub fn rows_cloned(&self) -> Vec<InventoryRecord> {
        self.rows().into_iter().cloned().collect()
    }

    /// Ids in display order.
    pub fn ids(&self) -> &[RecordId] {
        &self.order
    }

    /// True when `id` refers to a record.
    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the table has no records.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
