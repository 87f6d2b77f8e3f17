//! Inventory domain record and draft types.

use serde::{Deserialize, Serialize};

use crate::types::RecordId;

/// Fully materialized, authoritative inventory row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Stable record identifier.
    pub id: RecordId,
    /// Part name. Never empty.
    pub name: String,
    /// Free-form description. May be empty.
    pub description: String,
    /// True when the part is on the shelf.
    pub available: bool,
}

/// Insert payload used to create a new [`InventoryRecord`].
///
/// The store assigns the id and sets `available = true`; name and
/// description are immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordDraft {
    /// Part name. Must be non-empty.
    pub name: String,
    /// Free-form description.
    pub description: String,
}
