//! Shared primitive identifiers.

/// Unique inventory record identifier.
pub type RecordId = u64;

/// Id assigned to the first record added to an empty table.
pub const FIRST_RECORD_ID: RecordId = 1;
