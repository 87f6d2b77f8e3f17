//! JSON table document rewritten in full on every save.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{core::store::TableSnapshotV1, record::InventoryRecord, types::RecordId};

use super::{PersistError, PersistResult, TableStore};

/// Column names serialized into every document, in table order.
pub const COLUMNS: [&str; 4] = ["id", "name", "descr", "flagged"];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RowV1 {
    id: RecordId,
    name: String,
    descr: String,
    flagged: bool,
}

impl From<&InventoryRecord> for RowV1 {
    fn from(rec: &InventoryRecord) -> Self {
        Self {
            id: rec.id,
            name: rec.name.clone(),
            descr: rec.description.clone(),
            flagged: rec.available,
        }
    }
}

impl From<RowV1> for InventoryRecord {
    fn from(row: RowV1) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.descr,
            available: row.flagged,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableDocument {
    columns: Vec<String>,
    rows: Vec<RowV1>,
}

/// JSON file implementation of [`TableStore`].
///
/// Saves write a sibling temp file and rename it into place, so a crashed
/// write never leaves a partial document at the durable path.
pub struct JsonTableFile {
    path: PathBuf,
}

impl JsonTableFile {
    /// Points the store at `path` without touching the filesystem.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the durable document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name: OsString = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("table.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TableStore for JsonTableFile {
    fn load(&mut self) -> PersistResult<TableSnapshotV1> {
        let bytes = fs::read(&self.path).map_err(PersistError::Read)?;
        let doc: TableDocument = serde_json::from_slice(&bytes).map_err(PersistError::Decode)?;

        if doc.columns.len() != COLUMNS.len()
            || doc.columns.iter().zip(COLUMNS).any(|(got, want)| got != want)
        {
            return Err(PersistError::Message(format!(
                "unexpected columns: {:?}",
                doc.columns
            )));
        }

        Ok(TableSnapshotV1 {
            rows: doc.rows.into_iter().map(InventoryRecord::from).collect(),
        })
    }

    fn save(&mut self, snapshot: &TableSnapshotV1) -> PersistResult<()> {
        let doc = TableDocument {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: snapshot.rows.iter().map(RowV1::from).collect(),
        };
        let bytes = serde_json::to_vec_pretty(&doc).map_err(PersistError::Encode)?;

        let tmp = self.tmp_path();
        fs::write(&tmp, &bytes).map_err(PersistError::Write)?;
        fs::rename(&tmp, &self.path).map_err(PersistError::Write)?;

        debug!(
            rows = snapshot.rows.len(),
            path = %self.path.display(),
            "table document rewritten"
        );
        Ok(())
    }
}
