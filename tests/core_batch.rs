use std::collections::BTreeSet;

use cotrack::{
    core::store::{InventoryStore, StoreError, TableSnapshotV1},
    record::{InventoryRecord, RecordDraft},
    types::RecordId,
};

fn draft(name: &str, description: &str) -> RecordDraft {
    RecordDraft {
        name: name.to_string(),
        description: description.to_string(),
    }
}

fn id_set(values: &[RecordId]) -> BTreeSet<RecordId> {
    values.iter().copied().collect()
}

fn seeded_store() -> InventoryStore {
    let mut store = InventoryStore::new();
    store.add(draft("Resistor 10k", "0805, reel")).unwrap();
    store.add(draft("Enclosure", "")).unwrap();
    store.add(draft("Cable tie", "100 pack")).unwrap();
    store
}

#[test]
fn add_yields_monotonic_ids_and_defaults() {
    let mut store = InventoryStore::new();
    let a = store.add(draft("Resistor 10k", "0805, reel")).unwrap();
    let b = store.add(draft("Enclosure", "")).unwrap();
    let c = store.add(draft("Cable tie", "100 pack")).unwrap();

    assert_eq!((a.id, b.id, c.id), (1, 2, 3));
    assert!(a.available && b.available && c.available);
    assert_eq!(b.description, "");
}

#[test]
fn first_id_on_empty_table_is_one() {
    let store = InventoryStore::new();
    assert_eq!(store.next_id(), 1);
    assert!(store.is_empty());
}

#[test]
fn next_id_follows_current_maximum() {
    let mut store = seeded_store();

    // Removing the current maximum makes its id eligible again; next_id is
    // recomputed from the live table, not a counter.
    store.remove_batch(&id_set(&[3]));
    assert_eq!(store.next_id(), 3);

    let again = store.add(draft("Heat shrink", "")).unwrap();
    assert_eq!(again.id, 3);
}

#[test]
fn remove_batch_ignores_absent_ids() {
    let mut store = seeded_store();

    let removed = store.remove_batch(&id_set(&[2, 4]));
    assert_eq!(removed, vec![2]);
    assert_eq!(store.ids(), &[1, 3]);
    assert_eq!(store.len(), 2);
}

#[test]
fn remove_batch_with_only_absent_ids_is_a_no_op() {
    let mut store = seeded_store();
    let before = store.rows_cloned();

    let removed = store.remove_batch(&id_set(&[99, 100]));
    assert!(removed.is_empty());
    assert_eq!(store.rows_cloned(), before);
}

#[test]
fn availability_batch_ignores_absent_ids() {
    let mut store = seeded_store();

    let touched = store.set_availability_batch(&id_set(&[1, 3, 42]), false);
    assert_eq!(touched, vec![1, 3]);
    assert!(!store.get(1).unwrap().available);
    assert!(store.get(2).unwrap().available);
    assert!(!store.get(3).unwrap().available);
}

#[test]
fn availability_batch_with_only_absent_ids_is_a_no_op() {
    let mut store = seeded_store();
    let before = store.rows_cloned();

    let touched = store.set_availability_batch(&id_set(&[42]), true);
    assert!(touched.is_empty());
    assert_eq!(store.rows_cloned(), before);
}

#[test]
fn scan_toggles_one_record_and_ignores_unknown_ids() {
    let mut store = seeded_store();

    assert!(store.set_availability_by_scan(2, false));
    assert!(!store.get(2).unwrap().available);

    let before = store.rows_cloned();
    assert!(!store.set_availability_by_scan(99, true));
    assert_eq!(store.rows_cloned(), before);
}

#[test]
fn empty_name_is_rejected() {
    let mut store = InventoryStore::new();
    assert_eq!(store.add(draft("", "whatever")), Err(StoreError::EmptyName));
    assert!(store.is_empty());
}

#[test]
fn snapshot_round_trip_preserves_rows_and_order() {
    let mut store = seeded_store();
    store.set_availability_batch(&id_set(&[2]), false);
    store.remove_batch(&id_set(&[1]));
    store.add(draft("Heat shrink", "assorted")).unwrap();

    let snapshot = store.export_snapshot();
    let rebuilt = InventoryStore::from_snapshot(snapshot).unwrap();

    assert_eq!(rebuilt.rows_cloned(), store.rows_cloned());
    assert_eq!(rebuilt.ids(), store.ids());
    assert_eq!(rebuilt.next_id(), store.next_id());
}

#[test]
fn from_snapshot_rejects_duplicate_ids() {
    let row = |id| InventoryRecord {
        id,
        name: "Part".to_string(),
        description: String::new(),
        available: true,
    };
    let snapshot = TableSnapshotV1 {
        rows: vec![row(7), row(7)],
    };

    assert_eq!(
        InventoryStore::from_snapshot(snapshot).unwrap_err(),
        StoreError::DuplicateId(7)
    );
}
