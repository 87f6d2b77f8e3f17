use std::collections::BTreeSet;

use criterion::{Criterion, criterion_group, criterion_main};

use cotrack::{
    core::store::{InventoryStore, TableSnapshotV1},
    record::{InventoryRecord, RecordDraft},
};

fn draft(i: u64) -> RecordDraft {
    RecordDraft {
        name: format!("Part {i}"),
        description: String::new(),
    }
}

fn populated_snapshot(rows: u64) -> TableSnapshotV1 {
    TableSnapshotV1 {
        rows: (1..=rows)
            .map(|id| InventoryRecord {
                id,
                name: format!("Part {id}"),
                description: String::new(),
                available: true,
            })
            .collect(),
    }
}

fn bench_adds(c: &mut Criterion) {
    c.bench_function("store_add_1k", |b| {
        b.iter(|| {
            let mut store = InventoryStore::new();
            for i in 0..1_000u64 {
                let _ = store.add(draft(i)).expect("add");
            }
        });
    });
}

fn bench_flag_batch(c: &mut Criterion) {
    let snapshot = populated_snapshot(10_000);
    let ids: BTreeSet<u64> = (1..=10_000u64).collect();

    c.bench_function("store_flag_batch_10k", |b| {
        b.iter(|| {
            let mut store = InventoryStore::from_snapshot(snapshot.clone()).expect("snapshot");
            let touched = store.set_availability_batch(&ids, false);
            assert_eq!(touched.len(), 10_000);
        });
    });
}

fn bench_snapshot_roundtrip(c: &mut Criterion) {
    let store = InventoryStore::from_snapshot(populated_snapshot(10_000)).expect("snapshot");

    c.bench_function("snapshot_json_roundtrip_10k", |b| {
        b.iter(|| {
            let bytes = serde_json::to_vec(&store.export_snapshot()).expect("encode");
            let decoded: TableSnapshotV1 = serde_json::from_slice(&bytes).expect("decode");
            assert_eq!(decoded.rows.len(), 10_000);
        });
    });
}

criterion_group!(benches, bench_adds, bench_flag_batch, bench_snapshot_roundtrip);
criterion_main!(benches);
