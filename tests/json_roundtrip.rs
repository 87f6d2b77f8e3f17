use std::fs;

use tempfile::TempDir;

use cotrack::{
    core::store::TableSnapshotV1,
    persist::{PersistError, TableStore, json::JsonTableFile, load_or_default},
    record::InventoryRecord,
    types::RecordId,
};

fn rec(id: RecordId, name: &str, description: &str, available: bool) -> InventoryRecord {
    InventoryRecord {
        id,
        name: name.to_string(),
        description: description.to_string(),
        available,
    }
}

fn sample_snapshot() -> TableSnapshotV1 {
    TableSnapshotV1 {
        rows: vec![
            rec(1, "Resistor 10k", "0805, reel", true),
            rec(2, "Enclosure", "", false),
            rec(7, "Cable tie", "100 pack", true),
        ],
    }
}

#[test]
fn save_then_load_round_trips() {
    let tmp = TempDir::new().expect("tmp");
    let mut file = JsonTableFile::open(tmp.path().join("table.json"));

    let snapshot = sample_snapshot();
    file.save(&snapshot).expect("save");
    let loaded = file.load().expect("load");

    assert_eq!(loaded, snapshot);
}

#[test]
fn wire_format_matches_document_contract() {
    let tmp = TempDir::new().expect("tmp");
    let mut file = JsonTableFile::open(tmp.path().join("table.json"));
    file.save(&sample_snapshot()).expect("save");

    let raw = fs::read_to_string(file.path()).expect("read");
    let doc: serde_json::Value = serde_json::from_str(&raw).expect("json");

    assert_eq!(
        doc["columns"],
        serde_json::json!(["id", "name", "descr", "flagged"])
    );

    let first = doc["rows"][0].as_object().expect("row object");
    assert_eq!(first["id"], 1);
    assert_eq!(first["name"], "Resistor 10k");
    assert_eq!(first["descr"], "0805, reel");
    assert_eq!(first["flagged"], true);
    assert!(!first.contains_key("description"));
    assert!(!first.contains_key("available"));
}

#[test]
fn load_missing_file_reports_not_found() {
    let tmp = TempDir::new().expect("tmp");
    let mut file = JsonTableFile::open(tmp.path().join("absent.json"));

    let err = file.load().expect_err("missing file");
    assert!(err.is_not_found());
}

#[test]
fn load_or_default_starts_empty_on_first_run() {
    let tmp = TempDir::new().expect("tmp");
    let mut file = JsonTableFile::open(tmp.path().join("absent.json"));

    let store = load_or_default(&mut file).expect("first run");
    assert!(store.is_empty());
}

#[test]
fn malformed_document_is_a_decode_error() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("table.json");
    fs::write(&path, "not a table document").expect("write");

    let mut file = JsonTableFile::open(&path);
    let err = file.load().expect_err("malformed");
    assert!(matches!(err, PersistError::Decode(_)));
    assert!(!err.is_not_found());
}

#[test]
fn unexpected_columns_are_rejected() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("table.json");
    fs::write(&path, r#"{"columns": ["id", "name"], "rows": []}"#).expect("write");

    let mut file = JsonTableFile::open(&path);
    let err = file.load().expect_err("columns");
    assert!(matches!(err, PersistError::Message(_)));
}

#[test]
fn save_leaves_no_temp_file_behind() {
    let tmp = TempDir::new().expect("tmp");
    let mut file = JsonTableFile::open(tmp.path().join("table.json"));
    file.save(&sample_snapshot()).expect("save");

    let entries: Vec<_> = fs::read_dir(tmp.path())
        .expect("read dir")
        .map(|e| e.expect("entry").file_name())
        .collect();
    assert_eq!(entries, vec!["table.json"]);
}

#[test]
fn save_overwrites_prior_content_in_full() {
    let tmp = TempDir::new().expect("tmp");
    let mut file = JsonTableFile::open(tmp.path().join("table.json"));

    file.save(&sample_snapshot()).expect("save three");
    let shrunk = TableSnapshotV1 {
        rows: vec![rec(9, "Standoff M3", "nylon", true)],
    };
    file.save(&shrunk).expect("save one");

    assert_eq!(file.load().expect("load"), shrunk);
}
