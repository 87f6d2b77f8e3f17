//! Single-tenant parts-cabinet inventory with full-rewrite JSON persistence
//! and printable QR label artifacts.
//!
//! # Examples
//!
//! In-memory usage with [`core::store::InventoryStore`]:
//! ```
//! use cotrack::{core::store::InventoryStore, record::RecordDraft};
//!
//! let mut store = InventoryStore::new();
//! let rec = store
//!     .add(RecordDraft {
//!         name: "Resistor 10k".to_string(),
//!         description: "0805, reel".to_string(),
//!     })
//!     .expect("add");
//! assert_eq!(rec.id, 1);
//! assert!(rec.available);
//!
//! assert!(store.set_availability_by_scan(rec.id, false));
//! assert!(!store.get(rec.id).expect("record").available);
//! ```
//!
//! Runtime usage with a JSON table file:
//! ```no_run
//! use cotrack::{
//!     persist::{json::JsonTableFile, load_or_default},
//!     runtime::handle::{RuntimeConfig, spawn_inventory},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut file = JsonTableFile::open("inventory.json");
//! let store = load_or_default(&mut file).expect("load");
//! let handle = spawn_inventory(store, Some(Box::new(file)), None, RuntimeConfig::default());
//!
//! let rec = handle.add("Resistor 10k", "0805, reel").await.expect("add");
//! handle.scan(rec.id, false).await.expect("scan");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// In-memory authoritative table.
pub mod core;
/// Scannable label artifacts: encoders and image composition.
pub mod label;
/// Persistence abstraction and JSON document implementation.
pub mod persist;
/// Inventory domain records and drafts.
pub mod record;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Shared primitive types.
pub mod types;
/// View-controller boundary contract and event bridge.
pub mod view;
