//! TaskStore - generic persistent record storage
//!
//! Records are serialized as JSON and appended to one JSONL log per collection.
//! The logs are the source of truth (diffable, git-friendly); a SQLite database
//! next to them caches the latest version of every record plus its indexed
//! fields so filtered queries don't need to scan the logs.
//!
//! # Usage
//!
//! ```no_run
//! use std::collections::HashMap;
//! use serde::{Deserialize, Serialize};
//! use taskstore::{Filter, IndexValue, Record, Store, now_ms};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Note {
//!     id: String,
//!     status: String,
//!     updated_at: i64,
//! }
//!
//! impl Record for Note {
//!     fn id(&self) -> &str {
//!         &self.id
//!     }
//!     fn updated_at(&self) -> i64 {
//!         self.updated_at
//!     }
//!     fn collection_name() -> &'static str {
//!         "notes"
//!     }
//!     fn indexed_fields(&self) -> HashMap<String, IndexValue> {
//!         HashMap::from([("status".to_string(), IndexValue::String(self.status.clone()))])
//!     }
//! }
//!
//! # fn main() -> eyre::Result<()> {
//! let mut store = Store::open("/tmp/notes")?;
//! store.create(Note { id: "n1".into(), status: "open".into(), updated_at: now_ms() })?;
//! let open: Vec<Note> = store.list(&[Filter::eq("status", IndexValue::String("open".into()))])?;
//! # Ok(())
//! # }
//! ```

mod record;
mod store;

pub use record::{Filter, FilterOp, IndexValue, Record, now_ms};
pub use store::Store;
