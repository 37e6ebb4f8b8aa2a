//! Store - JSONL log plus SQLite cache

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use eyre::{Context, Result, bail};
use fs2::FileExt;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::record::{Filter, FilterOp, IndexValue, Record};

const DB_FILE: &str = "taskstore.db";
const LOG_EXT: &str = "jsonl";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    data TEXT NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (collection, id)
);
CREATE TABLE IF NOT EXISTS record_indexes (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    field TEXT NOT NULL,
    value
);
CREATE INDEX IF NOT EXISTS idx_record_indexes_lookup ON record_indexes (collection, field, value);
CREATE INDEX IF NOT EXISTS idx_record_indexes_owner ON record_indexes (collection, id);
"#;

/// One line of a collection log
#[derive(Debug, Serialize, Deserialize)]
struct LogEntry {
    id: String,
    updated_at: i64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

/// Persistent record store
///
/// Not `Sync`: a single owner (typically an actor task) should hold it.
pub struct Store {
    base_path: PathBuf,
    db: Connection,
}

impl Store {
    /// Open or create a store in `path`, replaying the JSONL logs into SQLite
    ///
    /// Indexes are not derived during the replay; call
    /// [`rebuild_indexes`](Self::rebuild_indexes) for each record type
    /// before running filtered queries.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        debug!(?base_path, "Store::open: called");
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;

        let db = Connection::open(base_path.join(DB_FILE)).context("Failed to open store database")?;
        db.execute_batch(SCHEMA).context("Failed to initialize store schema")?;

        let mut store = Self { base_path, db };
        store.sync()?;
        Ok(store)
    }

    /// Insert a new record, failing if the id is taken
    pub fn create<T: Record>(&mut self, record: T) -> Result<String> {
        let id = record.id().to_string();
        debug!(collection = T::collection_name(), %id, "Store::create: called");
        if self.exists::<T>(&id)? {
            bail!("Record already exists: {}/{}", T::collection_name(), id);
        }
        self.write(&record)?;
        Ok(id)
    }

    /// Fetch a record by id
    pub fn get<T: Record>(&self, id: &str) -> Result<Option<T>> {
        debug!(collection = T::collection_name(), %id, "Store::get: called");
        let data: Option<String> = self
            .db
            .query_row(
                "SELECT data FROM records WHERE collection = ?1 AND id = ?2",
                params![T::collection_name(), id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query record")?;

        data.map(|d| serde_json::from_str(&d).context("Failed to deserialize record"))
            .transpose()
    }

    /// Replace an existing record, failing if it doesn't exist
    pub fn update<T: Record>(&mut self, record: T) -> Result<()> {
        debug!(collection = T::collection_name(), id = record.id(), "Store::update: called");
        if !self.exists::<T>(record.id())? {
            bail!("Record not found: {}/{}", T::collection_name(), record.id());
        }
        self.write(&record)
    }

    /// Delete a record, failing if it doesn't exist
    pub fn delete<T: Record>(&mut self, id: &str) -> Result<()> {
        let collection = T::collection_name();
        debug!(collection, %id, "Store::delete: called");
        if !self.exists::<T>(id)? {
            bail!("Record not found: {}/{}", collection, id);
        }

        self.append_log(
            collection,
            &LogEntry {
                id: id.to_string(),
                updated_at: crate::now_ms(),
                deleted: true,
                data: None,
            },
        )?;

        let tx = self.db.transaction()?;
        tx.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        tx.execute(
            "DELETE FROM record_indexes WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        tx.commit().context("Failed to commit delete")?;
        Ok(())
    }

    /// Delete every record whose indexed `field` equals `value`
    pub fn delete_by_index<T: Record>(&mut self, field: &str, value: IndexValue) -> Result<usize> {
        debug!(collection = T::collection_name(), %field, ?value, "Store::delete_by_index: called");
        let matches: Vec<T> = self.list(&[Filter {
            field: field.to_string(),
            op: FilterOp::Eq,
            value,
        }])?;
        for record in &matches {
            self.delete::<T>(record.id())?;
        }
        Ok(matches.len())
    }

    /// List records matching every filter, in insertion order
    pub fn list<T: Record>(&self, filters: &[Filter]) -> Result<Vec<T>> {
        debug!(collection = T::collection_name(), filter_count = filters.len(), "Store::list: called");
        let mut sql = String::from("SELECT r.data FROM records r WHERE r.collection = ?1");
        let mut values = vec![Value::Text(T::collection_name().to_string())];

        for filter in filters {
            values.push(Value::Text(filter.field.clone()));
            let field_idx = values.len();
            values.push(filter.value.to_sql());
            let value_idx = values.len();

            let condition = match filter.op {
                FilterOp::Contains => format!("i.value LIKE '%' || ?{} || '%'", value_idx),
                op => format!("i.value {} ?{}", op.sql(), value_idx),
            };
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM record_indexes i \
                 WHERE i.collection = r.collection AND i.id = r.id AND i.field = ?{} AND {})",
                field_idx, condition
            ));
        }
        sql.push_str(" ORDER BY r.rowid");

        let mut stmt = self.db.prepare(&sql).context("Failed to prepare list query")?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list records")?;

        rows.iter()
            .map(|data| serde_json::from_str(data).context("Failed to deserialize record"))
            .collect()
    }

    /// Reload every collection from its JSONL log
    ///
    /// Later lines win; tombstones remove the record. Index rows for the
    /// replayed collections are cleared.
    pub fn sync(&mut self) -> Result<()> {
        debug!(base_path = ?self.base_path, "Store::sync: called");
        let mut logs = Vec::new();
        for entry in fs::read_dir(&self.base_path).context("Failed to read store directory")? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == LOG_EXT)
                && let Some(collection) = path.file_stem().and_then(|s| s.to_str())
            {
                logs.push((collection.to_string(), path.clone()));
            }
        }

        let mut replayed = 0usize;
        let tx = self.db.transaction()?;
        for (collection, path) in &logs {
            tx.execute("DELETE FROM records WHERE collection = ?1", params![collection])?;
            tx.execute("DELETE FROM record_indexes WHERE collection = ?1", params![collection])?;

            let file = fs::File::open(path).context(format!("Failed to open {}", path.display()))?;
            for (line_no, line) in BufReader::new(file).lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let entry: LogEntry = match serde_json::from_str(&line) {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(%collection, line = line_no + 1, error = %e, "Skipping malformed log line");
                        continue;
                    }
                };

                match (entry.deleted, entry.data) {
                    (false, Some(data)) => {
                        tx.execute(
                            "INSERT INTO records (collection, id, data, updated_at) VALUES (?1, ?2, ?3, ?4) \
                             ON CONFLICT (collection, id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
                            params![collection, entry.id, data.to_string(), entry.updated_at],
                        )?;
                    }
                    _ => {
                        tx.execute(
                            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
                            params![collection, entry.id],
                        )?;
                    }
                }
                replayed += 1;
            }
        }
        tx.commit().context("Failed to commit sync")?;

        info!(collections = logs.len(), entries = replayed, "Store synced from logs");
        Ok(())
    }

    /// Recompute the index rows of every record of type `T`
    pub fn rebuild_indexes<T: Record>(&mut self) -> Result<usize> {
        let collection = T::collection_name();
        debug!(collection, "Store::rebuild_indexes: called");
        let records: Vec<T> = self.list(&[])?;

        let tx = self.db.transaction()?;
        tx.execute("DELETE FROM record_indexes WHERE collection = ?1", params![collection])?;
        for record in &records {
            for (field, value) in record.indexed_fields() {
                tx.execute(
                    "INSERT INTO record_indexes (collection, id, field, value) VALUES (?1, ?2, ?3, ?4)",
                    params![collection, record.id(), field, value.to_sql()],
                )?;
            }
        }
        tx.commit().context("Failed to commit index rebuild")?;

        Ok(records.len())
    }

    fn exists<T: Record>(&self, id: &str) -> Result<bool> {
        let found: Option<i64> = self
            .db
            .query_row(
                "SELECT 1 FROM records WHERE collection = ?1 AND id = ?2",
                params![T::collection_name(), id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn write<T: Record>(&mut self, record: &T) -> Result<()> {
        let collection = T::collection_name();
        let data = serde_json::to_value(record).context("Failed to serialize record")?;
        let serialized = data.to_string();

        self.append_log(
            collection,
            &LogEntry {
                id: record.id().to_string(),
                updated_at: record.updated_at(),
                deleted: false,
                data: Some(data),
            },
        )?;

        let tx = self.db.transaction()?;
        tx.execute(
            "INSERT INTO records (collection, id, data, updated_at) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT (collection, id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
            params![collection, record.id(), serialized, record.updated_at()],
        )?;
        tx.execute(
            "DELETE FROM record_indexes WHERE collection = ?1 AND id = ?2",
            params![collection, record.id()],
        )?;
        for (field, value) in record.indexed_fields() {
            tx.execute(
                "INSERT INTO record_indexes (collection, id, field, value) VALUES (?1, ?2, ?3, ?4)",
                params![collection, record.id(), field, value.to_sql()],
            )?;
        }
        tx.commit().context("Failed to commit record")?;
        Ok(())
    }

    fn append_log(&self, collection: &str, entry: &LogEntry) -> Result<()> {
        let path = self.base_path.join(format!("{}.{}", collection, LOG_EXT));
        let line = serde_json::to_string(entry)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context(format!("Failed to open {}", path.display()))?;
        FileExt::lock_exclusive(&file).context("Failed to lock collection log")?;
        let written = writeln!(file, "{}", line);
        FileExt::unlock(&file).context("Failed to unlock collection log")?;

        written.context("Failed to append to collection log")
    }
}
