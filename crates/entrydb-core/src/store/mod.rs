mod memory;

pub use memory::MemoryStore;

use entrydb_schema::record::{EditLogEntry, EntryRecord};
use thiserror::Error as ThisError;

///
/// StoreError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    #[error("no record '{id}' in table '{table}'")]
    NotFound { table: String, id: String },

    #[error("table '{table}' already holds a record '{id}'")]
    Duplicate { table: String, id: String },

    #[error("child list '{child}' is read-only")]
    ReadOnlyChild { child: String },
}

impl StoreError {
    pub(crate) fn not_found(table: &str, id: &str) -> Self {
        Self::NotFound {
            table: table.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn duplicate(table: &str, id: &str) -> Self {
        Self::Duplicate {
            table: table.to_string(),
            id: id.to_string(),
        }
    }
}

///
/// Storage
///
/// The persistence boundary the engine talks to. Implementations must
/// make `next_counter` an atomic reserve-and-increment (two concurrent
/// inserts never observe the same value) and must serve `scan` from one
/// consistent snapshot per call.
///

pub trait Storage: Send + Sync {
    fn insert(&self, table: &str, record: EntryRecord) -> Result<(), StoreError>;

    /// Replace the record under `id`. Whole-record replacement; save
    /// calls racing on the same id are serialized by this method and
    /// resolve last-writer-wins.
    fn update(&self, table: &str, id: &str, record: EntryRecord) -> Result<(), StoreError>;

    /// Remove and return the record.
    fn delete(&self, table: &str, id: &str) -> Result<EntryRecord, StoreError>;

    fn get(&self, table: &str, id: &str) -> Result<Option<EntryRecord>, StoreError>;

    /// All rows of a table as one consistent snapshot.
    fn scan(&self, table: &str) -> Result<Vec<EntryRecord>, StoreError>;

    fn exists(&self, table: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self.get(table, id)?.is_some())
    }

    /// Atomically reserve the next value of the per-table counter,
    /// starting at 1.
    fn next_counter(&self, table: &str) -> Result<u64, StoreError>;

    /// Append-only; edit-log entries are never updated or deleted.
    fn append_edit_log(&self, entry: EditLogEntry) -> Result<(), StoreError>;

    fn edit_log(&self, entry_type: &str, entry_id: &str) -> Result<Vec<EditLogEntry>, StoreError>;
}
