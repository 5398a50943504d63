use super::{Storage, StoreError};
use entrydb_schema::record::{EditLogEntry, EntryRecord};
use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};

type Table = BTreeMap<String, EntryRecord>;

///
/// MemoryStore
///
/// Reference in-memory backend. Tables live behind one `RwLock`, so a
/// single `scan` observes one snapshot and writes for the same record
/// serialize on the write lock. Counters sit behind their own mutex;
/// reserving a value never blocks readers.
///

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<BTreeMap<String, Table>>,
    counters: Mutex<BTreeMap<String, u64>>,
    edit_log: RwLock<Vec<EditLogEntry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows across all tables; test/diagnostic helper.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables
            .read()
            .expect("table lock poisoned")
            .values()
            .map(Table::len)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStore {
    fn insert(&self, table: &str, record: EntryRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.write().expect("table lock poisoned");
        let rows = tables.entry(table.to_string()).or_default();

        if rows.contains_key(&record.id) {
            return Err(StoreError::duplicate(table, &record.id));
        }

        rows.insert(record.id.clone(), record);

        Ok(())
    }

    fn update(&self, table: &str, id: &str, record: EntryRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.write().expect("table lock poisoned");
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::not_found(table, id))?;

        if !rows.contains_key(id) {
            return Err(StoreError::not_found(table, id));
        }

        rows.insert(id.to_string(), record);

        Ok(())
    }

    fn delete(&self, table: &str, id: &str) -> Result<EntryRecord, StoreError> {
        let mut tables = self.tables.write().expect("table lock poisoned");

        tables
            .get_mut(table)
            .and_then(|rows| rows.remove(id))
            .ok_or_else(|| StoreError::not_found(table, id))
    }

    fn get(&self, table: &str, id: &str) -> Result<Option<EntryRecord>, StoreError> {
        let tables = self.tables.read().expect("table lock poisoned");

        Ok(tables.get(table).and_then(|rows| rows.get(id)).cloned())
    }

    fn scan(&self, table: &str) -> Result<Vec<EntryRecord>, StoreError> {
        let tables = self.tables.read().expect("table lock poisoned");

        Ok(tables
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    fn next_counter(&self, table: &str) -> Result<u64, StoreError> {
        let mut counters = self.counters.lock().expect("counter lock poisoned");
        let next = counters.entry(table.to_string()).or_insert(0);
        *next += 1;

        Ok(*next)
    }

    fn append_edit_log(&self, entry: EditLogEntry) -> Result<(), StoreError> {
        self.edit_log
            .write()
            .expect("edit log lock poisoned")
            .push(entry);

        Ok(())
    }

    fn edit_log(&self, entry_type: &str, entry_id: &str) -> Result<Vec<EditLogEntry>, StoreError> {
        let log = self.edit_log.read().expect("edit log lock poisoned");

        Ok(log
            .iter()
            .filter(|e| e.entry_type == entry_type && e.entry_id == entry_id)
            .cloned()
            .collect())
    }
}

///
/// TESTS
///
