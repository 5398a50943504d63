mod children;
mod save;
mod settings;

pub use children::PARENT_ID_FIELD;

use crate::{
    actions,
    error::Error,
    query::{self, CountOptions, ListOptions, ListResult, ReportOptions, ReportResult},
    store::{MemoryStore, Storage, StoreError},
};
use entrydb_schema::{
    entry::EntryType,
    record::{EditLogEntry, EntryRecord},
    settings::SettingsType,
    value::Value,
};
use std::collections::BTreeMap;
use std::sync::Arc;

///
/// Database
///
/// The engine: a registry of validated entry and settings types bound
/// to one storage backend. All mutations flow through the hook
/// pipeline; reads evaluate against one storage snapshot per call.
///

pub struct Database {
    types: BTreeMap<String, Arc<EntryType>>,
    settings: BTreeMap<String, Arc<SettingsType>>,
    store: Arc<dyn Storage>,
}

impl Database {
    #[must_use]
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self {
            types: BTreeMap::new(),
            settings: BTreeMap::new(),
            store,
        }
    }

    /// Engine over a fresh in-memory backend.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Register a validated entry type. Re-registering a name is a
    /// programming error and fails.
    pub fn register(&mut self, entry_type: EntryType) -> Result<(), Error> {
        let name = entry_type.name.clone();

        if self.types.contains_key(&name) {
            return Err(Error::DuplicateType(name));
        }
        self.types.insert(name, Arc::new(entry_type));

        Ok(())
    }

    pub fn register_settings(&mut self, settings_type: SettingsType) -> Result<(), Error> {
        let name = settings_type.name.clone();

        if self.settings.contains_key(&name) {
            return Err(Error::DuplicateType(name));
        }
        self.settings.insert(name, Arc::new(settings_type));

        Ok(())
    }

    pub fn entry_type(&self, name: &str) -> Result<&Arc<EntryType>, Error> {
        self.types
            .get(name)
            .ok_or_else(|| Error::UnknownEntryType(name.to_string()))
    }

    pub fn settings_type(&self, name: &str) -> Result<&Arc<SettingsType>, Error> {
        self.settings
            .get(name)
            .ok_or_else(|| Error::UnknownSettingsType(name.to_string()))
    }

    /// Registered entry-type names, for introspection surfaces.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    pub(crate) fn store(&self) -> &dyn Storage {
        self.store.as_ref()
    }

    // -- reads

    pub fn get(&self, type_name: &str, id: &str) -> Result<Option<EntryRecord>, Error> {
        let ty = self.entry_type(type_name)?;

        Ok(self.store.get(&ty.config.table_name, id)?)
    }

    /// Fetch a record, failing when it does not exist.
    pub fn load(&self, type_name: &str, id: &str) -> Result<EntryRecord, Error> {
        let ty = self.entry_type(type_name)?;

        self.store
            .get(&ty.config.table_name, id)?
            .ok_or_else(|| StoreError::NotFound {
                table: ty.config.table_name.clone(),
                id: id.to_string(),
            }.into())
    }

    pub fn list(&self, type_name: &str, options: &ListOptions) -> Result<ListResult, Error> {
        let ty = self.entry_type(type_name)?;
        let rows = self.store.scan(&ty.config.table_name)?;

        Ok(query::list(ty, rows, options)?)
    }

    pub fn report(&self, type_name: &str, options: &ReportOptions) -> Result<ReportResult, Error> {
        let ty = self.entry_type(type_name)?;
        let rows = self.store.scan(&ty.config.table_name)?;

        Ok(query::report(ty, rows, options)?)
    }

    pub fn count(&self, type_name: &str, options: &CountOptions) -> Result<usize, Error> {
        let ty = self.entry_type(type_name)?;
        let rows = self.store.scan(&ty.config.table_name)?;

        Ok(query::count(ty, rows, options)?)
    }

    /// The audit trail for one record, oldest first.
    pub fn edit_log(&self, type_name: &str, id: &str) -> Result<Vec<EditLogEntry>, Error> {
        // Validates the type name even though the log is keyed by it.
        let _ = self.entry_type(type_name)?;

        Ok(self.store.edit_log(type_name, id)?)
    }

    // -- actions

    /// Invoke an entry action: by record id for instance actions, with
    /// `record_id = None` for `global` ones.
    pub fn invoke(
        &self,
        type_name: &str,
        action_key: &str,
        record_id: Option<&str>,
        params: BTreeMap<String, Value>,
    ) -> Result<Option<Value>, Error> {
        let ty = Arc::clone(self.entry_type(type_name)?);
        let action = ty
            .action(action_key)
            .ok_or_else(|| crate::error::ActionError::UnknownAction {
                key: action_key.to_string(),
            })?;

        let record = match record_id {
            Some(id) => Some(self.load(type_name, id)?),
            None => None,
        };

        Ok(actions::invoke(action, record.as_ref(), params)?)
    }
}
