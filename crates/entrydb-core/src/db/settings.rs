use super::{
    Database,
    save::{apply_defaults, apply_values, run_hooks, validate_fields},
};
use crate::error::Error;
use entrydb_schema::{hook::HookPhase, record::EntryRecord, value::Value};
use std::collections::BTreeMap;

/// Backing table for all settings singletons; record id is the settings
/// type name.
pub(crate) const SETTINGS_TABLE: &str = "__settings__";

impl Database {
    /// The current settings record, or one materialized from field
    /// defaults when nothing has been saved yet. The default record is
    /// not persisted by reading it.
    pub fn get_settings(&self, name: &str) -> Result<EntryRecord, Error> {
        let ty = self.settings_type(name)?;

        if let Some(record) = self.store().get(SETTINGS_TABLE, name)? {
            return Ok(record);
        }

        let mut record = EntryRecord {
            id: name.to_string(),
            ..EntryRecord::default()
        };
        apply_defaults(&ty.fields, &mut record);

        Ok(record)
    }

    /// Save the singleton through the save-path hook phases. Creates the
    /// stored record on first save, replaces it afterwards.
    pub fn update_settings(
        &self,
        name: &str,
        patch: BTreeMap<String, Value>,
    ) -> Result<EntryRecord, Error> {
        let ty = self.settings_type(name)?.clone();
        let existing = self.store().get(SETTINGS_TABLE, name)?;
        let is_new = existing.is_none();

        let mut record = match existing {
            Some(record) => record,
            None => self.get_settings(name)?,
        };
        apply_values(&ty.fields, &mut record, patch, false)?;

        run_hooks(ty.hooks.phase(HookPhase::BeforeValidate), &mut record)?;
        run_hooks(ty.hooks.phase(HookPhase::Validate), &mut record)?;

        validate_fields(&ty.fields, &mut record)?;

        run_hooks(ty.hooks.phase(HookPhase::BeforeSave), &mut record)?;

        let now = chrono::Utc::now().timestamp_millis();
        record.updated_at = now;
        if is_new {
            record.created_at = now;
            self.store().insert(SETTINGS_TABLE, record.clone())?;
        } else {
            self.store().update(SETTINGS_TABLE, name, record.clone())?;
        }

        run_hooks(ty.hooks.phase(HookPhase::AfterSave), &mut record)?;

        tracing::debug!(settings_type = %ty.name, "settings saved");

        Ok(record)
    }

    /// Invoke a settings action against the current settings record.
    pub fn invoke_settings(
        &self,
        name: &str,
        action_key: &str,
        params: BTreeMap<String, Value>,
    ) -> Result<Option<Value>, Error> {
        let ty = self.settings_type(name)?.clone();
        let action = ty
            .action(action_key)
            .ok_or_else(|| crate::error::ActionError::UnknownAction {
                key: action_key.to_string(),
            })?;

        let record = self.get_settings(name)?;

        Ok(crate::actions::invoke(action, Some(&record), params)?)
    }
}
