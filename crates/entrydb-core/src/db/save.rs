use super::Database;
use crate::{error::Error, id::generate_id};
use entrydb_schema::{
    entry::EntryType,
    error::ValidationError,
    field::FieldDefinition,
    hook::{Hook, HookPhase},
    record::{EditAction, EditLogEntry, EntryRecord, UserSession},
    registry,
    value::Value,
};
use std::collections::BTreeMap;

impl Database {
    /// Create a record: defaults, caller values, save-path hooks, field
    /// validation, id assignment, insert, audit entry.
    ///
    /// The reserved `id` key in `values` is only honored by the
    /// non-auto `number` id strategy; every other strategy assigns.
    pub fn create(
        &self,
        type_name: &str,
        values: BTreeMap<String, Value>,
        session: &UserSession,
    ) -> Result<EntryRecord, Error> {
        let ty = self.entry_type(type_name)?.clone();
        let now = chrono::Utc::now().timestamp_millis();

        let mut record = EntryRecord {
            created_at: now,
            updated_at: now,
            ..EntryRecord::default()
        };
        apply_defaults(&ty.fields, &mut record);
        let supplied_id = apply_values(&ty.fields, &mut record, values, false)?;

        run_hooks(ty.hooks.phase(HookPhase::BeforeValidate), &mut record)?;
        run_hooks(ty.hooks.phase(HookPhase::Validate), &mut record)?;

        validate_fields(&ty.fields, &mut record)?;
        self.check_unique(&ty, &record, None)?;

        run_hooks(ty.hooks.phase(HookPhase::BeforeInsert), &mut record)?;
        run_hooks(ty.hooks.phase(HookPhase::BeforeSave), &mut record)?;

        record.id = generate_id(&ty, &record, supplied_id.as_deref(), self.store())?;
        self.store().insert(&ty.config.table_name, record.clone())?;

        run_hooks(ty.hooks.phase(HookPhase::AfterInsert), &mut record)?;
        run_hooks(ty.hooks.phase(HookPhase::AfterSave), &mut record)?;

        tracing::debug!(entry_type = %ty.name, id = %record.id, "created");

        if ty.config.edit_log {
            self.append_log(
                &ty,
                &record,
                session,
                EditAction::Create,
                serde_json::to_value(&record.fields).unwrap_or_default(),
                now,
            )?;
        }

        Ok(record)
    }

    /// Update a record in place: load, apply the patch, save-path hooks
    /// (insert phases excluded), validation, replace, audit entry with a
    /// per-field before/after diff.
    pub fn update(
        &self,
        type_name: &str,
        id: &str,
        patch: BTreeMap<String, Value>,
        session: &UserSession,
    ) -> Result<EntryRecord, Error> {
        let ty = self.entry_type(type_name)?.clone();
        let before = self.load(type_name, id)?;
        let mut record = before.clone();

        apply_values(&ty.fields, &mut record, patch, true)?;

        run_hooks(ty.hooks.phase(HookPhase::BeforeValidate), &mut record)?;
        run_hooks(ty.hooks.phase(HookPhase::Validate), &mut record)?;

        validate_fields(&ty.fields, &mut record)?;
        self.check_unique(&ty, &record, Some(id))?;

        run_hooks(ty.hooks.phase(HookPhase::BeforeSave), &mut record)?;

        let now = chrono::Utc::now().timestamp_millis();
        record.updated_at = now;
        self.store().update(&ty.config.table_name, id, record.clone())?;

        run_hooks(ty.hooks.phase(HookPhase::AfterSave), &mut record)?;

        tracing::debug!(entry_type = %ty.name, id, "updated");

        if ty.config.edit_log {
            let diff = field_diff(&before, &record);
            if !diff.as_object().is_some_and(serde_json::Map::is_empty) {
                self.append_log(&ty, &record, session, EditAction::Update, diff, now)?;
            }
        }

        Ok(record)
    }

    /// Delete a record, returning the removed state.
    pub fn delete(
        &self,
        type_name: &str,
        id: &str,
        session: &UserSession,
    ) -> Result<EntryRecord, Error> {
        let ty = self.entry_type(type_name)?.clone();
        let mut record = self.load(type_name, id)?;

        run_hooks(ty.hooks.phase(HookPhase::BeforeDelete), &mut record)?;

        let removed = self.store().delete(&ty.config.table_name, id)?;

        run_hooks(ty.hooks.phase(HookPhase::AfterDelete), &mut record)?;

        tracing::debug!(entry_type = %ty.name, id, "deleted");

        if ty.config.edit_log {
            let now = chrono::Utc::now().timestamp_millis();
            self.append_log(
                &ty,
                &removed,
                session,
                EditAction::Delete,
                serde_json::to_value(&removed.fields).unwrap_or_default(),
                now,
            )?;
        }

        Ok(removed)
    }

    /// Every `unique` field must be distinct across the table, with
    /// `skip_id` exempting the record being updated.
    fn check_unique(
        &self,
        ty: &EntryType,
        record: &EntryRecord,
        skip_id: Option<&str>,
    ) -> Result<(), Error> {
        let unique: Vec<&FieldDefinition> = ty.fields.iter().filter(|f| f.unique).collect();
        if unique.is_empty() {
            return Ok(());
        }

        let rows = self.store().scan(&ty.config.table_name)?;
        for def in unique {
            let value = record.get(&def.key);
            if value.is_empty() {
                continue;
            }

            let taken = rows
                .iter()
                .filter(|r| skip_id != Some(r.id.as_str()))
                .any(|r| r.get(&def.key).loose_eq(value));

            if taken {
                return Err(ValidationError::NotUnique {
                    field: def.key.clone(),
                    value: value.to_key_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    fn append_log(
        &self,
        ty: &EntryType,
        record: &EntryRecord,
        session: &UserSession,
        action: EditAction,
        edit_data: serde_json::Value,
        at: i64,
    ) -> Result<(), Error> {
        self.store().append_edit_log(EditLogEntry {
            entry_type: ty.name.clone(),
            entry_id: record.id.clone(),
            entry_title: ty.title_of(record),
            user: session.user_id.clone(),
            user_full_name: session.user_name.clone(),
            action,
            edit_data,
            at,
        })?;

        Ok(())
    }
}

// -- pipeline helpers, shared with the settings and child paths

pub(super) fn run_hooks(hooks: &[Hook], record: &mut EntryRecord) -> Result<(), Error> {
    for hook in hooks {
        (hook.handler)(record)?;
    }

    Ok(())
}

pub(super) fn apply_defaults(fields: &[FieldDefinition], record: &mut EntryRecord) {
    for def in fields {
        if let Some(default) = &def.default_value {
            record.set(def.key.clone(), default.resolve());
        }
    }
}

/// Move caller values onto the record, coercing each to its declared
/// type. Returns the reserved `id` value, if supplied. With
/// `patching`, read-only fields reject instead of silently keeping the
/// stored value.
pub(super) fn apply_values(
    fields: &[FieldDefinition],
    record: &mut EntryRecord,
    values: BTreeMap<String, Value>,
    patching: bool,
) -> Result<Option<String>, Error> {
    let mut supplied_id = None;

    for (key, value) in values {
        if key == "id" {
            if patching {
                return Err(ValidationError::ReadOnlyField { field: key }.into());
            }
            supplied_id = Some(value.to_key_string());
            continue;
        }

        let Some(def) = fields.iter().find(|f| f.key == key) else {
            return Err(ValidationError::UnknownColumn { column: key }.into());
        };

        if patching && def.read_only {
            return Err(ValidationError::ReadOnlyField { field: key }.into());
        }

        let coerced = registry::coerce(def.field_type, value)
            .map_err(|source| ValidationError::TypeMismatch {
                field: key.clone(),
                source,
            })?;
        record.set(key, coerced);
    }

    Ok(supplied_id)
}

/// Re-coerce and validate every declared field. Hooks may have written
/// values of the wrong shape, so the pass runs over the final record.
pub(super) fn validate_fields(
    fields: &[FieldDefinition],
    record: &mut EntryRecord,
) -> Result<(), Error> {
    for def in fields {
        if let Some(value) = record.fields.remove(&def.key) {
            let coerced = registry::coerce(def.field_type, value)
                .map_err(|source| ValidationError::TypeMismatch {
                    field: def.key.clone(),
                    source,
                })?;
            record.set(def.key.clone(), coerced);
        }

        registry::validate_value(def, record.get(&def.key))?;
    }

    Ok(())
}

/// Per-field `{from, to}` diff over declared fields that changed.
fn field_diff(before: &EntryRecord, after: &EntryRecord) -> serde_json::Value {
    let mut diff = serde_json::Map::new();

    let keys = before.fields.keys().chain(after.fields.keys());
    for key in keys {
        if diff.contains_key(key) {
            continue;
        }

        let from = before.get(key);
        let to = after.get(key);
        if from != to {
            diff.insert(
                key.clone(),
                serde_json::json!({
                    "from": from,
                    "to": to,
                }),
            );
        }
    }

    serde_json::Value::Object(diff)
}
