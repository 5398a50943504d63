use super::{Database, save::apply_values};
use crate::{error::Error, store::StoreError};
use entrydb_schema::{
    child::ChildList, entry::EntryType, record::EntryRecord, registry, value::Value,
};
use std::collections::BTreeMap;

/// Child rows carry their parent's id under this reserved key.
pub const PARENT_ID_FIELD: &str = "_parent_id";

fn child_table(ty: &EntryType, child: &ChildList) -> String {
    format!("{}__{}", ty.config.table_name, child.table_name)
}

impl Database {
    /// Append a row to a parent record's child list. Ids come from the
    /// child table's series counter; read-only lists reject writes.
    pub fn add_child(
        &self,
        type_name: &str,
        parent_id: &str,
        child_name: &str,
        values: BTreeMap<String, Value>,
    ) -> Result<EntryRecord, Error> {
        let ty = self.entry_type(type_name)?.clone();
        let child = require_child(&ty, child_name)?;

        if child.read_only {
            return Err(StoreError::ReadOnlyChild {
                child: child.name.clone(),
            }
            .into());
        }

        // parent must exist
        let _ = self.load(type_name, parent_id)?;

        let now = chrono::Utc::now().timestamp_millis();
        let mut record = EntryRecord {
            created_at: now,
            updated_at: now,
            ..EntryRecord::default()
        };
        apply_values(&child.fields, &mut record, values, false)?;
        for def in &child.fields {
            registry::validate_value(def, record.get(&def.key))?;
        }
        record.set(PARENT_ID_FIELD, Value::Text(parent_id.to_string()));

        let table = child_table(&ty, child);
        record.id = self.store().next_counter(&table)?.to_string();
        self.store().insert(&table, record.clone())?;

        tracing::debug!(entry_type = %ty.name, child = %child.name, parent_id, "child added");

        Ok(record)
    }

    /// All child rows of one parent, in id order.
    pub fn children(
        &self,
        type_name: &str,
        parent_id: &str,
        child_name: &str,
    ) -> Result<Vec<EntryRecord>, Error> {
        let ty = self.entry_type(type_name)?;
        let child = require_child(ty, child_name)?;

        let mut rows: Vec<EntryRecord> = self
            .store()
            .scan(&child_table(ty, child))?
            .into_iter()
            .filter(|r| r.get(PARENT_ID_FIELD).as_text() == Some(parent_id))
            .collect();

        rows.sort_by(|a, b| {
            let (a, b) = (a.id.parse::<u64>().ok(), b.id.parse::<u64>().ok());
            a.cmp(&b)
        });

        Ok(rows)
    }

    /// Remove one child row.
    pub fn delete_child(
        &self,
        type_name: &str,
        child_name: &str,
        child_id: &str,
    ) -> Result<EntryRecord, Error> {
        let ty = self.entry_type(type_name)?.clone();
        let child = require_child(&ty, child_name)?;

        if child.read_only {
            return Err(StoreError::ReadOnlyChild {
                child: child.name.clone(),
            }
            .into());
        }

        Ok(self.store().delete(&child_table(&ty, child), child_id)?)
    }
}

fn require_child<'a>(ty: &'a EntryType, name: &str) -> Result<&'a ChildList, Error> {
    ty.child(name).ok_or_else(|| Error::UnknownChild {
        entry_type: ty.name.clone(),
        child: name.to_string(),
    })
}
