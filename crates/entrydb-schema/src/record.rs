use crate::value::Value;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// EntryRecord
///
/// One stored record: identity, system timestamps, and a schema-checked
/// map from field key to tagged value. Unknown keys are rejected by the
/// engine before a record is ever built, so the map only ever holds
/// declared fields.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct EntryRecord {
    pub id: String,

    /// Epoch milliseconds, stamped by the engine at insert.
    pub created_at: i64,

    /// Epoch milliseconds, stamped by the engine on every save.
    pub updated_at: i64,

    pub fields: BTreeMap<String, Value>,
}

impl EntryRecord {
    #[must_use]
    pub fn get(&self, key: &str) -> &Value {
        self.fields.get(key).unwrap_or(&Value::Null)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// True when the field is absent or holds an empty value.
    #[must_use]
    pub fn is_empty_field(&self, key: &str) -> bool {
        self.get(key).is_empty()
    }
}

///
/// EditAction
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
#[serde(rename_all = "lowercase")]
pub enum EditAction {
    #[display("create")]
    Create,
    #[display("delete")]
    Delete,
    #[display("update")]
    Update,
}

///
/// EditLogEntry
///
/// One append-only audit entry, written after a successful create,
/// update, or delete on a type with `edit_log` enabled. Never updated
/// or deleted.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EditLogEntry {
    pub entry_type: String,
    pub entry_id: String,
    pub entry_title: String,
    pub user: String,
    pub user_full_name: String,
    pub action: EditAction,
    pub edit_data: serde_json::Value,
    pub at: i64,
}

///
/// UserSession
///
/// Identity supplied by the session/auth collaborator. The engine never
/// authenticates; it only records `user_id`/`user_name` into the edit
/// log.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct UserSession {
    pub session_id: String,
    pub user_id: String,
    pub email: String,
    pub user_name: String,
    pub system_admin: bool,
}

impl UserSession {
    /// Anonymous system identity for internal mutations.
    #[must_use]
    pub fn system() -> Self {
        Self {
            session_id: String::new(),
            user_id: "system".to_string(),
            email: String::new(),
            user_name: "System".to_string(),
            system_admin: true,
        }
    }
}
