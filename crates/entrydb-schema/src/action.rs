use crate::{field::FieldDefinition, record::EntryRecord, value::Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error as ThisError;

///
/// ActionFailure
///
/// An action body rejecting or failing the invocation. Structural
/// invocation errors (unknown action, missing record, bad params) are
/// the engine's concern, not the handler's.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{0}")]
pub struct ActionFailure(pub String);

impl ActionFailure {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

///
/// ActionInput
///
/// What an action handler sees: the loaded record (absent for global
/// actions) and the validated parameter map.
///

pub struct ActionInput<'a> {
    pub record: Option<&'a EntryRecord>,
    pub params: &'a BTreeMap<String, Value>,
}

impl ActionInput<'_> {
    #[must_use]
    pub fn param(&self, key: &str) -> &Value {
        self.params.get(key).unwrap_or(&Value::Null)
    }
}

/// Handler signature for entry and settings actions.
pub type ActionFn =
    Arc<dyn Fn(ActionInput<'_>) -> Result<Option<Value>, ActionFailure> + Send + Sync>;

///
/// EntryAction
///
/// A named, parameterized operation invokable against a record of the
/// owning type, or globally when `global` is set. `private` actions are
/// filtered out of externally-facing listings but remain invocable by
/// internal callers.
///

#[derive(Clone)]
pub struct EntryAction {
    pub key: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub private: bool,
    pub global: bool,
    pub params: Vec<FieldDefinition>,
    pub handler: ActionFn,
}

impl EntryAction {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        handler: impl Fn(ActionInput<'_>) -> Result<Option<Value>, ActionFailure>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            label: None,
            description: None,
            private: false,
            global: false,
            params: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub const fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Runs without a loaded record instance.
    #[must_use]
    pub const fn global(mut self) -> Self {
        self.global = true;
        self
    }

    #[must_use]
    pub fn params(mut self, params: Vec<FieldDefinition>) -> Self {
        self.params = params;
        self
    }
}

impl fmt::Debug for EntryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryAction")
            .field("key", &self.key)
            .field("private", &self.private)
            .field("global", &self.global)
            .field("params", &self.params.len())
            .finish_non_exhaustive()
    }
}
