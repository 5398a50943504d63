use crate::{id::IdError, store::StoreError};
use entrydb_schema::{
    action::ActionFailure,
    error::{SchemaError, ValidationError},
    hook::HookError,
    types::FieldType,
};
use thiserror::Error as ThisError;

///
/// QueryError
///
/// Rejections raised while validating list/report/count input against a
/// type's schema. Evaluation itself cannot fail once input validates.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("'{column}' is not a declared field")]
    UnknownColumn { column: String },

    #[error("operator {op} cannot apply to field '{field}' ({field_type})")]
    FilterTypeMismatch {
        field: String,
        field_type: FieldType,
        op: crate::query::FilterOp,
    },

    #[error("operator {op} expects {expected}")]
    InvalidOperand {
        op: crate::query::FilterOp,
        expected: &'static str,
    },
}

///
/// ActionError
///
/// Structural failures around action invocation, plus the handler's own
/// failure surface.
///

#[derive(Debug, ThisError)]
pub enum ActionError {
    #[error("unknown action '{key}'")]
    UnknownAction { key: String },

    #[error("action '{key}' requires a loaded record")]
    RecordRequired { key: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("action '{key}' failed: {source}")]
    Failed {
        key: String,
        #[source]
        source: ActionFailure,
    },
}

///
/// Error
///
/// Top-level engine error. Construction-time schema errors are never
/// downgraded into any of the runtime variants; runtime errors carry
/// enough structure (kind plus offending field or key) for a precise
/// user-facing message.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Id(#[from] IdError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("type '{0}' is already registered")]
    DuplicateType(String),

    #[error("unknown entry type '{0}'")]
    UnknownEntryType(String),

    #[error("unknown settings type '{0}'")]
    UnknownSettingsType(String),

    #[error("entry type '{entry_type}' has no child list '{child}'")]
    UnknownChild { entry_type: String, child: String },
}
