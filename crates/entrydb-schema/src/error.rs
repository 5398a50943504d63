use crate::types::{FieldType, ValueTag};
use thiserror::Error as ThisError;

///
/// TypeMismatch
///
/// A raw value could not be coerced into a field type's native shape.
/// Coercion never truncates; anything not losslessly convertible lands
/// here.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("value of shape {got} is not assignable to {field_type} (native shape {expected})")]
pub struct TypeMismatch {
    pub field_type: FieldType,
    pub expected: ValueTag,
    pub got: ValueTag,
}

///
/// ValidationError
///
/// A field-level rejection during save or action-parameter checking.
/// Carries the offending field key so callers can render a precise
/// message.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidationError {
    #[error("required field '{field}' is missing")]
    MissingRequiredField { field: String },

    #[error("field '{field}': {source}")]
    TypeMismatch {
        field: String,
        #[source]
        source: TypeMismatch,
    },

    #[error("field '{field}' ({field_type}) rejected value '{value}': invalid format")]
    InvalidFormat {
        field: String,
        field_type: FieldType,
        value: String,
    },

    #[error("field '{field}' has no choice with key '{key}'")]
    UnknownChoice { field: String, key: String },

    #[error("field '{field}' must be unique; value '{value}' already exists")]
    NotUnique { field: String, value: String },

    #[error("field '{field}' is read-only")]
    ReadOnlyField { field: String },

    #[error("'{column}' is not a declared field")]
    UnknownColumn { column: String },
}

impl ValidationError {
    /// The offending field or column key.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::MissingRequiredField { field }
            | Self::TypeMismatch { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::UnknownChoice { field, .. }
            | Self::NotUnique { field, .. }
            | Self::ReadOnlyField { field } => field,
            Self::UnknownColumn { column } => column,
        }
    }
}

///
/// SchemaIssue
///
/// One construction-time invariant violation. Collected, not
/// fail-on-first, so a misconfigured type reports everything at once.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaIssue {
    #[error("duplicate field key '{key}'")]
    DuplicateField { key: String },

    #[error("duplicate action key '{key}'")]
    DuplicateAction { key: String },

    #[error("duplicate child list '{name}'")]
    DuplicateChild { name: String },

    #[error("fields '{first}' and '{second}' both declare primary_key")]
    MultiplePrimaryKeys { first: String, second: String },

    #[error("{role} references undeclared field '{key}'")]
    UnknownFieldRef { role: &'static str, key: String },

    #[error("status field '{key}' must be a choice-typed field, found {field_type}")]
    StatusFieldNotChoice { key: String, field_type: FieldType },

    #[error("field '{key}' is {field_type} but declares no choices")]
    MissingChoices { key: String, field_type: FieldType },

    #[error("field '{key}' declares choices but is {field_type}")]
    UnexpectedChoices { key: String, field_type: FieldType },

    #[error("field '{key}' declares duplicate choice key '{choice}'")]
    DuplicateChoiceKey { key: String, choice: String },

    #[error("link field '{key}' declares no fetch options")]
    MissingFetchOptions { key: String },

    #[error("field '{key}' declares fetch options but is {field_type}")]
    UnexpectedFetchOptions { key: String, field_type: FieldType },

    #[error("identifier strategy: {reason}")]
    InvalidIdStrategy { reason: String },

    #[error("hook phase {phase} is not available on this type")]
    UnsupportedHookPhase { phase: String },

    #[error("identifier '{name}' is empty or exceeds {max} characters")]
    InvalidName { name: String, max: usize },
}

///
/// SchemaError
///
/// Fatal construction-time failure: the type never becomes usable.
/// Never downgraded to a runtime error.
///

#[derive(Clone, Debug, ThisError)]
#[error("schema for '{type_name}' is invalid: {}", format_issues(issues))]
pub struct SchemaError {
    pub type_name: String,
    pub issues: Vec<SchemaIssue>,
}

impl SchemaError {
    #[must_use]
    pub const fn new(type_name: String, issues: Vec<SchemaIssue>) -> Self {
        Self { type_name, issues }
    }
}

fn format_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
