pub mod action;
pub mod child;
pub mod docs;
pub mod entry;
pub mod error;
pub mod field;
pub mod hook;
pub mod id;
pub mod record;
pub mod registry;
pub mod settings;
pub mod types;
pub mod value;

/// Maximum length for entry-type identifiers.
pub const MAX_TYPE_NAME_LEN: usize = 64;

/// Maximum length for field keys.
pub const MAX_FIELD_KEY_LEN: usize = 64;

/// Minimum length accepted for `hash`-strategy identifiers.
pub const MIN_HASH_ID_LEN: u32 = 4;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        action::{ActionFailure, ActionInput, EntryAction},
        child::ChildList,
        docs::{DocsAction, DocsActionGroup, DocsActionParam},
        entry::{EntryConnection, EntryType, EntryTypeBuilder, EntryTypeConfig},
        error::{SchemaError, SchemaIssue, TypeMismatch, ValidationError},
        field::{Choice, ChoiceColor, ChoiceKey, DefaultValue, FetchOptions, FieldDefinition,
            FieldGroup},
        hook::{Hook, HookError, HookPhase, HookSet},
        id::IdStrategy,
        record::{EditAction, EditLogEntry, EntryRecord, UserSession},
        registry::{coerce, validate_value},
        settings::{SettingsType, SettingsTypeBuilder},
        types::{FieldType, OrderDirection, ValueTag},
        value::Value,
    };
}
