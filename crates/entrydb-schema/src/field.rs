use crate::{types::FieldType, value::Value};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

///
/// ChoiceKey
///
/// Key of one selectable choice. The original model admits both string
/// and integer keys; both render to a canonical string for matching.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChoiceKey {
    Int(i64),
    Text(String),
}

impl ChoiceKey {
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for ChoiceKey {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for ChoiceKey {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

///
/// ChoiceColor
///
/// UI accent palette for choice badges. Consumed by rendering layers
/// as-is.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
#[serde(rename_all = "lowercase")]
pub enum ChoiceColor {
    Accent,
    Error,
    Info,
    Muted,
    Primary,
    Secondary,
    Success,
    Warning,
}

///
/// Choice
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Choice {
    pub key: ChoiceKey,
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ChoiceColor>,
}

impl Choice {
    #[must_use]
    pub fn new(key: impl Into<ChoiceKey>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            color: None,
        }
    }

    #[must_use]
    pub const fn with_color(mut self, color: ChoiceColor) -> Self {
        self.color = Some(color);
        self
    }
}

///
/// FetchOptions
///
/// Connection metadata for `Link` fields: which entry type to fetch and
/// how local keys map onto it.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FetchOptions {
    /// Target entry-type name.
    pub fetch_entry: String,
    /// Local field holding the target id.
    pub this_id_key: String,
    /// Local field the fetched value lands in.
    pub this_field_key: String,
    /// Field on the target type to fetch.
    pub that_field_key: String,
}

///
/// DefaultValue
///
/// Either a literal or a deferred producer. Producers are resolved at
/// record-creation time, never at schema-definition time.
///

#[derive(Clone)]
pub enum DefaultValue {
    Literal(Value),
    Generated(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    /// Resolve to a concrete value.
    #[must_use]
    pub fn resolve(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Generated(producer) => producer(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Generated(_) => f.write_str("Generated(..)"),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

///
/// FieldDefinition
///
/// One typed, constrained attribute of an entry or settings type.
///

#[derive(Clone, Debug)]
pub struct FieldDefinition {
    /// Unique key within the owning type; how the field is addressed.
    pub key: String,
    pub field_type: FieldType,

    pub label: Option<String>,
    pub description: Option<String>,

    pub required: bool,
    pub read_only: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub hidden: bool,

    /// Include in the default list view projection.
    pub in_list: bool,
    /// Show on the create form.
    pub in_create: bool,

    /// Required iff the field is choice-typed.
    pub choices: Vec<Choice>,
    /// Required iff the field is a `Link`.
    pub fetch_options: Option<FetchOptions>,
    pub default_value: Option<DefaultValue>,

    /// Field-group name for form sectioning.
    pub group: Option<String>,
    /// Key of a field this one derives from.
    pub depends_on: Option<String>,
}

impl FieldDefinition {
    #[must_use]
    pub fn new(key: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            field_type,
            label: None,
            description: None,
            required: false,
            read_only: false,
            primary_key: false,
            unique: false,
            hidden: false,
            in_list: false,
            in_create: true,
            choices: Vec::new(),
            fetch_options: None,
            default_value: None,
            group: None,
            depends_on: None,
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
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    #[must_use]
    pub const fn in_list(mut self) -> Self {
        self.in_list = true;
        self
    }

    #[must_use]
    pub fn choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    #[must_use]
    pub fn fetch_options(mut self, options: FetchOptions) -> Self {
        self.fetch_options = Some(options);
        self
    }

    #[must_use]
    pub fn default_value(mut self, default: impl Into<DefaultValue>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    #[must_use]
    pub fn generated_default(
        mut self,
        producer: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        self.default_value = Some(DefaultValue::Generated(Arc::new(producer)));
        self
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn depends_on(mut self, key: impl Into<String>) -> Self {
        self.depends_on = Some(key.into());
        self
    }

    /// Resolved display label: explicit label or the key itself.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }

    /// True when `key` matches one of this field's choice keys.
    #[must_use]
    pub fn has_choice(&self, key: &str) -> bool {
        self.choices.iter().any(|c| c.key.canonical() == key)
    }
}

///
/// FieldGroup
///
/// Fields partitioned by their `group` property, order-preserving.
/// Derived at entry-type build time for form rendering.
///

#[derive(Clone, Debug)]
pub struct FieldGroup {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_defaults_resolve_lazily() {
        use std::sync::atomic::{AtomicI64, Ordering};

        let counter = Arc::new(AtomicI64::new(0));
        let c = Arc::clone(&counter);
        let def = FieldDefinition::new("seq", FieldType::Int)
            .generated_default(move || Value::Int(c.fetch_add(1, Ordering::SeqCst)));

        // Nothing ran at definition time.
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        let default = def.default_value.as_ref().unwrap();
        assert_eq!(default.resolve(), Value::Int(0));
        assert_eq!(default.resolve(), Value::Int(1));
    }

    #[test]
    fn choice_keys_render_canonically() {
        let field = FieldDefinition::new("status", FieldType::SingleChoice).choices(vec![
            Choice::new("active", "Active"),
            Choice::new(2, "Archived"),
        ]);

        assert!(field.has_choice("active"));
        assert!(field.has_choice("2"));
        assert!(!field.has_choice("gone"));
    }
}
