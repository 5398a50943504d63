use crate::{
    MAX_FIELD_KEY_LEN, MAX_TYPE_NAME_LEN, MIN_HASH_ID_LEN,
    action::EntryAction,
    child::ChildList,
    docs::DocsActionGroup,
    error::{SchemaError, SchemaIssue},
    field::{FieldDefinition, FieldGroup},
    hook::{Hook, HookPhase, HookSet},
    id::IdStrategy,
    types::{FieldType, OrderDirection},
};
use convert_case::{Case, Casing};

/// Group name used for fields without an explicit `group`.
pub const DEFAULT_FIELD_GROUP: &str = "default";

///
/// EntryTypeConfig
///

#[derive(Clone, Debug)]
pub struct EntryTypeConfig {
    pub label: String,
    pub description: String,

    /// Field shown as the record's title instead of its id.
    pub title_field: Option<String>,
    /// Choice-typed field driving status badges.
    pub status_field: Option<String>,

    /// Backing table name; defaults to the snake_case type name.
    pub table_name: String,

    /// Append an edit-log entry per create/update/delete.
    pub edit_log: bool,

    pub id_strategy: IdStrategy,

    pub order_field: Option<String>,
    pub order_direction: OrderDirection,
}

///
/// EntryConnection
///
/// Reverse-lookup metadata: records of `entry_type` pointing at this
/// type through `id_field_key`.
///

#[derive(Clone, Debug)]
pub struct EntryConnection {
    pub entry_type: String,
    pub label: String,
    pub id_field_key: String,
    pub field_label: String,
    pub list_fields: Vec<FieldDefinition>,
}

///
/// EntryType
///
/// The validated schema aggregate for one kind of stored record. Only
/// obtainable through [`EntryTypeBuilder`]; a value of this type has
/// passed every construction-time invariant, so the engine and UI
/// consumers never see unresolved references.
///

#[derive(Clone, Debug)]
pub struct EntryType {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
    pub children: Vec<ChildList>,
    pub connections: Vec<EntryConnection>,

    /// Fields partitioned by `group`, order-preserving.
    pub field_groups: Vec<FieldGroup>,
    /// `field_groups` minus hidden fields and empty groups.
    pub display_field_groups: Vec<FieldGroup>,
    /// Keys with `in_list`, id always first.
    pub list_fields: Vec<String>,

    pub config: EntryTypeConfig,
    pub hooks: HookSet,
    pub actions: Vec<EntryAction>,
}

impl EntryType {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> EntryTypeBuilder {
        EntryTypeBuilder::new(name)
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.key == key)
    }

    #[must_use]
    pub fn action(&self, key: &str) -> Option<&EntryAction> {
        self.actions.iter().find(|a| a.key == key)
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Option<&ChildList> {
        self.children.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn primary_key_field(&self) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// Docs projection over the non-private actions of this type.
    #[must_use]
    pub fn docs(&self) -> DocsActionGroup {
        DocsActionGroup::for_actions(self.name.clone(), &self.actions)
    }

    /// Render a record title: the configured title field's value, or
    /// the record id.
    #[must_use]
    pub fn title_of(&self, record: &crate::record::EntryRecord) -> String {
        self.config
            .title_field
            .as_deref()
            .map(|key| record.get(key))
            .filter(|v| !v.is_empty())
            .map_or_else(|| record.id.clone(), ToString::to_string)
    }
}

///
/// EntryTypeBuilder
///
/// Accumulates raw declarations and produces a validated [`EntryType`].
/// `build` fails fast with a [`SchemaError`] carrying every violated
/// invariant; a misconfigured type never becomes usable.
///

#[derive(Debug, Default)]
pub struct EntryTypeBuilder {
    name: String,
    label: Option<String>,
    description: Option<String>,
    title_field: Option<String>,
    status_field: Option<String>,
    table_name: Option<String>,
    edit_log: bool,
    id_strategy: IdStrategy,
    order_field: Option<String>,
    order_direction: OrderDirection,
    fields: Vec<FieldDefinition>,
    children: Vec<ChildList>,
    connections: Vec<EntryConnection>,
    hooks: HookSet,
    actions: Vec<EntryAction>,
}

impl EntryTypeBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
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
    pub fn title_field(mut self, key: impl Into<String>) -> Self {
        self.title_field = Some(key.into());
        self
    }

    #[must_use]
    pub fn status_field(mut self, key: impl Into<String>) -> Self {
        self.status_field = Some(key.into());
        self
    }

    #[must_use]
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    #[must_use]
    pub const fn edit_log(mut self) -> Self {
        self.edit_log = true;
        self
    }

    #[must_use]
    pub fn id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    #[must_use]
    pub fn order_by(mut self, key: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_field = Some(key.into());
        self.order_direction = direction;
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: Vec<FieldDefinition>) -> Self {
        self.fields.extend(fields);
        self
    }

    #[must_use]
    pub fn child(mut self, child: ChildList) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn connection(mut self, connection: EntryConnection) -> Self {
        self.connections.push(connection);
        self
    }

    #[must_use]
    pub fn hook(mut self, phase: HookPhase, hook: Hook) -> Self {
        self.hooks.register(phase, hook);
        self
    }

    #[must_use]
    pub fn action(mut self, action: EntryAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Validate every schema invariant and assemble the derived views.
    pub fn build(self) -> Result<EntryType, SchemaError> {
        let mut issues = Vec::new();

        check_name(&self.name, MAX_TYPE_NAME_LEN, &mut issues);
        check_fields(&self.fields, &mut issues);
        check_field_refs(&self, &mut issues);
        check_id_strategy(&self.id_strategy, &self.fields, &mut issues);
        check_duplicates(
            self.actions.iter().map(|a| a.key.as_str()),
            |key| SchemaIssue::DuplicateAction { key },
            &mut issues,
        );
        check_duplicates(
            self.children.iter().map(|c| c.name.as_str()),
            |name| SchemaIssue::DuplicateChild { name },
            &mut issues,
        );
        for child in &self.children {
            check_fields(&child.fields, &mut issues);
        }

        if !issues.is_empty() {
            return Err(SchemaError::new(self.name, issues));
        }

        let field_groups = group_fields(&self.fields);
        let display_field_groups = display_groups(&field_groups);
        let list_fields = list_fields(&self.fields);
        let table_name = self
            .table_name
            .unwrap_or_else(|| self.name.to_case(Case::Snake));

        Ok(EntryType {
            config: EntryTypeConfig {
                label: self.label.unwrap_or_else(|| self.name.clone()),
                description: self.description.unwrap_or_default(),
                title_field: self.title_field,
                status_field: self.status_field,
                table_name,
                edit_log: self.edit_log,
                id_strategy: self.id_strategy,
                order_field: self.order_field,
                order_direction: self.order_direction,
            },
            name: self.name,
            fields: self.fields,
            children: self.children,
            connections: self.connections,
            field_groups,
            display_field_groups,
            list_fields,
            hooks: self.hooks,
            actions: self.actions,
        })
    }
}

// -- invariant checks

fn check_name(name: &str, max: usize, issues: &mut Vec<SchemaIssue>) {
    if name.is_empty() || name.len() > max {
        issues.push(SchemaIssue::InvalidName {
            name: name.to_string(),
            max,
        });
    }
}

pub(crate) fn check_fields(fields: &[FieldDefinition], issues: &mut Vec<SchemaIssue>) {
    check_duplicates(
        fields.iter().map(|f| f.key.as_str()),
        |key| SchemaIssue::DuplicateField { key },
        issues,
    );

    let mut primary: Option<&str> = None;
    for field in fields {
        check_name(&field.key, MAX_FIELD_KEY_LEN, issues);

        if field.primary_key {
            if let Some(first) = primary {
                issues.push(SchemaIssue::MultiplePrimaryKeys {
                    first: first.to_string(),
                    second: field.key.clone(),
                });
            } else {
                primary = Some(&field.key);
            }
        }

        // choices iff choice-typed
        if field.field_type.is_choice() {
            if field.choices.is_empty() {
                issues.push(SchemaIssue::MissingChoices {
                    key: field.key.clone(),
                    field_type: field.field_type,
                });
            }
            check_duplicates(
                field.choices.iter().map(|c| c.key.canonical()),
                |choice| SchemaIssue::DuplicateChoiceKey {
                    key: field.key.clone(),
                    choice,
                },
                issues,
            );
        } else if !field.choices.is_empty() {
            issues.push(SchemaIssue::UnexpectedChoices {
                key: field.key.clone(),
                field_type: field.field_type,
            });
        }

        // fetch options iff link-typed
        if field.field_type == FieldType::Link {
            if field.fetch_options.is_none() {
                issues.push(SchemaIssue::MissingFetchOptions {
                    key: field.key.clone(),
                });
            }
        } else if field.fetch_options.is_some() {
            issues.push(SchemaIssue::UnexpectedFetchOptions {
                key: field.key.clone(),
                field_type: field.field_type,
            });
        }
    }
}

fn check_field_refs(builder: &EntryTypeBuilder, issues: &mut Vec<SchemaIssue>) {
    let declared = |key: &str| builder.fields.iter().any(|f| f.key == key);

    let mut require = |role: &'static str, key: Option<&str>| {
        if let Some(key) = key
            && !declared(key)
        {
            issues.push(SchemaIssue::UnknownFieldRef {
                role,
                key: key.to_string(),
            });
        }
    };

    require("title field", builder.title_field.as_deref());
    require("status field", builder.status_field.as_deref());
    require("order field", builder.order_field.as_deref());

    for field in &builder.fields {
        require("depends_on", field.depends_on.as_deref());

        if let Some(options) = &field.fetch_options {
            require("fetch this_id_key", Some(&options.this_id_key));
            require("fetch this_field_key", Some(&options.this_field_key));
        }
    }

    // status field must be choice-typed
    if let Some(key) = builder.status_field.as_deref()
        && let Some(field) = builder.fields.iter().find(|f| f.key == key)
        && !field.field_type.is_choice()
    {
        issues.push(SchemaIssue::StatusFieldNotChoice {
            key: key.to_string(),
            field_type: field.field_type,
        });
    }
}

fn check_id_strategy(
    strategy: &IdStrategy,
    fields: &[FieldDefinition],
    issues: &mut Vec<SchemaIssue>,
) {
    let declared = |key: &str| fields.iter().any(|f| f.key == key);

    match strategy {
        IdStrategy::Hash { hash_length } if *hash_length < MIN_HASH_ID_LEN => {
            issues.push(SchemaIssue::InvalidIdStrategy {
                reason: format!("hash_length {hash_length} is below the minimum {MIN_HASH_ID_LEN}"),
            });
        }
        IdStrategy::Data { fields: sources } => {
            if sources.is_empty() {
                issues.push(SchemaIssue::InvalidIdStrategy {
                    reason: "data strategy declares no source fields".to_string(),
                });
            }
            for key in sources {
                if !declared(key) {
                    issues.push(SchemaIssue::UnknownFieldRef {
                        role: "id data source",
                        key: key.clone(),
                    });
                }
            }
        }
        IdStrategy::Field { field } if !declared(field) => {
            issues.push(SchemaIssue::UnknownFieldRef {
                role: "id field source",
                key: field.clone(),
            });
        }
        _ => {}
    }
}

fn check_duplicates<K: Into<String>>(
    keys: impl Iterator<Item = K>,
    issue: impl Fn(String) -> SchemaIssue,
    issues: &mut Vec<SchemaIssue>,
) {
    let mut seen = std::collections::BTreeSet::new();
    for key in keys {
        let key = key.into();
        if !seen.insert(key.clone()) {
            issues.push(issue(key));
        }
    }
}

// -- derived views

pub(crate) fn group_fields(fields: &[FieldDefinition]) -> Vec<FieldGroup> {
    let mut groups: Vec<FieldGroup> = Vec::new();

    for field in fields {
        let name = field.group.as_deref().unwrap_or(DEFAULT_FIELD_GROUP);

        if let Some(group) = groups.iter_mut().find(|g| g.name == name) {
            group.fields.push(field.clone());
            continue;
        }

        let group = FieldGroup {
            name: name.to_string(),
            fields: vec![field.clone()],
        };

        // The default group, when present, always leads; named groups
        // keep first-appearance order.
        if name == DEFAULT_FIELD_GROUP {
            groups.insert(0, group);
        } else {
            groups.push(group);
        }
    }

    groups
}

fn display_groups(groups: &[FieldGroup]) -> Vec<FieldGroup> {
    groups
        .iter()
        .map(|g| FieldGroup {
            name: g.name.clone(),
            fields: g.fields.iter().filter(|f| !f.hidden).cloned().collect(),
        })
        .filter(|g| !g.fields.is_empty())
        .collect()
}

fn list_fields(fields: &[FieldDefinition]) -> Vec<String> {
    let mut keys = vec!["id".to_string()];
    keys.extend(
        fields
            .iter()
            .filter(|f| f.in_list)
            .map(|f| f.key.clone()),
    );
    keys
}

///
/// TESTS
///
