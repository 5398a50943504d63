use crate::{
    MAX_TYPE_NAME_LEN,
    action::EntryAction,
    entry::{self, check_fields},
    error::{SchemaError, SchemaIssue},
    field::{FieldDefinition, FieldGroup},
    hook::{Hook, HookPhase, HookSet},
};

///
/// SettingsConfig
///

#[derive(Clone, Debug)]
pub struct SettingsConfig {
    pub label: String,
    pub description: String,
}

///
/// SettingsType
///
/// Singleton variant of an entry type for process-wide configuration:
/// no identifier strategy, no children, no connections. The engine
/// stores exactly one record per settings type and runs only the
/// save-path hook phases.
///

#[derive(Clone, Debug)]
pub struct SettingsType {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
    pub field_groups: Vec<FieldGroup>,
    pub config: SettingsConfig,
    pub hooks: HookSet,
    pub actions: Vec<EntryAction>,
}

impl SettingsType {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SettingsTypeBuilder {
        SettingsTypeBuilder::new(name)
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.key == key)
    }

    #[must_use]
    pub fn action(&self, key: &str) -> Option<&EntryAction> {
        self.actions.iter().find(|a| a.key == key)
    }
}

///
/// SettingsTypeBuilder
///

#[derive(Debug, Default)]
pub struct SettingsTypeBuilder {
    name: String,
    label: Option<String>,
    description: Option<String>,
    fields: Vec<FieldDefinition>,
    hooks: HookSet,
    actions: Vec<EntryAction>,
}

impl SettingsTypeBuilder {
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
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: Vec<FieldDefinition>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Register a save-path hook. Phases outside [`HookPhase::SETTINGS`]
    /// are a schema error at build time.
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

    pub fn build(self) -> Result<SettingsType, SchemaError> {
        let mut issues = Vec::new();

        if self.name.is_empty() || self.name.len() > MAX_TYPE_NAME_LEN {
            issues.push(SchemaIssue::InvalidName {
                name: self.name.clone(),
                max: MAX_TYPE_NAME_LEN,
            });
        }

        check_fields(&self.fields, &mut issues);

        for phase in HookPhase::ALL {
            if !HookPhase::SETTINGS.contains(&phase) && !self.hooks.phase(phase).is_empty() {
                issues.push(SchemaIssue::UnsupportedHookPhase {
                    phase: phase.to_string(),
                });
            }
        }

        if !issues.is_empty() {
            return Err(SchemaError::new(self.name, issues));
        }

        let field_groups = entry::group_fields(&self.fields);

        Ok(SettingsType {
            config: SettingsConfig {
                label: self.label.unwrap_or_else(|| self.name.clone()),
                description: self.description.unwrap_or_default(),
            },
            name: self.name,
            fields: self.fields,
            field_groups,
            hooks: self.hooks,
            actions: self.actions,
        })
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;

    #[test]
    fn builds_a_minimal_settings_type() {
        let settings = SettingsType::builder("mail")
            .label("Mail Settings")
            .field(FieldDefinition::new("smtp_host", FieldType::Text).required())
            .field(FieldDefinition::new("smtp_port", FieldType::Int))
            .build()
            .unwrap();

        assert_eq!(settings.fields.len(), 2);
        assert!(settings.field("smtp_host").is_some());
    }

    #[test]
    fn delete_phase_hooks_are_rejected() {
        let err = SettingsType::builder("mail")
            .hook(HookPhase::BeforeDelete, Hook::new(|_| Ok(())))
            .build()
            .unwrap_err();

        assert_eq!(err.issues.len(), 1);
    }
}
