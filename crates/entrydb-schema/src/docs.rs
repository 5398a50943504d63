//! Introspection projection consumed by documentation tooling. Derived
//! mechanically from registered actions, so it can never drift from the
//! action registry.

use crate::{action::EntryAction, types::FieldType};
use serde::{Deserialize, Serialize};

///
/// DocsActionParam
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DocsActionParam {
    pub param_name: String,
    pub required: bool,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

///
/// DocsAction
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DocsAction {
    pub action_name: String,
    pub description: String,
    pub params: Vec<DocsActionParam>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// Callable without a loaded record.
    pub public: bool,
    /// Internal-only action, listed for system tooling but not exposed.
    pub system: bool,
}

impl DocsAction {
    /// Project one registered action into its docs shape.
    #[must_use]
    pub fn from_action(action: &EntryAction) -> Self {
        Self {
            action_name: action.key.clone(),
            description: action.description.clone().unwrap_or_default(),
            params: action
                .params
                .iter()
                .map(|p| DocsActionParam {
                    param_name: p.key.clone(),
                    required: p.required,
                    field_type: p.field_type,
                })
                .collect(),
            response: None,
            public: action.global,
            system: action.private,
        }
    }
}

///
/// DocsActionGroup
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DocsActionGroup {
    pub group_name: String,
    pub actions: Vec<DocsAction>,
}

impl DocsActionGroup {
    /// Build the docs group for a type's actions. Private actions are
    /// excluded; they are unreachable from external callers.
    #[must_use]
    pub fn for_actions(group_name: impl Into<String>, actions: &[EntryAction]) -> Self {
        Self {
            group_name: group_name.into(),
            actions: actions
                .iter()
                .filter(|a| !a.private)
                .map(DocsAction::from_action)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDefinition;

    #[test]
    fn private_actions_are_filtered_from_docs() {
        let actions = vec![
            EntryAction::new("announce", |_| Ok(None)).global().params(vec![
                FieldDefinition::new("message", FieldType::Text).required(),
            ]),
            EntryAction::new("reindex", |_| Ok(None)).private(),
        ];

        let group = DocsActionGroup::for_actions("task", &actions);

        assert_eq!(group.actions.len(), 1);
        let doc = &group.actions[0];
        assert_eq!(doc.action_name, "announce");
        assert!(doc.public);
        assert_eq!(doc.params.len(), 1);
        assert!(doc.params[0].required);
        assert_eq!(doc.params[0].field_type, FieldType::Text);
    }
}
