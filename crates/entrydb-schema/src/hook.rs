use crate::record::EntryRecord;
use derive_more::Display;
use std::fmt;
use std::sync::Arc;
use thiserror::Error as ThisError;

///
/// HookPhase
///
/// The ordered extension points around save and delete. One save pass
/// runs `BeforeValidate → Validate → BeforeInsert (insert only) →
/// BeforeSave → persist → AfterInsert (insert only) → AfterSave`;
/// deletion runs `BeforeDelete → remove → AfterDelete`.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum HookPhase {
    BeforeValidate,
    Validate,
    BeforeInsert,
    BeforeSave,
    AfterInsert,
    AfterSave,
    BeforeDelete,
    AfterDelete,
}

impl HookPhase {
    pub const ALL: [Self; 8] = [
        Self::BeforeValidate,
        Self::Validate,
        Self::BeforeInsert,
        Self::BeforeSave,
        Self::AfterInsert,
        Self::AfterSave,
        Self::BeforeDelete,
        Self::AfterDelete,
    ];

    /// Phases available to settings types (save path only).
    pub const SETTINGS: [Self; 4] = [
        Self::BeforeValidate,
        Self::Validate,
        Self::BeforeSave,
        Self::AfterSave,
    ];
}

///
/// HookError
///
/// A hook rejecting the current save or delete. The first failing hook
/// aborts the remaining pipeline for the enclosing call.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum HookError {
    #[error("validation failed{}: {reason}", field.as_ref().map(|f| format!(" on '{f}'")).unwrap_or_default())]
    Invalid {
        field: Option<String>,
        reason: String,
    },

    #[error("{0}")]
    Failed(String),
}

impl HookError {
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: None,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: Some(field.into()),
            reason: reason.into(),
        }
    }
}

/// Handler signature for lifecycle hooks. Handlers are synchronous and
/// run strictly in registration order; each completes before the next
/// starts.
pub type HookFn = Arc<dyn Fn(&mut EntryRecord) -> Result<(), HookError> + Send + Sync>;

///
/// Hook
///

#[derive(Clone)]
pub struct Hook {
    pub label: Option<String>,
    pub description: Option<String>,
    pub handler: HookFn,
}

impl Hook {
    #[must_use]
    pub fn new(handler: impl Fn(&mut EntryRecord) -> Result<(), HookError> + Send + Sync + 'static) -> Self {
        Self {
            label: None,
            description: None,
            handler: Arc::new(handler),
        }
    }

    #[must_use]
    pub fn labeled(
        label: impl Into<String>,
        handler: impl Fn(&mut EntryRecord) -> Result<(), HookError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: Some(label.into()),
            description: None,
            handler: Arc::new(handler),
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

///
/// HookSet
///
/// Per-phase hook registry preserving registration order. Invoked by
/// explicit iteration in the engine, never by dynamic phase lookup.
///

#[derive(Clone, Debug, Default)]
pub struct HookSet {
    before_validate: Vec<Hook>,
    validate: Vec<Hook>,
    before_insert: Vec<Hook>,
    before_save: Vec<Hook>,
    after_insert: Vec<Hook>,
    after_save: Vec<Hook>,
    before_delete: Vec<Hook>,
    after_delete: Vec<Hook>,
}

impl HookSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, phase: HookPhase, hook: Hook) {
        self.phase_mut(phase).push(hook);
    }

    #[must_use]
    pub fn phase(&self, phase: HookPhase) -> &[Hook] {
        match phase {
            HookPhase::BeforeValidate => &self.before_validate,
            HookPhase::Validate => &self.validate,
            HookPhase::BeforeInsert => &self.before_insert,
            HookPhase::BeforeSave => &self.before_save,
            HookPhase::AfterInsert => &self.after_insert,
            HookPhase::AfterSave => &self.after_save,
            HookPhase::BeforeDelete => &self.before_delete,
            HookPhase::AfterDelete => &self.after_delete,
        }
    }

    fn phase_mut(&mut self, phase: HookPhase) -> &mut Vec<Hook> {
        match phase {
            HookPhase::BeforeValidate => &mut self.before_validate,
            HookPhase::Validate => &mut self.validate,
            HookPhase::BeforeInsert => &mut self.before_insert,
            HookPhase::BeforeSave => &mut self.before_save,
            HookPhase::AfterInsert => &mut self.after_insert,
            HookPhase::AfterSave => &mut self.after_save,
            HookPhase::BeforeDelete => &mut self.before_delete,
            HookPhase::AfterDelete => &mut self.after_delete,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        HookPhase::ALL.iter().all(|p| self.phase(*p).is_empty())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_order_is_preserved_per_phase() {
        let mut hooks = HookSet::new();
        hooks.register(HookPhase::BeforeSave, Hook::labeled("first", |_| Ok(())));
        hooks.register(HookPhase::BeforeSave, Hook::labeled("second", |_| Ok(())));
        hooks.register(HookPhase::Validate, Hook::labeled("check", |_| Ok(())));

        let labels: Vec<_> = hooks
            .phase(HookPhase::BeforeSave)
            .iter()
            .map(|h| h.label.clone().unwrap())
            .collect();

        assert_eq!(labels, ["first", "second"]);
        assert_eq!(hooks.phase(HookPhase::Validate).len(), 1);
        assert!(hooks.phase(HookPhase::AfterDelete).is_empty());
    }
}
