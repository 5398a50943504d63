use crate::error::ActionError;
use entrydb_schema::{
    action::{ActionInput, EntryAction},
    error::ValidationError,
    record::EntryRecord,
    registry,
    value::Value,
};
use std::collections::BTreeMap;

/// Run one action against an optional loaded record.
///
/// Parameter validation happens entirely before the action body: each
/// supplied value is coerced and validated against the declared param
/// fields, unknown params are rejected, and missing required params
/// fail with the usual missing-field error.
pub(crate) fn invoke(
    action: &EntryAction,
    record: Option<&EntryRecord>,
    params: BTreeMap<String, Value>,
) -> Result<Option<Value>, ActionError> {
    if !action.global && record.is_none() {
        return Err(ActionError::RecordRequired {
            key: action.key.clone(),
        });
    }

    let params = validate_params(action, params)?;

    tracing::debug!(action = action.key, "invoking action");

    (action.handler)(ActionInput {
        record,
        params: &params,
    })
    .map_err(|source| ActionError::Failed {
        key: action.key.clone(),
        source,
    })
}

fn validate_params(
    action: &EntryAction,
    mut supplied: BTreeMap<String, Value>,
) -> Result<BTreeMap<String, Value>, ActionError> {
    let mut params = BTreeMap::new();

    for def in &action.params {
        let raw = supplied.remove(&def.key).unwrap_or(Value::Null);

        let coerced =
            registry::coerce(def.field_type, raw).map_err(|source| ValidationError::TypeMismatch {
                field: def.key.clone(),
                source,
            })?;
        registry::validate_value(def, &coerced)?;

        if !coerced.is_null() {
            params.insert(def.key.clone(), coerced);
        }
    }

    // Anything left over was never declared.
    if let Some(key) = supplied.into_keys().next() {
        return Err(ValidationError::UnknownColumn { column: key }.into());
    }

    Ok(params)
}

///
/// TESTS
///
