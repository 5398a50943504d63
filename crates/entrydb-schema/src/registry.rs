//! The field-type registry: the total mapping from field types to native
//! value shapes, plus coercion and per-field validation against it.
//!
//! Coercion is structural and lossless. A numeric string becomes an Int,
//! an exact whole Decimal becomes an Int, a scalar becomes a one-element
//! list for multi-valued types. Anything lossy fails with [`TypeMismatch`]
//! instead of truncating.

use crate::{
    error::{TypeMismatch, ValidationError},
    field::FieldDefinition,
    types::{FieldType, ValueTag},
    value::Value,
};
use chrono::NaiveDate;

/// Short-text fields cap their length; the original model's 255-char rule.
pub const TEXT_FIELD_MAX_LEN: usize = 255;

/// Coerce a raw value into the native shape of `field_type`.
///
/// `Null` passes through untouched; required-ness is [`validate_value`]'s
/// concern. Values already in native shape are returned verbatim.
pub fn coerce(field_type: FieldType, value: Value) -> Result<Value, TypeMismatch> {
    if value.is_null() {
        return Ok(value);
    }

    let expected = field_type.native_tag();
    let got = value.tag();

    let mismatch = |got: ValueTag| TypeMismatch {
        field_type,
        expected,
        got,
    };

    let coerced = match expected {
        ValueTag::Text => coerce_text(field_type, value),
        ValueTag::Int => coerce_int(value),
        ValueTag::BigInt => coerce_big_int(value),
        ValueTag::Decimal => coerce_decimal(value),
        ValueTag::Bool => coerce_bool(value),
        ValueTag::Date => coerce_date(value),
        ValueTag::Timestamp => coerce_timestamp(value),
        ValueTag::Json => coerce_json(value),
        ValueTag::List => coerce_list(field_type, value),
        ValueTag::Null => Some(Value::Null),
    };

    coerced.ok_or_else(|| mismatch(got))
}

/// Validate an already-coerced value against a field definition.
///
/// Checks required-ness, native shape, format rules for email/url/phone
/// types, short-text length, and choice-key membership.
pub fn validate_value(def: &FieldDefinition, value: &Value) -> Result<(), ValidationError> {
    if value.is_null() {
        if def.required {
            return Err(ValidationError::MissingRequiredField {
                field: def.key.clone(),
            });
        }

        return Ok(());
    }

    let expected = def.field_type.native_tag();
    if value.tag() != expected {
        return Err(ValidationError::TypeMismatch {
            field: def.key.clone(),
            source: TypeMismatch {
                field_type: def.field_type,
                expected,
                got: value.tag(),
            },
        });
    }

    match def.field_type {
        FieldType::Text => {
            let text = value.as_text().unwrap_or_default();
            if text.len() > TEXT_FIELD_MAX_LEN {
                return Err(invalid_format(def, value));
            }
        }
        FieldType::Email => {
            let text = value.as_text().unwrap_or_default();
            if !is_email(text) {
                return Err(invalid_format(def, value));
            }
        }
        FieldType::Url | FieldType::Image => {
            let text = value.as_text().unwrap_or_default();
            if !is_url(text) {
                return Err(invalid_format(def, value));
            }
        }
        FieldType::Phone => {
            let text = value.as_text().unwrap_or_default();
            if !is_phone(text) {
                return Err(invalid_format(def, value));
            }
        }
        FieldType::SingleChoice => {
            let key = value.to_key_string();
            if !def.has_choice(&key) {
                return Err(ValidationError::UnknownChoice {
                    field: def.key.clone(),
                    key,
                });
            }
        }
        FieldType::MultiChoice => {
            for item in value.as_list().unwrap_or_default() {
                let key = item.to_key_string();
                if !def.has_choice(&key) {
                    return Err(ValidationError::UnknownChoice {
                        field: def.key.clone(),
                        key,
                    });
                }
            }
        }
        FieldType::Tags => {
            for item in value.as_list().unwrap_or_default() {
                if item.as_text().is_none() {
                    return Err(invalid_format(def, item));
                }
            }
        }
        _ => {}
    }

    Ok(())
}

fn invalid_format(def: &FieldDefinition, value: &Value) -> ValidationError {
    ValidationError::InvalidFormat {
        field: def.key.clone(),
        field_type: def.field_type,
        value: value.to_key_string(),
    }
}

// -- per-shape coercions; None means "not structurally compatible"

fn coerce_text(field_type: FieldType, value: Value) -> Option<Value> {
    match value {
        Value::Text(_) => Some(value),
        // Choice keys may arrive as their integer form.
        Value::Int(n) if field_type == FieldType::SingleChoice => Some(Value::Text(n.to_string())),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn coerce_int(value: Value) -> Option<Value> {
    match value {
        Value::Int(_) => Some(value),
        Value::BigInt(n) => i64::try_from(n).ok().map(Value::Int),
        Value::Decimal(d) if d.fract() == 0.0 && is_exact_i64(d) => Some(Value::Int(d as i64)),
        Value::Text(s) => s.trim().parse::<i64>().ok().map(Value::Int),
        _ => None,
    }
}

fn coerce_big_int(value: Value) -> Option<Value> {
    match value {
        Value::BigInt(_) => Some(value),
        Value::Int(n) => Some(Value::BigInt(i128::from(n))),
        Value::Text(s) => s.trim().parse::<i128>().ok().map(Value::BigInt),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn coerce_decimal(value: Value) -> Option<Value> {
    match value {
        Value::Decimal(_) => Some(value),
        // Only integers exactly representable as f64 pass.
        Value::Int(n) if is_exact_f64(n) => Some(Value::Decimal(n as f64)),
        Value::Text(s) => s.trim().parse::<f64>().ok().map(Value::Decimal),
        _ => None,
    }
}

fn coerce_bool(value: Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value),
        Value::Text(s) => match s.to_ascii_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_date(value: Value) -> Option<Value> {
    match value {
        Value::Date(_) => Some(value),
        Value::Text(s) => s.trim().parse::<NaiveDate>().ok().map(Value::Date),
        _ => None,
    }
}

fn coerce_timestamp(value: Value) -> Option<Value> {
    match value {
        Value::Timestamp(_) => Some(value),
        Value::Int(ms) => Some(Value::Timestamp(ms)),
        Value::Text(s) => {
            let s = s.trim();
            if let Ok(ms) = s.parse::<i64>() {
                return Some(Value::Timestamp(ms));
            }
            chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| Value::Timestamp(dt.timestamp_millis()))
        }
        _ => None,
    }
}

fn coerce_json(value: Value) -> Option<Value> {
    match value {
        Value::Json(_) => Some(value),
        Value::Text(s) => serde_json::from_str(&s).ok().map(Value::Json),
        _ => None,
    }
}

fn coerce_list(field_type: FieldType, value: Value) -> Option<Value> {
    match value {
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(coerce_list_item(field_type, item)?);
            }
            Some(Value::List(out))
        }
        // A bare scalar becomes a one-element list.
        other => coerce_list_item(field_type, other).map(|item| Value::List(vec![item])),
    }
}

fn coerce_list_item(field_type: FieldType, item: Value) -> Option<Value> {
    match item {
        Value::Text(_) => Some(item),
        // Integer choice keys render to their canonical string form.
        Value::Int(n) if field_type == FieldType::MultiChoice => Some(Value::Text(n.to_string())),
        _ => None,
    }
}

const F64_SAFE_I64: i64 = 1i64 << 53;

#[allow(clippy::cast_precision_loss)]
fn is_exact_i64(d: f64) -> bool {
    d.abs() <= F64_SAFE_I64 as f64
}

const fn is_exact_f64(n: i64) -> bool {
    n.abs() <= F64_SAFE_I64
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Choice;
    use proptest::prelude::*;

    fn int_field(key: &str) -> FieldDefinition {
        FieldDefinition::new(key, FieldType::Int)
    }

    #[test]
    fn numeric_strings_coerce_to_int() {
        assert_eq!(
            coerce(FieldType::Int, Value::Text(" 42 ".into())),
            Ok(Value::Int(42))
        );
    }

    #[test]
    fn non_numeric_strings_fail_int_coercion() {
        let err = coerce(FieldType::Int, Value::Text("forty-two".into())).unwrap_err();
        assert_eq!(err.expected, ValueTag::Int);
        assert_eq!(err.got, ValueTag::Text);
    }

    #[test]
    fn whole_decimal_coerces_to_int_but_fraction_does_not() {
        assert_eq!(
            coerce(FieldType::Int, Value::Decimal(7.0)),
            Ok(Value::Int(7))
        );
        assert!(coerce(FieldType::Int, Value::Decimal(7.5)).is_err());
    }

    #[test]
    fn null_passes_coercion_untouched() {
        assert_eq!(coerce(FieldType::Timestamp, Value::Null), Ok(Value::Null));
    }

    #[test]
    fn iso_strings_coerce_to_dates_and_timestamps() {
        assert_eq!(
            coerce(FieldType::Date, Value::Text("2024-05-01".into())),
            Ok(Value::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
        );
        assert_eq!(
            coerce(FieldType::Timestamp, Value::Text("1970-01-01T00:00:01Z".into())),
            Ok(Value::Timestamp(1000))
        );
    }

    #[test]
    fn scalar_coerces_to_single_element_tag_list() {
        assert_eq!(
            coerce(FieldType::Tags, Value::Text("urgent".into())),
            Ok(Value::List(vec![Value::Text("urgent".into())]))
        );
    }

    #[test]
    fn required_null_is_missing_required_field() {
        let def = int_field("count").required();
        assert_eq!(
            validate_value(&def, &Value::Null),
            Err(ValidationError::MissingRequiredField {
                field: "count".into()
            })
        );
    }

    #[test]
    fn optional_null_validates() {
        assert_eq!(validate_value(&int_field("count"), &Value::Null), Ok(()));
    }

    #[test]
    fn email_format_is_checked() {
        let def = FieldDefinition::new("contact", FieldType::Email);
        assert!(validate_value(&def, &Value::Text("a@b.example".into())).is_ok());
        assert!(validate_value(&def, &Value::Text("not-an-email".into())).is_err());
        assert!(validate_value(&def, &Value::Text("a@b".into())).is_err());
    }

    #[test]
    fn url_format_is_checked() {
        let def = FieldDefinition::new("site", FieldType::Url);
        assert!(validate_value(&def, &Value::Text("https://example.com".into())).is_ok());
        assert!(validate_value(&def, &Value::Text("example.com".into())).is_err());
    }

    #[test]
    fn phone_format_is_checked() {
        let def = FieldDefinition::new("mobile", FieldType::Phone);
        assert!(validate_value(&def, &Value::Text("+41 79 123 45 67".into())).is_ok());
        assert!(validate_value(&def, &Value::Text("call me".into())).is_err());
    }

    #[test]
    fn choice_membership_is_checked() {
        let def = FieldDefinition::new("status", FieldType::SingleChoice)
            .choices(vec![Choice::new("active", "Active"), Choice::new("done", "Done")]);

        assert!(validate_value(&def, &Value::Text("active".into())).is_ok());
        assert_eq!(
            validate_value(&def, &Value::Text("stale".into())),
            Err(ValidationError::UnknownChoice {
                field: "status".into(),
                key: "stale".into()
            })
        );
    }

    #[test]
    fn multi_choice_checks_every_element() {
        let def = FieldDefinition::new("labels", FieldType::MultiChoice)
            .choices(vec![Choice::new("red", "Red"), Choice::new("blue", "Blue")]);

        let ok = Value::List(vec![Value::Text("red".into()), Value::Text("blue".into())]);
        assert!(validate_value(&def, &ok).is_ok());

        let bad = Value::List(vec![Value::Text("red".into()), Value::Text("green".into())]);
        assert!(validate_value(&def, &bad).is_err());
    }

    #[test]
    fn short_text_length_cap_applies() {
        let def = FieldDefinition::new("name", FieldType::Text);
        assert!(validate_value(&def, &Value::Text("x".repeat(255))).is_ok());
        assert!(validate_value(&def, &Value::Text("x".repeat(256))).is_err());
    }

    proptest! {
        // validate(coerce(v)) succeeds for any value coercion accepts.
        #[test]
        fn coerced_ints_always_validate(n in any::<i64>()) {
            let def = int_field("n");
            let coerced = coerce(FieldType::Int, Value::Text(n.to_string())).unwrap();
            prop_assert_eq!(validate_value(&def, &coerced), Ok(()));
        }

        #[test]
        fn coerced_timestamps_always_validate(ms in any::<i64>()) {
            let def = FieldDefinition::new("at", FieldType::Timestamp);
            let coerced = coerce(FieldType::Timestamp, Value::Int(ms)).unwrap();
            prop_assert_eq!(validate_value(&def, &coerced), Ok(()));
        }
    }
}

// -- format predicates; deliberately simple, documented policy

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.contains(char::is_whitespace)
}

fn is_url(s: &str) -> bool {
    let Some((scheme, rest)) = s.split_once("://") else {
        return false;
    };

    !scheme.is_empty()
        && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-')
        && !rest.is_empty()
}

fn is_phone(s: &str) -> bool {
    let digits = s.chars().filter(char::is_ascii_digit).count();

    digits >= 5
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ' | '.'))
}
