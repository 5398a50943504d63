use crate::error::QueryError;
use derive_more::Display;
use entrydb_schema::{field::FieldDefinition, registry, value::Value};
use std::cmp::Ordering;
use std::str::FromStr;

///
/// FilterOp
///
/// Non-equality predicate operators. String operators (`contains`,
/// `notContains`, `startsWith`, `endsWith`) match ASCII
/// case-insensitively; equality and membership operators are exact.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum FilterOp {
    #[display("between")]
    Between,
    #[display("contains")]
    Contains,
    #[display("endsWith")]
    EndsWith,
    #[display("=")]
    Equal,
    #[display(">")]
    GreaterThan,
    #[display(">=")]
    GreaterThanOrEqual,
    #[display("inList")]
    InList,
    #[display("is")]
    Is,
    #[display("isEmpty")]
    IsEmpty,
    #[display("isNot")]
    IsNot,
    #[display("isNotEmpty")]
    IsNotEmpty,
    #[display("<")]
    LessThan,
    #[display("<=")]
    LessThanOrEqual,
    #[display("notBetween")]
    NotBetween,
    #[display("notContains")]
    NotContains,
    #[display("!=")]
    NotEqual,
    #[display("notInList")]
    NotInList,
    #[display("startsWith")]
    StartsWith,
}

impl FromStr for FilterOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "contains" => Self::Contains,
            "notContains" => Self::NotContains,
            "inList" => Self::InList,
            "notInList" => Self::NotInList,
            "between" => Self::Between,
            "notBetween" => Self::NotBetween,
            "is" => Self::Is,
            "isNot" => Self::IsNot,
            "isEmpty" => Self::IsEmpty,
            "isNotEmpty" => Self::IsNotEmpty,
            "startsWith" => Self::StartsWith,
            "endsWith" => Self::EndsWith,
            "greaterThan" | ">" => Self::GreaterThan,
            "lessThan" | "<" => Self::LessThan,
            "greaterThanOrEqual" | ">=" => Self::GreaterThanOrEqual,
            "lessThanOrEqual" | "<=" => Self::LessThanOrEqual,
            "equal" | "=" => Self::Equal,
            "!=" => Self::NotEqual,
            other => return Err(format!("unknown filter operator '{other}'")),
        };

        Ok(op)
    }
}

///
/// AdvancedFilter
///

#[derive(Clone, Debug, PartialEq)]
pub struct AdvancedFilter {
    pub op: FilterOp,
    pub value: Value,
}

///
/// FilterValue
///
/// One filter entry: a direct equality value or an operator/value pair.
///

#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Equals(Value),
    Advanced(AdvancedFilter),
}

impl FilterValue {
    #[must_use]
    pub const fn advanced(op: FilterOp, value: Value) -> Self {
        Self::Advanced(AdvancedFilter { op, value })
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        Self::Equals(value)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Equals(Value::from(s))
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Equals(Value::from(s))
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Equals(Value::from(n))
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Equals(Value::from(b))
    }
}

impl From<AdvancedFilter> for FilterValue {
    fn from(filter: AdvancedFilter) -> Self {
        Self::Advanced(filter)
    }
}

/// Evaluate one filter entry against a field's runtime value.
pub(crate) fn matches(
    def: &FieldDefinition,
    actual: &Value,
    filter: &FilterValue,
) -> Result<bool, QueryError> {
    match filter {
        FilterValue::Equals(operand) => {
            let operand = coerce_operand(def, operand, FilterOp::Equal)?;
            Ok(actual.loose_eq(&operand))
        }
        FilterValue::Advanced(advanced) => eval_op(def, actual, advanced.op, &advanced.value),
    }
}

fn eval_op(
    def: &FieldDefinition,
    actual: &Value,
    op: FilterOp,
    operand: &Value,
) -> Result<bool, QueryError> {
    match op {
        FilterOp::IsEmpty => Ok(actual.is_empty()),
        FilterOp::IsNotEmpty => Ok(!actual.is_empty()),

        FilterOp::Is | FilterOp::Equal => {
            let operand = coerce_operand(def, operand, op)?;
            Ok(actual.loose_eq(&operand))
        }
        FilterOp::IsNot | FilterOp::NotEqual => {
            let operand = coerce_operand(def, operand, op)?;
            Ok(!actual.loose_eq(&operand))
        }

        FilterOp::Contains => text_match(def, actual, operand, op, |h, n| h.contains(n)),
        FilterOp::NotContains => {
            text_match(def, actual, operand, op, |h, n| h.contains(n)).map(|hit| !hit)
        }
        FilterOp::StartsWith => text_match(def, actual, operand, op, |h, n| h.starts_with(n)),
        FilterOp::EndsWith => text_match(def, actual, operand, op, |h, n| h.ends_with(n)),

        FilterOp::InList => in_list(def, actual, operand, op),
        FilterOp::NotInList => in_list(def, actual, operand, op).map(|hit| !hit),

        FilterOp::Between => between(def, actual, operand, op),
        FilterOp::NotBetween => between(def, actual, operand, op).map(|hit| !hit),

        FilterOp::GreaterThan => ordered(def, actual, operand, op, Ordering::is_gt),
        FilterOp::LessThan => ordered(def, actual, operand, op, Ordering::is_lt),
        FilterOp::GreaterThanOrEqual => ordered(def, actual, operand, op, Ordering::is_ge),
        FilterOp::LessThanOrEqual => ordered(def, actual, operand, op, Ordering::is_le),
    }
}

/// Coerce a filter operand into the field's native shape; failure is a
/// filter type mismatch, not a validation error.
fn coerce_operand(
    def: &FieldDefinition,
    operand: &Value,
    op: FilterOp,
) -> Result<Value, QueryError> {
    registry::coerce(def.field_type, operand.clone()).map_err(|_| QueryError::FilterTypeMismatch {
        field: def.key.clone(),
        field_type: def.field_type,
        op,
    })
}

fn text_match(
    def: &FieldDefinition,
    actual: &Value,
    operand: &Value,
    op: FilterOp,
    pred: impl Fn(&str, &str) -> bool,
) -> Result<bool, QueryError> {
    if !def.field_type.is_text_like() {
        return Err(QueryError::FilterTypeMismatch {
            field: def.key.clone(),
            field_type: def.field_type,
            op,
        });
    }

    let Some(needle) = operand.as_text() else {
        return Err(QueryError::InvalidOperand {
            op,
            expected: "a string operand",
        });
    };

    // Documented policy: ASCII case-insensitive.
    let haystack = actual.as_text().unwrap_or_default().to_ascii_lowercase();
    Ok(pred(&haystack, &needle.to_ascii_lowercase()))
}

fn in_list(
    def: &FieldDefinition,
    actual: &Value,
    operand: &Value,
    op: FilterOp,
) -> Result<bool, QueryError> {
    let Some(candidates) = operand.as_list() else {
        return Err(QueryError::InvalidOperand {
            op,
            expected: "a sequence operand",
        });
    };

    for candidate in candidates {
        if actual.loose_eq(&coerce_operand(def, candidate, op)?) {
            return Ok(true);
        }
    }

    Ok(false)
}

fn between(
    def: &FieldDefinition,
    actual: &Value,
    operand: &Value,
    op: FilterOp,
) -> Result<bool, QueryError> {
    let bounds = operand.as_list().filter(|items| items.len() == 2).ok_or(
        QueryError::InvalidOperand {
            op,
            expected: "a two-element [low, high] range",
        },
    )?;

    // A null field value falls in no range.
    if actual.is_null() {
        return Ok(false);
    }

    let low = compare(def, actual, &bounds[0], op)?;
    let high = compare(def, actual, &bounds[1], op)?;

    // Inclusive on both ends.
    Ok(low.is_ge() && high.is_le())
}

fn ordered(
    def: &FieldDefinition,
    actual: &Value,
    operand: &Value,
    op: FilterOp,
    pred: impl Fn(Ordering) -> bool,
) -> Result<bool, QueryError> {
    if actual.is_null() {
        return Ok(false);
    }

    compare(def, actual, operand, op).map(pred)
}

fn compare(
    def: &FieldDefinition,
    actual: &Value,
    operand: &Value,
    op: FilterOp,
) -> Result<Ordering, QueryError> {
    let mismatch = || QueryError::FilterTypeMismatch {
        field: def.key.clone(),
        field_type: def.field_type,
        op,
    };

    if !def.field_type.supports_ordering() {
        return Err(mismatch());
    }

    let operand = coerce_operand(def, operand, op)?;

    actual.partial_compare(&operand).ok_or_else(mismatch)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use entrydb_schema::types::FieldType;

    fn text_field() -> FieldDefinition {
        FieldDefinition::new("name", FieldType::Text)
    }

    fn int_field() -> FieldDefinition {
        FieldDefinition::new("score", FieldType::Int)
    }

    #[test]
    fn symbolic_aliases_parse_to_the_same_ops() {
        assert_eq!(">".parse::<FilterOp>().unwrap(), FilterOp::GreaterThan);
        assert_eq!(
            "greaterThan".parse::<FilterOp>().unwrap(),
            FilterOp::GreaterThan
        );
        assert_eq!("=".parse::<FilterOp>().unwrap(), FilterOp::Equal);
        assert_eq!("equal".parse::<FilterOp>().unwrap(), FilterOp::Equal);
        assert!("~".parse::<FilterOp>().is_err());
    }

    #[test]
    fn contains_is_case_insensitive() {
        let def = text_field();
        let actual = Value::Text("Deep Thought".into());

        let hit = eval_op(&def, &actual, FilterOp::Contains, &Value::Text("thought".into()));
        assert_eq!(hit, Ok(true));

        let miss = eval_op(&def, &actual, FilterOp::Contains, &Value::Text("shallow".into()));
        assert_eq!(miss, Ok(false));
    }

    #[test]
    fn starts_and_ends_with_respect_affixes() {
        let def = text_field();
        let actual = Value::Text("report-2024.pdf".into());

        assert_eq!(
            eval_op(&def, &actual, FilterOp::StartsWith, &Value::Text("REPORT".into())),
            Ok(true)
        );
        assert_eq!(
            eval_op(&def, &actual, FilterOp::EndsWith, &Value::Text(".pdf".into())),
            Ok(true)
        );
        assert_eq!(
            eval_op(&def, &actual, FilterOp::EndsWith, &Value::Text(".csv".into())),
            Ok(false)
        );
    }

    #[test]
    fn contains_on_an_int_field_is_a_type_mismatch() {
        let def = int_field();
        let err = eval_op(
            &def,
            &Value::Int(5),
            FilterOp::Contains,
            &Value::Text("5".into()),
        )
        .unwrap_err();

        assert!(matches!(err, QueryError::FilterTypeMismatch { .. }));
    }

    #[test]
    fn between_is_inclusive_on_both_ends() {
        let def = int_field();
        let range = Value::List(vec![Value::Int(10), Value::Int(20)]);

        for (n, expected) in [(9, false), (10, true), (15, true), (20, true), (21, false)] {
            assert_eq!(
                eval_op(&def, &Value::Int(n), FilterOp::Between, &range),
                Ok(expected),
                "between check failed for {n}"
            );
        }
    }

    #[test]
    fn between_on_a_null_field_never_matches() {
        let def = int_field();
        let range = Value::List(vec![Value::Int(10), Value::Int(20)]);

        assert_eq!(
            eval_op(&def, &Value::Null, FilterOp::Between, &range),
            Ok(false)
        );
        assert_eq!(
            eval_op(&def, &Value::Null, FilterOp::NotBetween, &range),
            Ok(true)
        );
    }

    #[test]
    fn between_requires_a_two_element_range() {
        let def = int_field();
        let err = eval_op(
            &def,
            &Value::Int(5),
            FilterOp::Between,
            &Value::List(vec![Value::Int(1)]),
        )
        .unwrap_err();

        assert!(matches!(err, QueryError::InvalidOperand { .. }));
    }

    #[test]
    fn in_list_tests_membership() {
        let def = int_field();
        let candidates = Value::List(vec![Value::Int(1), Value::Int(3)]);

        assert_eq!(
            eval_op(&def, &Value::Int(3), FilterOp::InList, &candidates),
            Ok(true)
        );
        assert_eq!(
            eval_op(&def, &Value::Int(2), FilterOp::InList, &candidates),
            Ok(false)
        );
        assert_eq!(
            eval_op(&def, &Value::Int(2), FilterOp::NotInList, &candidates),
            Ok(true)
        );
    }

    #[test]
    fn is_and_is_not_are_null_aware() {
        let def = text_field();

        assert_eq!(
            eval_op(&def, &Value::Null, FilterOp::Is, &Value::Null),
            Ok(true)
        );
        assert_eq!(
            eval_op(&def, &Value::Text("x".into()), FilterOp::IsNot, &Value::Null),
            Ok(true)
        );
    }

    #[test]
    fn comparisons_coerce_numeric_strings() {
        let def = int_field();

        assert_eq!(
            eval_op(&def, &Value::Int(15), FilterOp::GreaterThan, &Value::Text("10".into())),
            Ok(true)
        );
    }

    #[test]
    fn comparisons_on_null_never_match() {
        let def = int_field();

        assert_eq!(
            eval_op(&def, &Value::Null, FilterOp::LessThan, &Value::Int(10)),
            Ok(false)
        );
    }
}
