use crate::types::ValueTag;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

///
/// Value
///
/// The tagged runtime value union. Records hold only these shapes; the
/// open `any`-typed record shape is rejected at the engine boundary.
///
/// Timestamps are epoch milliseconds. Decimal is an `f64`; callers that
/// need exactness should prefer `Int`/`BigInt` fields.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    BigInt(i128),
    Decimal(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(i64),
    Json(serde_json::Value),
    List(Vec<Value>),
}

impl Value {
    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        match self {
            Self::Null => ValueTag::Null,
            Self::Bool(_) => ValueTag::Bool,
            Self::Int(_) => ValueTag::Int,
            Self::BigInt(_) => ValueTag::BigInt,
            Self::Decimal(_) => ValueTag::Decimal,
            Self::Text(_) => ValueTag::Text,
            Self::Date(_) => ValueTag::Date,
            Self::Timestamp(_) => ValueTag::Timestamp,
            Self::Json(_) => ValueTag::Json,
            Self::List(_) => ValueTag::List,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null, empty string, or empty list. The `isEmpty` filter notion.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Compare two values within a comparison family.
    ///
    /// Returns `None` when the operands are not comparable (different
    /// non-numeric families, or Json/List operands); the query layer
    /// surfaces that as a filter type mismatch. Numeric tags compare
    /// across representations.
    #[must_use]
    pub fn partial_compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (a, b) if a.tag().is_numeric() && b.tag().is_numeric() => {
                Some(numeric_cmp(a, b))
            }
            _ => None,
        }
    }

    /// Total order used for row sorting: nulls first, then per-family
    /// comparison, then tag name as a last resort for mixed columns.
    #[must_use]
    pub fn cmp_for_sort(&self, other: &Self) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }

        self.partial_compare(other)
            .unwrap_or_else(|| format!("{:?}", self.tag()).cmp(&format!("{:?}", other.tag())))
    }

    /// Null-aware equality used by the `is`/`isNot` operators and direct
    /// equality filters. Numeric values compare across representations.
    #[must_use]
    pub fn loose_eq(&self, other: &Self) -> bool {
        if self.is_null() || other.is_null() {
            return self.is_null() && other.is_null();
        }

        self.partial_compare(other)
            .map_or_else(|| self == other, Ordering::is_eq)
    }

    /// Canonical text rendering, used for choice-key matching, `field`
    /// identifier strategies, and group keys.
    #[must_use]
    pub fn to_key_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::BigInt(n) => n.to_string(),
            Self::Decimal(d) => d.to_string(),
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.to_string(),
            Self::Timestamp(ts) => ts.to_string(),
            Self::Json(j) => j.to_string(),
            Self::List(items) => items
                .iter()
                .map(Self::to_key_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Self::Decimal(d)
    }
}

/// Cross-representation numeric comparison. Decimal operands fall back
/// to `f64::total_cmp`; integer pairs compare exactly as `i128`.
fn numeric_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::BigInt(x), Value::BigInt(y)) => x.cmp(y),
        (Value::Int(x), Value::BigInt(y)) => i128::from(*x).cmp(y),
        (Value::BigInt(x), Value::Int(y)) => x.cmp(&i128::from(*y)),
        _ => as_f64(a).total_cmp(&as_f64(b)),
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Int(n) => *n as f64,
        Value::BigInt(n) => *n as f64,
        Value::Decimal(d) => *d,
        _ => f64::NAN,
    }
}

///
/// TESTS
///
