mod exec;
mod filter;

pub use exec::{count, list, report};
pub use filter::{AdvancedFilter, FilterOp, FilterValue};

use entrydb_schema::{record::EntryRecord, types::OrderDirection, value::Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// Default page size when `limit` is not set.
pub const DEFAULT_LIMIT: usize = 100;

///
/// Columns
///
/// Projection selector: everything, or an explicit set of declared
/// field keys.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Columns {
    #[default]
    All,
    Keys(Vec<String>),
}

impl Columns {
    #[must_use]
    pub fn keys(keys: &[&str]) -> Self {
        Self::Keys(keys.iter().map(ToString::to_string).collect())
    }
}

///
/// ListOptions
///
/// Query input for `list`. `filter` entries are AND-combined,
/// `or_filter` entries are OR-combined with each other, and the two
/// groups combine as `filter AND or_filter`; an empty group is neutral.
///

#[derive(Clone, Debug, Default)]
pub struct ListOptions {
    pub columns: Columns,
    pub filter: BTreeMap<String, FilterValue>,
    pub or_filter: BTreeMap<String, FilterValue>,
    pub limit: Option<usize>,
    pub offset: usize,
    pub order_by: Option<String>,
    pub order: Option<OrderDirection>,
}

impl ListOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn columns(mut self, columns: Columns) -> Self {
        self.columns = columns;
        self
    }

    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn or_filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.or_filter.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn order_by(mut self, key: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by = Some(key.into());
        self.order = Some(direction);
        self
    }
}

///
/// ReportOptions
///
/// `list` input plus grouping/counting. `group_by` partitions the
/// matching set by a field's value; `count` replaces row projection
/// with per-group (or overall) row counts.
///

#[derive(Clone, Debug, Default)]
pub struct ReportOptions {
    pub columns: Columns,
    pub filter: BTreeMap<String, FilterValue>,
    pub or_filter: BTreeMap<String, FilterValue>,
    pub limit: Option<usize>,
    pub offset: usize,
    pub order_by: Option<String>,
    pub order: Option<OrderDirection>,
    pub group_by: Option<String>,
    pub count: bool,
}

impl ReportOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn or_filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.or_filter.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn group_by(mut self, key: impl Into<String>) -> Self {
        self.group_by = Some(key.into());
        self
    }

    #[must_use]
    pub const fn counting(mut self) -> Self {
        self.count = true;
        self
    }
}

///
/// CountOptions
///

#[derive(Clone, Debug, Default)]
pub struct CountOptions {
    pub filter: BTreeMap<String, FilterValue>,
    pub or_filter: BTreeMap<String, FilterValue>,
}

impl CountOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn or_filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.or_filter.insert(key.into(), value.into());
        self
    }
}

///
/// ListResult
///
/// `row_count` is the page size actually returned; `total_count` always
/// reflects the full matching set irrespective of limit/offset.
///

#[derive(Clone, Debug, Serialize)]
pub struct ListResult {
    pub row_count: usize,
    pub total_count: usize,
    pub data: Vec<EntryRecord>,
    pub columns: Vec<String>,
}

///
/// ReportResult
///
/// Report rows are loose maps rather than records: grouping and
/// counting produce synthetic rows.
///

#[derive(Clone, Debug, Serialize)]
pub struct ReportResult {
    pub row_count: usize,
    pub total_count: usize,
    pub data: Vec<BTreeMap<String, Value>>,
    pub columns: Vec<String>,
}
