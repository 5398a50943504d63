use super::{
    Columns, CountOptions, DEFAULT_LIMIT, FilterValue, ListOptions, ListResult, ReportOptions,
    ReportResult, filter,
};
use crate::error::QueryError;
use entrydb_schema::{
    entry::EntryType,
    field::FieldDefinition,
    record::EntryRecord,
    types::{FieldType, OrderDirection},
    value::Value,
};
use std::collections::BTreeMap;

/// System columns present on every record alongside declared fields.
const SYSTEM_COLUMNS: [(&str, FieldType); 3] = [
    ("id", FieldType::Id),
    ("created_at", FieldType::Timestamp),
    ("updated_at", FieldType::Timestamp),
];

/// Evaluate a list query over one snapshot of a type's rows.
///
/// Pipeline: predicate filter, total count, order (ties broken by id
/// ascending), offset/limit window, column projection.
pub fn list(
    entry_type: &EntryType,
    mut rows: Vec<EntryRecord>,
    options: &ListOptions,
) -> Result<ListResult, QueryError> {
    rows = apply_filters(entry_type, rows, &options.filter, &options.or_filter)?;

    let total_count = rows.len();

    order_rows(
        entry_type,
        &mut rows,
        options.order_by.as_deref(),
        options.order,
    )?;

    let limit = options.limit.unwrap_or(DEFAULT_LIMIT);
    let rows: Vec<EntryRecord> = rows
        .into_iter()
        .skip(options.offset)
        .take(limit)
        .collect();

    let columns = resolve_columns(entry_type, &options.columns)?;
    let data: Vec<EntryRecord> = rows
        .into_iter()
        .map(|record| project(record, &columns))
        .collect();

    tracing::debug!(
        entry_type = entry_type.name,
        rows = data.len(),
        total_count,
        "list"
    );

    Ok(ListResult {
        row_count: data.len(),
        total_count,
        data,
        columns,
    })
}

/// Evaluate a report: a list with optional `group_by` partitioning and
/// `count` aggregation in place of row projection.
pub fn report(
    entry_type: &EntryType,
    mut rows: Vec<EntryRecord>,
    options: &ReportOptions,
) -> Result<ReportResult, QueryError> {
    rows = apply_filters(entry_type, rows, &options.filter, &options.or_filter)?;

    if let Some(group_key) = options.group_by.as_deref() {
        return grouped(entry_type, rows, group_key, options);
    }

    if options.count {
        let total = rows.len();
        let row = BTreeMap::from([("count".to_string(), Value::Int(int_count(total)))]);

        return Ok(ReportResult {
            row_count: 1,
            total_count: total,
            data: vec![row],
            columns: vec!["count".to_string()],
        });
    }

    // Plain projection path, as `list` but with loose rows.
    let list_options = ListOptions {
        columns: options.columns.clone(),
        filter: BTreeMap::new(),
        or_filter: BTreeMap::new(),
        limit: options.limit,
        offset: options.offset,
        order_by: options.order_by.clone(),
        order: options.order,
    };
    let listed = list(entry_type, rows, &list_options)?;

    Ok(ReportResult {
        row_count: listed.row_count,
        total_count: listed.total_count,
        data: listed.data.iter().map(|r| to_row(r, &listed.columns)).collect(),
        columns: listed.columns,
    })
}

/// Count the records matching the filter groups.
pub fn count(
    entry_type: &EntryType,
    rows: Vec<EntryRecord>,
    options: &CountOptions,
) -> Result<usize, QueryError> {
    Ok(apply_filters(entry_type, rows, &options.filter, &options.or_filter)?.len())
}

// -- filtering

/// `(AND-group) AND (OR-group)`; an empty group is neutral.
fn apply_filters(
    entry_type: &EntryType,
    rows: Vec<EntryRecord>,
    and_group: &BTreeMap<String, FilterValue>,
    or_group: &BTreeMap<String, FilterValue>,
) -> Result<Vec<EntryRecord>, QueryError> {
    // Validate filter keys up front so an unknown column fails even on
    // an empty data set.
    for key in and_group.keys().chain(or_group.keys()) {
        column_type(entry_type, key)?;
    }

    let mut kept = Vec::with_capacity(rows.len());

    for record in rows {
        if matches_record(entry_type, &record, and_group, or_group)? {
            kept.push(record);
        }
    }

    Ok(kept)
}

fn matches_record(
    entry_type: &EntryType,
    record: &EntryRecord,
    and_group: &BTreeMap<String, FilterValue>,
    or_group: &BTreeMap<String, FilterValue>,
) -> Result<bool, QueryError> {
    for (key, filter) in and_group {
        if !matches_one(entry_type, record, key, filter)? {
            return Ok(false);
        }
    }

    if or_group.is_empty() {
        return Ok(true);
    }

    for (key, filter) in or_group {
        if matches_one(entry_type, record, key, filter)? {
            return Ok(true);
        }
    }

    Ok(false)
}

fn matches_one(
    entry_type: &EntryType,
    record: &EntryRecord,
    key: &str,
    filter: &FilterValue,
) -> Result<bool, QueryError> {
    let def = column_def(entry_type, key)?;
    let actual = column_value(record, key);

    filter::matches(&def, &actual, filter)
}

// -- ordering

fn order_rows(
    entry_type: &EntryType,
    rows: &mut [EntryRecord],
    order_by: Option<&str>,
    order: Option<OrderDirection>,
) -> Result<(), QueryError> {
    // Default: the type's configured order field, else the id.
    let key = order_by
        .or(entry_type.config.order_field.as_deref())
        .unwrap_or("id");
    let direction = order.unwrap_or_else(|| {
        if order_by.is_none() && entry_type.config.order_field.is_some() {
            entry_type.config.order_direction
        } else {
            OrderDirection::default()
        }
    });

    column_type(entry_type, key)?;

    rows.sort_by(|a, b| {
        let ordering = column_value(a, key).cmp_for_sort(&column_value(b, key));
        let ordering = match direction {
            OrderDirection::Asc => ordering,
            OrderDirection::Desc => ordering.reverse(),
        };

        // Deterministic tie-break: id ascending, regardless of direction.
        ordering.then_with(|| a.id.cmp(&b.id))
    });

    Ok(())
}

// -- grouping

fn grouped(
    entry_type: &EntryType,
    rows: Vec<EntryRecord>,
    group_key: &str,
    options: &ReportOptions,
) -> Result<ReportResult, QueryError> {
    // Validates the column even when only counting.
    column_type(entry_type, group_key)?;

    let total_count = rows.len();

    // Canonical group key: the value's key rendering, so "2" and 2
    // land in the same bucket. Buckets keep a representative value for
    // ordering.
    let mut buckets: BTreeMap<String, (Value, usize)> = BTreeMap::new();
    for record in &rows {
        let value = column_value(record, group_key);
        let entry = buckets
            .entry(value.to_key_string())
            .or_insert_with(|| (value.clone(), 0));
        entry.1 += 1;
    }

    let mut groups: Vec<(Value, usize)> = buckets.into_values().collect();
    groups.sort_by(|a, b| a.0.cmp_for_sort(&b.0));

    let data: Vec<BTreeMap<String, Value>> = if options.count {
        groups
            .into_iter()
            .map(|(value, n)| {
                BTreeMap::from([
                    (group_key.to_string(), value),
                    ("count".to_string(), Value::Int(int_count(n))),
                ])
            })
            .collect()
    } else {
        groups
            .into_iter()
            .map(|(value, _)| BTreeMap::from([(group_key.to_string(), value)]))
            .collect()
    };

    let mut columns = vec![group_key.to_string()];
    if options.count {
        columns.push("count".to_string());
    }

    Ok(ReportResult {
        row_count: data.len(),
        total_count,
        data,
        columns,
    })
}

// -- columns and projection

/// Resolve a column key to its field type; system columns are always
/// available.
fn column_type(entry_type: &EntryType, key: &str) -> Result<FieldType, QueryError> {
    if let Some((_, ty)) = SYSTEM_COLUMNS.iter().find(|(name, _)| *name == key) {
        return Ok(*ty);
    }

    entry_type
        .field(key)
        .map(|f| f.field_type)
        .ok_or_else(|| QueryError::UnknownColumn {
            column: key.to_string(),
        })
}

/// A field definition for filter evaluation; synthesized for system
/// columns.
fn column_def(entry_type: &EntryType, key: &str) -> Result<FieldDefinition, QueryError> {
    if let Some(def) = entry_type.field(key) {
        return Ok(def.clone());
    }

    let ty = column_type(entry_type, key)?;
    Ok(FieldDefinition::new(key, ty))
}

fn column_value(record: &EntryRecord, key: &str) -> Value {
    match key {
        "id" => Value::Text(record.id.clone()),
        "created_at" => Value::Timestamp(record.created_at),
        "updated_at" => Value::Timestamp(record.updated_at),
        _ => record.get(key).clone(),
    }
}

fn resolve_columns(entry_type: &EntryType, columns: &Columns) -> Result<Vec<String>, QueryError> {
    match columns {
        Columns::All => Ok(std::iter::once("id".to_string())
            .chain(entry_type.fields.iter().map(|f| f.key.clone()))
            .collect()),
        Columns::Keys(keys) => {
            for key in keys {
                column_type(entry_type, key)?;
            }
            Ok(keys.clone())
        }
    }
}

/// Restrict a record's field map to the projected columns. Identity and
/// timestamps survive projection; they live outside the field map.
fn project(mut record: EntryRecord, columns: &[String]) -> EntryRecord {
    record
        .fields
        .retain(|key, _| columns.iter().any(|c| c == key));
    record
}

fn to_row(record: &EntryRecord, columns: &[String]) -> BTreeMap<String, Value> {
    columns
        .iter()
        .map(|key| (key.clone(), column_value(record, key)))
        .collect()
}

#[allow(clippy::cast_possible_wrap)]
const fn int_count(n: usize) -> i64 {
    n as i64
}
