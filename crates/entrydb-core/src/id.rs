use crate::store::Storage;
use entrydb_schema::{entry::EntryType, id::IdStrategy, record::EntryRecord, value::Value};
use rand::Rng;
use thiserror::Error as ThisError;
use xxhash_rust::xxh3::xxh3_64;

/// Alphabet for `hash`-strategy identifiers. Lowercase alphanumerics,
/// URL-safe.
const HASH_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Bounded retry budget for hash-id collisions. Exceeding it surfaces
/// [`IdError::Exhausted`]; the whole create is safe to retry.
pub const HASH_ID_MAX_ATTEMPTS: u32 = 8;

///
/// IdError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum IdError {
    #[error("hash id generation exhausted {attempts} attempts without a free id")]
    Exhausted { attempts: u32 },

    #[error("id strategy reads field '{field}', which is empty at creation time")]
    MissingSourceField { field: String },

    #[error("number strategy without auto_increment requires a caller-supplied id")]
    MissingValue,

    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

/// Assign an identifier for a record about to be inserted.
///
/// `record` holds the final (coerced, defaulted) field values, so the
/// `data` and `field` strategies see what will actually be persisted.
/// `supplied` is a caller-provided id, honored only by the non-auto
/// `number` strategy.
pub fn generate_id(
    entry_type: &EntryType,
    record: &EntryRecord,
    supplied: Option<&str>,
    store: &dyn Storage,
) -> Result<String, IdError> {
    let table = &entry_type.config.table_name;

    match &entry_type.config.id_strategy {
        IdStrategy::Number { auto_increment } => {
            if *auto_increment {
                Ok(store.next_counter(table)?.to_string())
            } else {
                supplied
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
                    .ok_or(IdError::MissingValue)
            }
        }

        IdStrategy::Uuid => Ok(uuid::Uuid::new_v4().to_string()),

        IdStrategy::Hash { hash_length } => hash_id(store, table, *hash_length),

        IdStrategy::Series => Ok(store.next_counter(table)?.to_string()),

        IdStrategy::Data { fields } => data_id(record, fields),

        IdStrategy::Field { field } => {
            let value = record.get(field);
            if value.is_empty() {
                return Err(IdError::MissingSourceField {
                    field: field.clone(),
                });
            }

            Ok(value.to_key_string())
        }
    }
}

/// Random fixed-length id with a bounded collision-retry loop.
fn hash_id(store: &dyn Storage, table: &str, length: u32) -> Result<String, IdError> {
    for attempt in 0..HASH_ID_MAX_ATTEMPTS {
        let candidate = random_hash(length);

        if !store.exists(table, &candidate)? {
            return Ok(candidate);
        }

        tracing::warn!(table, attempt, "hash id collision, retrying");
    }

    Err(IdError::Exhausted {
        attempts: HASH_ID_MAX_ATTEMPTS,
    })
}

fn random_hash(length: u32) -> String {
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| HASH_ID_ALPHABET[rng.gen_range(0..HASH_ID_ALPHABET.len())] as char)
        .collect()
}

/// Deterministic id from the declared source field values: a stable
/// xxh3-64 over the canonical renderings, as fixed-width hex. Identical
/// inputs always yield the identical id.
fn data_id(record: &EntryRecord, fields: &[String]) -> Result<String, IdError> {
    let mut buf = String::new();

    for field in fields {
        let value = record.get(field);
        if matches!(value, Value::Null) {
            return Err(IdError::MissingSourceField {
                field: field.clone(),
            });
        }

        buf.push_str(field);
        buf.push('\u{1f}');
        buf.push_str(&value.to_key_string());
        buf.push('\u{1e}');
    }

    Ok(format!("{:016x}", xxh3_64(buf.as_bytes())))
}

///
/// TESTS
///
