use serde::{Deserialize, Serialize};

///
/// IdStrategy
///
/// How a new record of an entry type obtains its identifier. A closed
/// tagged union with per-variant payload; exactly one strategy is bound
/// per entry type.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IdStrategy {
    /// Integer identifiers. With `auto_increment`, the engine reserves
    /// the next value from a per-type counter; otherwise the caller
    /// supplies the id.
    Number { auto_increment: bool },

    /// Random version-4 UUID. Collision probability is treated as
    /// negligible; no uniqueness check is performed.
    Uuid,

    /// Random identifier of exactly `hash_length` characters from a
    /// fixed alphabet, retried on collision up to a bounded count.
    Hash { hash_length: u32 },

    /// Monotonic counter owned by storage.
    Series,

    /// Stable hash derived from the named field values. Identical
    /// inputs always yield the identical id.
    Data { fields: Vec<String> },

    /// Verbatim copy of the named field's value.
    Field { field: String },
}

impl IdStrategy {
    /// The original framework's default: 16-character hash ids.
    pub const DEFAULT_HASH_LENGTH: u32 = 16;

    /// Field keys this strategy reads at generation time.
    #[must_use]
    pub fn source_fields(&self) -> &[String] {
        match self {
            Self::Data { fields } => fields,
            Self::Field { field } => std::slice::from_ref(field),
            _ => &[],
        }
    }
}

impl Default for IdStrategy {
    fn default() -> Self {
        Self::Hash {
            hash_length: Self::DEFAULT_HASH_LENGTH,
        }
    }
}
