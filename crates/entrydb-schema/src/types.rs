use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// FieldType
///
/// Closed set of declarable field types. Every tag maps to exactly one
/// native [`ValueTag`]; adding a tag here means extending that mapping.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum FieldType {
    /// Unbounded integer, stored as `i128`.
    BigInt,
    Boolean,
    /// Monetary amount; decimal at runtime.
    Currency,
    Date,
    Decimal,
    Email,
    /// Opaque record identifier.
    Id,
    /// Image URL.
    Image,
    Int,
    Json,
    /// Reference to a record of another entry type, stored as its id.
    Link,
    /// Long-form text, no length cap.
    LongText,
    MultiChoice,
    Password,
    Phone,
    RichText,
    SingleChoice,
    /// Free-form tag list.
    Tags,
    /// Short text, capped at 255 characters.
    Text,
    Timestamp,
    Url,
}

impl FieldType {
    /// The native runtime shape for values of this field type. Total.
    #[must_use]
    pub const fn native_tag(self) -> ValueTag {
        match self {
            Self::Boolean => ValueTag::Bool,
            Self::Int => ValueTag::Int,
            Self::BigInt => ValueTag::BigInt,
            Self::Currency | Self::Decimal => ValueTag::Decimal,
            Self::Date => ValueTag::Date,
            Self::Timestamp => ValueTag::Timestamp,
            Self::Json | Self::RichText => ValueTag::Json,
            Self::MultiChoice | Self::Tags => ValueTag::List,
            Self::Email
            | Self::Id
            | Self::Image
            | Self::Link
            | Self::LongText
            | Self::Password
            | Self::Phone
            | Self::SingleChoice
            | Self::Text
            | Self::Url => ValueTag::Text,
        }
    }

    #[must_use]
    pub const fn is_choice(self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultiChoice)
    }

    /// True for types whose values participate in range comparisons.
    #[must_use]
    pub const fn supports_ordering(self) -> bool {
        !matches!(self, Self::Json | Self::RichText | Self::MultiChoice | Self::Tags)
    }

    /// True for types subject to substring/prefix/suffix filter operators.
    #[must_use]
    pub const fn is_text_like(self) -> bool {
        matches!(self.native_tag(), ValueTag::Text)
    }
}

///
/// ValueTag
///
/// Runtime shape of a [`crate::value::Value`], used for mapping field
/// types to native shapes and for filter type checks.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum ValueTag {
    BigInt,
    Bool,
    Date,
    Decimal,
    Int,
    Json,
    List,
    Null,
    Text,
    Timestamp,
}

impl ValueTag {
    /// Tags that share the numeric comparison family.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::BigInt | Self::Decimal)
    }
}

///
/// OrderDirection
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    #[display("asc")]
    Asc,
    #[display("desc")]
    Desc,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_type_has_a_native_tag() {
        // Spot checks on both ends of the mapping; the match itself is
        // exhaustive so a new tag without a mapping fails to compile.
        assert_eq!(FieldType::Int.native_tag(), ValueTag::Int);
        assert_eq!(FieldType::Currency.native_tag(), ValueTag::Decimal);
        assert_eq!(FieldType::Tags.native_tag(), ValueTag::List);
        assert_eq!(FieldType::RichText.native_tag(), ValueTag::Json);
        assert_eq!(FieldType::Url.native_tag(), ValueTag::Text);
    }

    #[test]
    fn choice_predicate_covers_both_choice_types() {
        assert!(FieldType::SingleChoice.is_choice());
        assert!(FieldType::MultiChoice.is_choice());
        assert!(!FieldType::Text.is_choice());
    }

    #[test]
    fn json_like_types_do_not_support_ordering() {
        assert!(!FieldType::Json.supports_ordering());
        assert!(!FieldType::MultiChoice.supports_ordering());
        assert!(FieldType::Timestamp.supports_ordering());
    }
}
