use super::types::NormalizedType;
use std::collections::HashMap;

/// A backend type name that has no normalization rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported field type: {0}")]
pub struct UnsupportedType(pub String);

/// Maps backend-specific type identifiers to canonical types
pub trait TypeNormalizer: Send + Sync {
    fn normalize(&self, backend_type: &str) -> Result<NormalizedType, UnsupportedType>;
}

const STRING_TYPES: &[&str] = &[
    "string",
    "text",
    "keyword",
    "_type",
    "_id",
    "_index",
    "geo_point",
];

const NUMBER_TYPES: &[&str] = &[
    "float",
    "half_float",
    "scaled_float",
    "double",
    "integer",
    "long",
    "short",
    "byte",
    "float_range",
    "double_range",
    "integer_range",
    "long_range",
];

const DATE_TYPES: &[&str] = &["date", "datetime", "date_range"];

const BOOLEAN_TYPES: &[&str] = &["boolean"];

const NULL_TYPES: &[&str] = &["null"];

/// Lookup table from Elasticsearch type names to [`NormalizedType`]
///
/// Matching is exact; Elasticsearch reports type names in lowercase.
#[derive(Debug, Clone)]
pub struct TypeTable {
    entries: HashMap<String, NormalizedType>,
}

impl TypeTable {
    /// The built-in Elasticsearch mapping
    pub fn builtin() -> Self {
        let groups: [(&[&str], NormalizedType); 5] = [
            (STRING_TYPES, NormalizedType::String),
            (NUMBER_TYPES, NormalizedType::Number),
            (DATE_TYPES, NormalizedType::Date),
            (BOOLEAN_TYPES, NormalizedType::Boolean),
            (NULL_TYPES, NormalizedType::Null),
        ];

        let entries = groups
            .iter()
            .flat_map(|(names, normalized)| {
                names.iter().map(move |name| (name.to_string(), *normalized))
            })
            .collect();

        Self { entries }
    }

    /// Add or replace rules. Overrides win over built-in entries.
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, NormalizedType)>,
    {
        self.entries.extend(overrides);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TypeNormalizer for TypeTable {
    fn normalize(&self, backend_type: &str) -> Result<NormalizedType, UnsupportedType> {
        self.entries
            .get(backend_type)
            .copied()
            .ok_or_else(|| UnsupportedType(backend_type.to_string()))
    }
}
