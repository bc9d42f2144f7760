use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Field name -> distinct backend type names reported for that field
pub type FieldCapabilities = BTreeMap<String, BTreeSet<String>>;

/// Field name -> normalized category, ordered by field name
pub type NormalizedFieldMap = BTreeMap<String, FieldCategory>;

/// Canonical application-level field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizedType {
    String,
    Number,
    Date,
    Boolean,
    Null,
}

impl NormalizedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

impl std::fmt::Display for NormalizedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a single field resolves to
///
/// Serialized as a bare string: the normalized type name, `"conflict"` or
/// `"unsupported"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    Type(NormalizedType),
    /// The backend reports more than one type for the field
    Conflict,
    /// The backend type has no normalization rule
    Unsupported,
}

impl FieldCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type(t) => t.as_str(),
            Self::Conflict => "conflict",
            Self::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let category = match s {
            "string" => Self::Type(NormalizedType::String),
            "number" => Self::Type(NormalizedType::Number),
            "date" => Self::Type(NormalizedType::Date),
            "boolean" => Self::Type(NormalizedType::Boolean),
            "null" => Self::Type(NormalizedType::Null),
            "conflict" => Self::Conflict,
            "unsupported" => Self::Unsupported,
            other => return Err(format!("unknown field category: {}", other)),
        };
        Ok(category)
    }
}

impl Serialize for FieldCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
