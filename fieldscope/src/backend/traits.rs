use async_trait::async_trait;

use crate::schema::FieldCapabilities;
use crate::Result;

/// Which fields to ask the backend about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldSelector {
    /// Wildcard, every field
    #[default]
    All,
    Named(Vec<String>),
}

impl FieldSelector {
    pub const WILDCARD: &'static str = "*";

    /// Build from raw names, dropping blanks. Nothing left means [`FieldSelector::All`].
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        if names.is_empty() {
            Self::All
        } else {
            Self::Named(names)
        }
    }

    /// Value for the backend's `fields` parameter
    pub fn as_param(&self) -> String {
        match self {
            Self::All => Self::WILDCARD.to_string(),
            Self::Named(names) => names.join(","),
        }
    }
}

impl std::fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_param())
    }
}

/// One field-capabilities lookup
#[derive(Clone, PartialEq, Eq)]
pub struct FieldCapsQuery {
    pub index: String,
    pub fields: FieldSelector,
    /// Caller credentials to run the query as, instead of the configured ones
    pub authorization: Option<String>,
}

impl FieldCapsQuery {
    pub fn new(index: impl Into<String>, fields: FieldSelector) -> Self {
        Self {
            index: index.into(),
            fields,
            authorization: None,
        }
    }

    pub fn with_authorization(mut self, authorization: Option<String>) -> Self {
        self.authorization = authorization;
        self
    }
}

impl std::fmt::Debug for FieldCapsQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCapsQuery")
            .field("index", &self.index)
            .field("fields", &self.fields)
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// A search backend that can report field capabilities
#[async_trait]
pub trait FieldCapsSource: Send + Sync {
    /// Issue a single field-capabilities query. No retries.
    async fn field_caps(&self, query: &FieldCapsQuery) -> Result<FieldCapabilities>;

    /// Human-readable source name
    fn source_name(&self) -> &str;
}
