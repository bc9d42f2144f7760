use serde::Deserialize;
use std::collections::BTreeMap;

use super::types::FieldCapabilities;

/// Elasticsearch `_field_caps` response structure
///
/// Per-type metadata (`searchable`, `aggregatable`, `indices`, ...) is not
/// needed for normalization and stays opaque.
#[derive(Debug, Deserialize)]
pub struct FieldCapsResponse {
    #[serde(default)]
    pub indices: Vec<String>,
    pub fields: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

impl FieldCapsResponse {
    /// Collapse to field name -> set of reported type names
    pub fn into_capabilities(self) -> FieldCapabilities {
        self.fields
            .into_iter()
            .map(|(field, types)| (field, types.into_keys().collect()))
            .collect()
    }
}
