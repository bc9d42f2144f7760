//! Field type resolution
//!
//! Turns the per-field type sets reported by the search backend into a single
//! category per field:
//!
//! - more than one distinct type: `conflict`
//! - exactly one type: whatever the [`TypeNormalizer`] maps it to, or
//!   `unsupported` when it has no rule
//! - no type at all: `unsupported`

use crate::schema::{
    FieldCapabilities, FieldCategory, NormalizedFieldMap, TypeNormalizer, TypeTable,
};
use std::collections::BTreeSet;

/// Pure mapping from [`FieldCapabilities`] to [`NormalizedFieldMap`]
#[derive(Debug, Clone)]
pub struct FieldTypeResolver<N = TypeTable> {
    normalizer: N,
}

impl Default for FieldTypeResolver<TypeTable> {
    fn default() -> Self {
        Self::new(TypeTable::builtin())
    }
}

impl<N: TypeNormalizer> FieldTypeResolver<N> {
    pub fn new(normalizer: N) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &N {
        &self.normalizer
    }

    /// Resolve every field. The output has exactly the input's key set.
    pub fn resolve(&self, capabilities: &FieldCapabilities) -> NormalizedFieldMap {
        capabilities
            .iter()
            .map(|(field, types)| (field.clone(), self.categorize(types)))
            .collect()
    }

    /// Categorize one field from its distinct backend type names
    pub fn categorize(&self, types: &BTreeSet<String>) -> FieldCategory {
        let mut iter = types.iter();
        match (iter.next(), iter.next()) {
            (Some(_), Some(_)) => FieldCategory::Conflict,
            (Some(only), None) => self
                .normalizer
                .normalize(only)
                .map(FieldCategory::Type)
                .unwrap_or(FieldCategory::Unsupported),
            (None, _) => FieldCategory::Unsupported,
        }
    }
}

/// Category counts for one resolved map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub resolved: usize,
    pub conflicts: usize,
    pub unsupported: usize,
}

impl ResolutionSummary {
    pub fn of(fields: &NormalizedFieldMap) -> Self {
        fields
            .values()
            .fold(Self::default(), |mut summary, category| {
                match category {
                    FieldCategory::Type(_) => summary.resolved += 1,
                    FieldCategory::Conflict => summary.conflicts += 1,
                    FieldCategory::Unsupported => summary.unsupported += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.resolved + self.conflicts + self.unsupported
    }
}
