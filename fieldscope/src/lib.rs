//! Field-capabilities normalization service
//!
//! Asks an Elasticsearch cluster which types each field of an index has and
//! collapses the answer to one category per field, so clients can build
//! expressions without knowing every Elasticsearch type.
//!
//! # Endpoints
//!
//! - `GET /api/canvas/es_fields?index=<index>&fields=<a,b>` - normalized field types
//! - `GET /health` - liveness
//! - `GET /metrics` - Prometheus metrics (when enabled)
//!
//! # Categories
//!
//! - `string`, `number`, `date`, `boolean`, `null` - the single reported type normalized
//! - `conflict` - the field has different types across the queried indices
//! - `unsupported` - the type has no normalization rule

pub mod backend;
pub mod config;
pub mod error;
pub mod metrics;
pub mod resolver;
pub mod router;
pub mod schema;

mod endpoints;

pub use backend::{AuthMethod, ElasticsearchClient, FieldCapsQuery, FieldCapsSource, FieldSelector};
pub use config::Config;
pub use endpoints::{EsFieldsRequest, EsFieldsState};
pub use error::FieldscopeError;
pub use resolver::{FieldTypeResolver, ResolutionSummary};
pub use router::{app_router, es_fields_router};
pub use schema::{
    FieldCapabilities, FieldCategory, NormalizedFieldMap, NormalizedType, TypeNormalizer,
    TypeTable, UnsupportedType,
};

/// Result type for fieldscope operations
pub type Result<T> = std::result::Result<T, FieldscopeError>;
