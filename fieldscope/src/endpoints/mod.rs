//! HTTP endpoints

pub mod es_fields;
pub mod health;

pub use es_fields::{es_fields_handler, EsFieldsRequest, EsFieldsState};
pub use health::health_handler;
