//! GET <route_prefix>/es_fields endpoint

use axum::extract::{RawQuery, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use std::sync::Arc;

use crate::backend::{FieldCapsQuery, FieldCapsSource, FieldSelector};
use crate::error::FieldscopeError;
use crate::metrics;
use crate::resolver::{FieldTypeResolver, ResolutionSummary};
use crate::schema::NormalizedFieldMap;
use crate::Result;

/// State for the es_fields handler
#[derive(Clone)]
pub struct EsFieldsState {
    pub source: Arc<dyn FieldCapsSource>,
    pub resolver: Arc<FieldTypeResolver>,
    /// Run backend queries with the caller's Authorization header
    pub forward_authorization: bool,
}

/// Validated query string: required `index`, optional `fields`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsFieldsRequest {
    pub index: String,
    pub fields: FieldSelector,
}

impl EsFieldsRequest {
    /// Validate decoded query pairs.
    ///
    /// `fields` may repeat and each value may hold a comma separated list.
    /// Unknown keys are rejected.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut index: Option<String> = None;
        let mut names: Vec<String> = Vec::new();

        for (key, value) in pairs {
            match key.as_ref() {
                "index" => {
                    if index.is_some() {
                        return Err(FieldscopeError::InvalidRequest(
                            "[request query.index]: expected value of type [string] but got [Array]"
                                .to_string(),
                        ));
                    }
                    index = Some(value.as_ref().to_string());
                }
                "fields" => {
                    names.extend(value.as_ref().split(',').map(str::to_string));
                }
                other => {
                    return Err(FieldscopeError::InvalidRequest(format!(
                        "[request query.{}]: definition for this key is missing",
                        other
                    )));
                }
            }
        }

        let index = index.ok_or_else(|| {
            FieldscopeError::InvalidRequest(
                "[request query.index]: expected value of type [string] but got [undefined]"
                    .to_string(),
            )
        })?;

        if index.trim().is_empty() {
            return Err(FieldscopeError::InvalidRequest(
                "[request query.index]: value must not be empty".to_string(),
            ));
        }

        if index == "." || index == ".." {
            return Err(FieldscopeError::InvalidRequest(format!(
                "[request query.index]: invalid index name [{}]",
                index
            )));
        }

        Ok(Self {
            index,
            fields: FieldSelector::from_names(names),
        })
    }

    /// Parse a raw (still percent-encoded) query string
    pub fn from_query_string(query: &str) -> Result<Self> {
        Self::from_query_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }
}

/// GET <route_prefix>/es_fields?index=<index>&fields=<a,b> - normalized field types
pub async fn es_fields_handler(
    State(state): State<EsFieldsState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Json<NormalizedFieldMap>> {
    let request = EsFieldsRequest::from_query_string(query.as_deref().unwrap_or_default())?;

    let authorization = if state.forward_authorization {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    } else {
        None
    };

    let query =
        FieldCapsQuery::new(request.index, request.fields).with_authorization(authorization);
    let capabilities = state.source.field_caps(&query).await?;

    let fields = state.resolver.resolve(&capabilities);

    let summary = ResolutionSummary::of(&fields);
    metrics::record_field_categories(&summary);
    tracing::debug!(
        index = %query.index,
        fields = summary.total(),
        conflicts = summary.conflicts,
        unsupported = summary.unsupported,
        "Resolved field types"
    );

    Ok(Json(fields))
}
