//! HTTP router

use crate::backend::FieldCapsSource;
use crate::config::{Config, CorsConfig};
use crate::endpoints::{es_fields_handler, health_handler, EsFieldsState};
use crate::resolver::FieldTypeResolver;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the es_fields router
///
/// # Endpoints
///
/// - `GET {es_fields_path}?index=<index>&fields=<a,b>` - normalized field types
pub fn es_fields_router(state: EsFieldsState, es_fields_path: &str) -> Router {
    Router::new()
        .route(es_fields_path, get(es_fields_handler))
        .with_state(state)
}

/// Full application router built from config
///
/// Adds `GET /health`, `GET /metrics` when a Prometheus handle is given,
/// CORS and request tracing.
pub fn app_router(
    config: &Config,
    source: Arc<dyn FieldCapsSource>,
    metrics_handle: Option<PrometheusHandle>,
) -> Router {
    let state = EsFieldsState {
        source,
        resolver: Arc::new(FieldTypeResolver::new(config.normalization.type_table())),
        forward_authorization: config.elasticsearch.forward_authorization,
    };

    let mut router = es_fields_router(state, &config.api.es_fields_path())
        .route("/health", get(health_handler));

    if let Some(handle) = metrics_handle {
        router = router.route("/metrics", get(move || std::future::ready(handle.render())));
    }

    router
        .layer(build_cors_layer(&config.server.cors))
        .layer(TraceLayer::new_for_http())
}

/// Build CORS layer from configuration
fn build_cors_layer(cors_config: &CorsConfig) -> CorsLayer {
    if !cors_config.enabled {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = cors_config
        .origins
        .iter()
        .filter(|o| *o != "*")
        .filter_map(|o| o.parse().ok())
        .collect();

    let has_wildcard = cors_config.origins.iter().any(|o| o == "*");

    let cors = if has_wildcard {
        CorsLayer::new().allow_origin(tower_http::cors::Any)
    } else if origins.is_empty() {
        CorsLayer::new()
    } else {
        CorsLayer::new().allow_origin(origins)
    };

    cors.allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FieldCapsQuery, FieldSelector};
    use crate::error::FieldscopeError;
    use crate::schema::FieldCapabilities;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// In-memory source that records every query it receives
    struct StaticSource {
        reply: std::result::Result<FieldCapabilities, (u16, String)>,
        seen: Mutex<Vec<FieldCapsQuery>>,
    }

    impl StaticSource {
        fn with_fields(entries: &[(&str, &[&str])]) -> Arc<Self> {
            let caps = entries
                .iter()
                .map(|(f, types)| (f.to_string(), types.iter().map(|t| t.to_string()).collect()))
                .collect();
            Arc::new(Self {
                reply: Ok(caps),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err((status, body.to_string())),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<FieldCapsQuery> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FieldCapsSource for StaticSource {
        async fn field_caps(&self, query: &FieldCapsQuery) -> crate::Result<FieldCapabilities> {
            self.seen.lock().unwrap().push(query.clone());
            match &self.reply {
                Ok(caps) => Ok(caps.clone()),
                Err((status, body)) => Err(FieldscopeError::upstream(*status, body)),
            }
        }

        fn source_name(&self) -> &str {
            "static"
        }
    }

    fn router_for(source: Arc<StaticSource>, config: &Config) -> Router {
        app_router(config, source, None)
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = router.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_es_fields_normalizes_response() {
        let source = StaticSource::with_fields(&[
            ("age", &["long"]),
            ("status", &["keyword", "text"]),
            ("weird", &["geo_shape"]),
            ("@timestamp", &["date"]),
        ]);
        let router = router_for(source.clone(), &Config::default());

        let (status, body) = get_json(router, "/api/canvas/es_fields?index=logs").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "@timestamp": "date",
                "age": "number",
                "status": "conflict",
                "weird": "unsupported"
            })
        );
    }

    #[tokio::test]
    async fn test_missing_fields_queries_wildcard() {
        let source = StaticSource::with_fields(&[]);
        let router = router_for(source.clone(), &Config::default());

        let (status, body) = get_json(router, "/api/canvas/es_fields?index=logs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        let queries = source.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].index, "logs");
        assert_eq!(queries[0].fields, FieldSelector::All);
        assert_eq!(queries[0].fields.as_param(), "*");
    }

    #[tokio::test]
    async fn test_named_fields_passed_through() {
        let source = StaticSource::with_fields(&[("a", &["keyword"])]);
        let router = router_for(source.clone(), &Config::default());

        let (status, _) =
            get_json(router, "/api/canvas/es_fields?index=logs&fields=a&fields=b").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            source.queries()[0].fields,
            FieldSelector::Named(vec!["a".into(), "b".into()])
        );
    }

    #[tokio::test]
    async fn test_missing_index_is_bad_request_without_backend_call() {
        let source = StaticSource::with_fields(&[]);
        let router = router_for(source.clone(), &Config::default());

        let (status, body) = get_json(router, "/api/canvas/es_fields").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["error"], "Bad Request");
        assert!(source.queries().is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_status_propagates() {
        let source = StaticSource::failing(
            404,
            r#"{"error":{"type":"index_not_found_exception","reason":"no such index [nope]"},"status":404}"#,
        );
        let router = router_for(source, &Config::default());

        let (status, body) = get_json(router, "/api/canvas/es_fields?index=nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["statusCode"], 404);
        assert_eq!(
            body["message"],
            "[index_not_found_exception] no such index [nope]"
        );
    }

    #[tokio::test]
    async fn test_authorization_not_forwarded_by_default() {
        let source = StaticSource::with_fields(&[]);
        let router = router_for(source.clone(), &Config::default());

        let req = Request::builder()
            .uri("/api/canvas/es_fields?index=logs")
            .header("authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(source.queries()[0].authorization, None);
    }

    #[tokio::test]
    async fn test_authorization_forwarded_when_enabled() {
        let source = StaticSource::with_fields(&[]);
        let mut config = Config::default();
        config.elasticsearch.forward_authorization = true;
        let router = router_for(source.clone(), &config);

        let req = Request::builder()
            .uri("/api/canvas/es_fields?index=logs")
            .header("authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            source.queries()[0].authorization.as_deref(),
            Some("Basic dXNlcjpwYXNz")
        );
    }

    #[tokio::test]
    async fn test_custom_route_prefix_and_overrides() {
        let source = StaticSource::with_fields(&[("shape", &["geo_shape"])]);
        let mut config = Config::default();
        config.api.route_prefix = "/internal/".into();
        config
            .normalization
            .overrides
            .insert("geo_shape".into(), crate::schema::NormalizedType::String);
        let router = router_for(source, &config);

        let (status, body) = get_json(router.clone(), "/internal/es_fields?index=geo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "shape": "string" }));

        let (status, _) = get_json(router, "/api/canvas/es_fields?index=geo").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_not_allowed() {
        let router = router_for(StaticSource::with_fields(&[]), &Config::default());
        let req = Request::builder()
            .method("POST")
            .uri("/api/canvas/es_fields?index=logs")
            .body(Body::empty())
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_health_route() {
        let router = router_for(StaticSource::with_fields(&[]), &Config::default());
        let (status, _) = get_json(router, "/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_route_absent_without_handle() {
        let router = router_for(StaticSource::with_fields(&[]), &Config::default());
        let (status, _) = get_json(router, "/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cors_layer_builds_for_all_configs() {
        let _ = build_cors_layer(&CorsConfig::default());
        let _ = build_cors_layer(&CorsConfig {
            enabled: true,
            origins: vec!["*".into()],
        });
        let _ = build_cors_layer(&CorsConfig {
            enabled: true,
            origins: vec!["http://localhost:3000".into()],
        });
    }
}
