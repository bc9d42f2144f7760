//! Elasticsearch `_field_caps` client

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use url::Url;

use super::traits::{FieldCapsQuery, FieldCapsSource};
use crate::config::ElasticsearchConfig;
use crate::error::FieldscopeError;
use crate::schema::{FieldCapabilities, FieldCapsResponse};
use crate::{metrics, Result};

/// How to authenticate against the cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AuthMethod {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    ApiKey {
        key: String,
    },
    Bearer {
        token: String,
    },
}

pub struct ElasticsearchClient {
    client: Client,
    base_url: Url,
    auth: AuthMethod,
}

impl ElasticsearchClient {
    /// Create a client with reqwest's default timeouts
    pub fn new(base_url: Url, auth: AuthMethod) -> Self {
        Self {
            client: Client::new(),
            base_url,
            auth,
        }
    }

    pub fn from_config(config: &ElasticsearchConfig) -> Result<Self> {
        let base_url = Url::parse(&config.url)?;

        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| FieldscopeError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            auth: config.auth.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn field_caps_url(&self, query: &FieldCapsQuery) -> Result<Url> {
        // url drops "." and ".." segments, which would widen the query to every index
        if query.index == "." || query.index == ".." {
            return Err(FieldscopeError::InvalidRequest(format!(
                "invalid index name [{}]",
                query.index
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                FieldscopeError::Config(format!(
                    "Elasticsearch URL cannot be used as a base: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push(&query.index)
            .push("_field_caps");
        url.query_pairs_mut()
            .append_pair("fields", &query.fields.as_param());
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder, forwarded: Option<&str>) -> RequestBuilder {
        if let Some(value) = forwarded {
            return request.header(AUTHORIZATION, value);
        }

        match &self.auth {
            AuthMethod::None => request,
            AuthMethod::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            AuthMethod::ApiKey { key } => request.header(AUTHORIZATION, format!("ApiKey {}", key)),
            AuthMethod::Bearer { token } => request.bearer_auth(token),
        }
    }
}

#[async_trait]
impl FieldCapsSource for ElasticsearchClient {
    async fn field_caps(&self, query: &FieldCapsQuery) -> Result<FieldCapabilities> {
        let url = self.field_caps_url(query)?;
        tracing::debug!(index = %query.index, fields = %query.fields, "Querying field capabilities");

        let start = Instant::now();
        let response = match self
            .authorize(self.client.get(url), query.authorization.as_deref())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                metrics::record_upstream_request(self.source_name(), "error", start.elapsed());
                return Err(e.into());
            }
        };

        let status = response.status();
        metrics::record_upstream_request(self.source_name(), status.as_str(), start.elapsed());

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(status = status.as_u16(), "Failed to read error body: {}", e);
                    String::new()
                }
            };
            return Err(FieldscopeError::upstream(status.as_u16(), &body));
        }

        let body = response.bytes().await?;
        let parsed: FieldCapsResponse = serde_json::from_slice(&body)
            .map_err(|e| FieldscopeError::InvalidUpstreamResponse(e.to_string()))?;

        tracing::debug!(
            index = %query.index,
            indices = parsed.indices.len(),
            fields = parsed.fields.len(),
            "Field capabilities received"
        );

        Ok(parsed.into_capabilities())
    }

    fn source_name(&self) -> &str {
        "elasticsearch"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FieldSelector;

    fn client(base: &str) -> ElasticsearchClient {
        ElasticsearchClient::new(Url::parse(base).unwrap(), AuthMethod::None)
    }

    #[test]
    fn test_field_caps_url_wildcard() {
        let url = client("http://localhost:9200")
            .field_caps_url(&FieldCapsQuery::new("logs", FieldSelector::All))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:9200/logs/_field_caps?fields=*");
    }

    #[test]
    fn test_field_caps_url_named_fields() {
        let url = client("http://localhost:9200/")
            .field_caps_url(&FieldCapsQuery::new(
                "logs",
                FieldSelector::Named(vec!["a".into(), "b".into()]),
            ))
            .unwrap();
        assert_eq!(url.path(), "/logs/_field_caps");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("fields".to_string(), "a,b".to_string())]);
    }

    #[test]
    fn test_field_caps_url_keeps_base_path_and_pattern() {
        let url = client("https://proxy.local/es/")
            .field_caps_url(&FieldCapsQuery::new("logs-*,metrics-*", FieldSelector::All))
            .unwrap();
        assert_eq!(url.path(), "/es/logs-*,metrics-*/_field_caps");
    }

    #[test]
    fn test_field_caps_url_encodes_index_segment() {
        let url = client("http://localhost:9200")
            .field_caps_url(&FieldCapsQuery::new("a/b c", FieldSelector::All))
            .unwrap();
        assert_eq!(url.path(), "/a%2Fb%20c/_field_caps");
    }

    #[test]
    fn test_field_caps_url_rejects_dot_segments() {
        let es = client("http://localhost:9200");
        for index in [".", ".."] {
            let result = es.field_caps_url(&FieldCapsQuery::new(index, FieldSelector::All));
            assert!(
                matches!(result, Err(FieldscopeError::InvalidRequest(_))),
                "{index}"
            );
        }

        let url = es
            .field_caps_url(&FieldCapsQuery::new(".kibana", FieldSelector::All))
            .unwrap();
        assert_eq!(url.path(), "/.kibana/_field_caps");
    }

    #[test]
    fn test_from_config_rejects_bad_url() {
        let config = ElasticsearchConfig {
            url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(
            ElasticsearchClient::from_config(&config),
            Err(FieldscopeError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_auth_method_toml_shape() {
        let auth: AuthMethod =
            toml::from_str("method = \"basic\"\nusername = \"elastic\"\npassword = \"changeme\"")
                .unwrap();
        assert_eq!(
            auth,
            AuthMethod::Basic {
                username: "elastic".into(),
                password: "changeme".into(),
            }
        );

        let auth: AuthMethod = toml::from_str("method = \"api_key\"\nkey = \"abc\"").unwrap();
        assert_eq!(auth, AuthMethod::ApiKey { key: "abc".into() });
    }
}
