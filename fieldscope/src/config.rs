//! Configuration management
//!
//! Default config location: ./fieldscope.toml

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::backend::AuthMethod;
use crate::schema::{NormalizedType, TypeTable};

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub elasticsearch: ElasticsearchConfig,
    #[serde(default)]
    pub normalization: NormalizationConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_bind_addr() -> String {
    "127.0.0.1:5601".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Allowed origins. Use "*" for any origin, or list specific origins.
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Prefix the es_fields route is mounted under
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,
}

fn default_route_prefix() -> String {
    "/api/canvas".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            route_prefix: default_route_prefix(),
        }
    }
}

impl ApiConfig {
    /// Full path of the field-capabilities endpoint
    pub fn es_fields_path(&self) -> String {
        format!("{}/es_fields", self.route_prefix.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ElasticsearchConfig {
    #[serde(default = "default_es_url")]
    pub url: String,
    #[serde(default)]
    pub auth: AuthMethod,
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    /// Skip certificate verification (INSECURE - development only)
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Query as the calling user by forwarding their Authorization header
    #[serde(default)]
    pub forward_authorization: bool,
}

fn default_es_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_request_timeout() -> u64 {
    30000
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: default_es_url(),
            auth: AuthMethod::default(),
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
            accept_invalid_certs: false,
            forward_authorization: false,
        }
    }
}

/// Extra or replacement type rules, backend type -> normalized type
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NormalizationConfig {
    #[serde(default)]
    pub overrides: BTreeMap<String, NormalizedType>,
}

impl NormalizationConfig {
    pub fn type_table(&self) -> TypeTable {
        TypeTable::builtin().with_overrides(self.overrides.clone())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log output format: "pretty" or "json"
    /// Override with LOG_FORMAT env var
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter string
    /// Override with RUST_LOG env var
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable Prometheus metrics at GET /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_level() -> String {
    "info,fieldscope=debug".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            log_level: default_log_level(),
            metrics_enabled: true,
        }
    }
}

impl Config {
    /// Parse config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file path, or create default
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Config::default();
            if let Err(e) = config.save(config_path) {
                tracing::warn!("Could not write default config to {:?}: {}", config_path, e);
            }
            Ok(config)
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the service cannot start with
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.elasticsearch.url)
            .map_err(|e| anyhow!("Invalid elasticsearch.url '{}': {}", self.elasticsearch.url, e))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            bail!("elasticsearch.url must be an http(s) URL: {}", self.elasticsearch.url);
        }
        if !self.api.route_prefix.starts_with('/') {
            bail!(
                "api.route_prefix must start with '/': {}",
                self.api.route_prefix
            );
        }
        // ':' and '*' are route parameter syntax
        if self.api.route_prefix.contains([':', '*']) {
            bail!(
                "api.route_prefix must not contain ':' or '*': {}",
                self.api.route_prefix
            );
        }
        if self.elasticsearch.connect_timeout_ms == 0 || self.elasticsearch.request_timeout_ms == 0
        {
            bail!("elasticsearch timeouts must be greater than zero");
        }
        match self.observability.log_format.as_str() {
            "pretty" | "json" => {}
            other => bail!("observability.log_format must be 'pretty' or 'json', got '{}'", other),
        }
        Ok(())
    }
}
