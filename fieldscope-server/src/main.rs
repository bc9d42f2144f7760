use anyhow::Result;
use clap::Parser;
use fieldscope::config::{Config, ObservabilityConfig};
use fieldscope::ElasticsearchClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "fieldscope-server")]
#[command(about = "Normalized Elasticsearch field types over HTTP")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "fieldscope.toml", env = "FIELDSCOPE_CONFIG")]
    config: PathBuf,

    /// Server bind address (overrides config)
    #[arg(long, env = "FIELDSCOPE_BIND_ADDR")]
    bind_addr: Option<String>,

    /// Elasticsearch URL (overrides config)
    #[arg(long, env = "ELASTICSEARCH_URL")]
    es_url: Option<String>,
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&observability.log_level));

    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| observability.log_format.clone());

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load config
    let mut config = Config::load_or_create(&args.config)?;

    // Apply CLI overrides
    if let Some(bind_addr) = args.bind_addr {
        config.server.bind_addr = bind_addr;
    }
    if let Some(es_url) = args.es_url {
        config.elasticsearch.url = es_url;
    }
    config.validate()?;

    init_tracing(&config.observability);

    tracing::info!("Starting fieldscope server");
    tracing::info!("Config file: {:?}", args.config);
    tracing::info!("Elasticsearch: {}", config.elasticsearch.url);

    let metrics_handle = if config.observability.metrics_enabled {
        Some(fieldscope::metrics::install_prometheus_recorder()?)
    } else {
        None
    };

    let client = ElasticsearchClient::from_config(&config.elasticsearch)?;
    let router = fieldscope::app_router(&config, Arc::new(client), metrics_handle);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    tracing::info!(
        "Listening on {} (es_fields at {})",
        config.server.bind_addr,
        config.api.es_fields_path()
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
