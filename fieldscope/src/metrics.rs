//! Service metrics
//!
//! Prometheus-compatible counters and histograms, recorded through the
//! `metrics` facade. Nothing is exported unless the binary installs a recorder.

use crate::resolver::ResolutionSummary;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Record one upstream field-capabilities request
pub fn record_upstream_request(source: &str, status: &str, duration: Duration) {
    metrics::counter!(
        "fieldscope_upstream_requests_total",
        "source" => source.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);

    metrics::histogram!(
        "fieldscope_upstream_duration_seconds",
        "source" => source.to_string(),
    )
    .record(duration.as_secs_f64());
}

/// Record how the fields of one response were categorized
pub fn record_field_categories(summary: &ResolutionSummary) {
    for (category, count) in [
        ("resolved", summary.resolved),
        ("conflict", summary.conflicts),
        ("unsupported", summary.unsupported),
    ] {
        if count > 0 {
            metrics::counter!("fieldscope_field_categories_total", "category" => category)
                .increment(count as u64);
        }
    }
}

/// Install the global Prometheus recorder and return a handle for rendering
pub fn install_prometheus_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_metrics_render() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_upstream_request("elasticsearch", "200", Duration::from_millis(12));
            record_field_categories(&ResolutionSummary {
                resolved: 3,
                conflicts: 2,
                unsupported: 0,
            });
        });

        let rendered = handle.render();
        assert!(rendered.contains("fieldscope_upstream_requests_total"));
        assert!(rendered.contains("status=\"200\""));
        assert!(rendered.contains("fieldscope_upstream_duration_seconds"));
        assert!(rendered.contains("fieldscope_field_categories_total{category=\"conflict\"} 2"));
        assert!(rendered.contains("fieldscope_field_categories_total{category=\"resolved\"} 3"));
        assert!(!rendered.contains("category=\"unsupported\""));
    }
}
