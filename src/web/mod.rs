//! Pull-based Prometheus exposition over HTTP.
//!
//! Scrapers read gauge values straight from the shared registry on every
//! request. The server is started once before the collection loop and lives
//! until the process exits.

pub mod config;

// Re-export commonly used items
pub use config::WebConfig;

use crate::error::{ExporterError, Result};
use crate::metrics::MetricsRegistry;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// A running metrics endpoint.
pub struct MetricsServer {
    /// Address actually bound (useful when port 0 was requested)
    pub local_addr: SocketAddr,
    /// Background task serving requests
    pub handle: JoinHandle<()>,
}

/// Build the router serving `/metrics`, `/` and `/health`.
pub fn create_app(metrics: MetricsRegistry, trace_requests: bool) -> Router {
    let app = Router::new()
        .route("/", get(metrics_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_check))
        .with_state(metrics);

    if trace_requests {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

/// Bind the configured address and serve metrics in the background.
///
/// Binding happens before this returns, so a port conflict surfaces as an
/// error here rather than inside the spawned task.
pub async fn start_metrics_server(
    config: &WebConfig,
    metrics: MetricsRegistry,
) -> Result<MetricsServer> {
    let addr = config
        .bind_address()
        .parse::<SocketAddr>()
        .map_err(|e| ExporterError::config_error(format!("Invalid bind address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        ExporterError::web_server_error(format!("Failed to bind to {}: {}", addr, e))
    })?;
    let local_addr = listener.local_addr()?;

    let app = create_app(metrics, config.trace_requests);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    info!("Serving sensor metrics on :{}", local_addr.port());
    Ok(MetricsServer { local_addr, handle })
}

/// Render the registry in the Prometheus text format.
async fn metrics_handler(State(metrics): State<MetricsRegistry>) -> Response {
    match metrics.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, metrics.content_type())], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
        }
    }
}

/// Health check endpoint.
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "pi_climate",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Reading;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_metrics_endpoint_serves_gauges() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.publish(&Reading {
            timestamp: 1,
            temperature: 22.3,
            humidity: 48.0,
            cpu_temp: 45.2,
        });

        let (status, body) = get_body(create_app(metrics, false), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("# TYPE humidity gauge"));
        assert!(body.contains("temperature 22.3"));
        assert!(body.contains("cpu_temp 45.2"));
    }

    #[tokio::test]
    async fn test_root_serves_metrics_too() {
        let metrics = MetricsRegistry::new().unwrap();
        let (status, body) = get_body(create_app(metrics, false), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("# HELP cpu_temp RPI CPU Temp"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let metrics = MetricsRegistry::new().unwrap();
        let (status, body) = get_body(create_app(metrics, true), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "pi_climate");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let metrics = MetricsRegistry::new().unwrap();
        let (status, _) = get_body(create_app(metrics, false), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_bind_address() {
        let metrics = MetricsRegistry::new().unwrap();
        let result = start_metrics_server(&WebConfig::new("not an address", 8000), metrics).await;
        assert!(matches!(result, Err(ExporterError::Config(_))));
    }
}
