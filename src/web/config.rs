//! Metrics endpoint configuration.

/// Configuration for the metrics web server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    /// Host to bind the server to
    pub host: String,
    /// Port to bind the server to
    pub port: u16,
    /// Whether to log every HTTP request
    pub trace_requests: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: crate::METRICS_PORT,
            trace_requests: true,
        }
    }
}

impl WebConfig {
    /// Create a new web configuration with custom host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Enable or disable per-request tracing.
    pub fn with_request_tracing(mut self, enabled: bool) -> Self {
        self.trace_requests = enabled;
        self
    }

    /// Get the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binds_all_interfaces_on_8000() {
        let config = WebConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert!(config.trace_requests);
    }

    #[test]
    fn test_custom_address() {
        let config = WebConfig::new("127.0.0.1", 0).with_request_tracing(false);
        assert_eq!(config.bind_address(), "127.0.0.1:0");
        assert!(!config.trace_requests);
    }
}
