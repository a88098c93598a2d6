//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for router logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output (for development)
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "facet-router".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FR_SERVICE_NAME`: Service name (default: facet-router)
    /// - `FR_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `FR_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `FR_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    #[must_use]
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("FR_SERVICE_NAME")
                .unwrap_or_else(|_| "facet-router".to_string()),

            log_level: env::var("FR_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("FR_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: env::var("FR_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }

    /// Quiet configuration for tests: warnings only, plain text.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            service_name: "facet-router-test".to_string(),
            log_level: "warn".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}
