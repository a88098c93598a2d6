//! # Router Telemetry
//!
//! Logging setup for the facet router and its tools.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use router_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     init_logging(&TelemetryConfig::from_env()).expect("Failed to init logging");
//!     // Router spans and events now reach the configured output
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FR_SERVICE_NAME` | `facet-router` | Service name in logs |
//! | `FR_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `FR_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `FR_JSON_LOGS` | `false` | JSON lines instead of pretty output |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, init_test_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// The level filter could not be parsed.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed.
    #[error("Subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}
