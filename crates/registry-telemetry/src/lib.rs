//! # Registry Telemetry
//!
//! Logging and metrics for the DID module registry.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with env filter, pretty or JSON output
//! - **Metrics**: Prometheus counters and histograms in a private registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use registry_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> Result<(), registry_telemetry::TelemetryError> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DID_SERVICE_NAME` | `did-registry` | Service name in logs |
//! | `DID_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honoured) |
//! | `DID_CONSOLE_OUTPUT` | `true` | Emit logs to stdout |
//! | `DID_JSON_LOGS` | `false` | JSON instead of pretty output |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::{parse_flag, TelemetryConfig};
pub use logging::{env_filter, init_logging};
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, CALLS_SERVED, DISPATCH_DURATION,
    DOCUMENTS_CREATED, DOCUMENT_MUTATIONS, EVENTS_PUBLISHED, MODULE_CUTS, REVERTS,
    ROUTED_SELECTORS, TRANSACTIONS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metric registration or encoding failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Bad configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize metrics, then logging.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
