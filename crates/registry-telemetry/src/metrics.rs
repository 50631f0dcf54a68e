//! Prometheus metrics for the DID module registry.
//!
//! All metrics follow the naming convention: `did_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: transactions, module cuts, documents created
//! - **Gauge**: currently routed selectors
//! - **Histogram**: transaction execution duration

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};
use std::sync::Once;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // TRANSACTION METRICS
    // =========================================================================

    /// Transactions by outcome
    pub static ref TRANSACTIONS: CounterVec = CounterVec::new(
        Opts::new("did_registry_transactions_total", "Transactions executed against the ledger"),
        &["outcome"]  // outcome: committed/reverted
    ).expect("metric creation failed");

    /// Reverts by error kind
    pub static ref REVERTS: CounterVec = CounterVec::new(
        Opts::new("did_registry_reverts_total", "Reverted transactions by error kind"),
        &["kind"]  // kind: authorization/not_found/conflict/unrecognized/invalid_input
    ).expect("metric creation failed");

    /// Read-only calls served
    pub static ref CALLS_SERVED: Counter = Counter::new(
        "did_registry_calls_total",
        "Read-only calls served"
    ).expect("metric creation failed");

    /// Execution duration
    pub static ref DISPATCH_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "did_registry_dispatch_duration_seconds",
            "Time spent executing a transaction or call"
        ).buckets(exponential_buckets(0.00001, 2.0, 15).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // SELECTOR TABLE METRICS
    // =========================================================================

    /// Module cuts by kind
    pub static ref MODULE_CUTS: CounterVec = CounterVec::new(
        Opts::new("did_registry_module_cuts_total", "Committed selector table changes"),
        &["kind"]  // kind: add/update/remove
    ).expect("metric creation failed");

    /// Selectors routed by the most recently touched registry
    pub static ref ROUTED_SELECTORS: Gauge = Gauge::new(
        "did_registry_routed_selectors",
        "Selectors routed by the most recently mutated registry"
    ).expect("metric creation failed");

    // =========================================================================
    // DOCUMENT METRICS
    // =========================================================================

    /// Documents created
    pub static ref DOCUMENTS_CREATED: Counter = Counter::new(
        "did_documents_created_total",
        "DID documents created"
    ).expect("metric creation failed");

    /// Document mutations by kind
    pub static ref DOCUMENT_MUTATIONS: CounterVec = CounterVec::new(
        Opts::new("did_documents_mutations_total", "DID document mutations"),
        &["kind"]  // kind: update_info/upgrade_version
    ).expect("metric creation failed");

    // =========================================================================
    // EVENT METRICS
    // =========================================================================

    /// Logs published to subscribers
    pub static ref EVENTS_PUBLISHED: CounterVec = CounterVec::new(
        Opts::new("did_registry_events_published_total", "Logs published after commit"),
        &["event"]
    ).expect("metric creation failed");
}

static REGISTER: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Safe to call more than once; only the first call registers.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let mut result = Ok(());
    REGISTER.call_once(|| {
        let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
            // Transactions
            Box::new(TRANSACTIONS.clone()),
            Box::new(REVERTS.clone()),
            Box::new(CALLS_SERVED.clone()),
            Box::new(DISPATCH_DURATION.clone()),
            // Selector table
            Box::new(MODULE_CUTS.clone()),
            Box::new(ROUTED_SELECTORS.clone()),
            // Documents
            Box::new(DOCUMENTS_CREATED.clone()),
            Box::new(DOCUMENT_MUTATIONS.clone()),
            // Events
            Box::new(EVENTS_PUBLISHED.clone()),
        ];

        for metric in metrics {
            if let Err(e) = REGISTRY.register(metric) {
                result = Err(TelemetryError::MetricsInit(e.to_string()));
                return;
            }
        }
    });
    result
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
