//! # Registry Service
//!
//! Async host for the in-memory ledger.
//!
//! - Transactions are serialized behind one write lock; read-only calls
//!   share a read lock.
//! - Logs of a committed transaction are published on a broadcast channel in
//!   emission order, while the write lock is still held, so subscribers see
//!   the global commit order. Reverted transactions publish nothing.
//! - Execution statistics and Prometheus metrics are updated per request.

use crate::adapters::InMemoryLedger;
use crate::domain::entities::{Log, Receipt, RegistryStorage};
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::RegistryError;
use crate::events::RegistryEvent;
use crate::modules::registry::{RegistryModule, DEFAULT_MAX_SELECTORS};
use crate::ports::inbound::{CallRequest, RegistryApi};
use crate::ports::outbound::{Module, StateView};

use async_trait::async_trait;
use registry_telemetry::{
    metric_inc, parse_flag, time_histogram, CALLS_SERVED, DISPATCH_DURATION, DOCUMENTS_CREATED,
    DOCUMENT_MUTATIONS, EVENTS_PUBLISHED, MODULE_CUTS, REVERTS, ROUTED_SELECTORS, TRANSACTIONS,
};
use std::env;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Default broadcast channel capacity.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Registry service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Logs buffered per subscriber before it lags.
    pub event_channel_capacity: usize,
    /// Bound on selectors per table mutation for registries deployed
    /// through [`RegistryService::deploy_registry`].
    pub max_selectors_per_cut: usize,
    /// Log every published event at debug level.
    pub enable_tracing: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            max_selectors_per_cut: DEFAULT_MAX_SELECTORS,
            enable_tracing: false,
        }
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DID_EVENT_CHANNEL_CAPACITY` (default: 1024)
    /// - `DID_MAX_SELECTORS_PER_CUT` (default: 256)
    /// - `DID_ENABLE_TRACING` (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Unparseable or zero sizes fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let size = |key: &str, default: usize| {
            lookup(key)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(default)
        };

        Self {
            event_channel_capacity: size(
                "DID_EVENT_CHANNEL_CAPACITY",
                DEFAULT_EVENT_CHANNEL_CAPACITY,
            ),
            max_selectors_per_cut: size("DID_MAX_SELECTORS_PER_CUT", DEFAULT_MAX_SELECTORS),
            enable_tracing: lookup("DID_ENABLE_TRACING")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }
}

/// Statistics for the registry service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Accounts deployed.
    pub deployments: u64,
    /// Committed transactions.
    pub transactions_committed: u64,
    /// Reverted transactions.
    pub transactions_reverted: u64,
    /// Read-only calls served (successful or not).
    pub calls_served: u64,
    /// Logs published to subscribers.
    pub events_published: u64,
    /// Committed selector table mutations.
    pub module_cuts: u64,
    /// Average transaction execution time in microseconds.
    pub avg_execution_time_us: u64,
}

/// The registry service.
pub struct RegistryService {
    config: ServiceConfig,
    ledger: Arc<RwLock<InMemoryLedger>>,
    events: broadcast::Sender<Log>,
    stats: Arc<RwLock<ServiceStats>>,
}

impl RegistryService {
    /// Create a service over an empty ledger.
    pub fn new(config: ServiceConfig) -> Self {
        if let Err(e) = registry_telemetry::register_metrics() {
            warn!(error = %e, "Metrics registration failed");
        }
        let (events, _) = broadcast::channel(config.event_channel_capacity.max(1));
        Self {
            config,
            ledger: Arc::new(RwLock::new(InMemoryLedger::new())),
            events,
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Subscribe to committed logs.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Log> {
        self.events.subscribe()
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Committed storage of `address`.
    pub async fn storage(&self, address: Address) -> Option<RegistryStorage> {
        self.ledger.read().await.storage_at(address).cloned()
    }

    /// Nonce of `address`.
    pub async fn nonce(&self, address: Address) -> u64 {
        self.ledger.read().await.nonce(address)
    }

    /// Deploy a registry administered by `admin`.
    pub async fn deploy_registry(&self, admin: Address) -> Result<Address, RegistryError> {
        let code = RegistryModule::new(self.config.max_selectors_per_cut);
        self.deploy_code(admin, Arc::new(code)).await
    }

    /// Deploy `code` on behalf of `deployer`.
    #[instrument(skip(self, code), fields(code = code.name()))]
    pub async fn deploy_code(
        &self,
        deployer: Address,
        code: Arc<dyn Module>,
    ) -> Result<Address, RegistryError> {
        let address = self.ledger.write().await.deploy(deployer, code)?;
        self.stats.write().await.deployments += 1;
        Ok(address)
    }

    /// Execute a transaction and publish its logs.
    #[instrument(
        skip(self, request),
        fields(correlation_id = %correlation_id, from = ?request.from, to = ?request.to)
    )]
    pub async fn execute_transaction(
        &self,
        correlation_id: Uuid,
        request: CallRequest,
    ) -> Result<Receipt, RegistryError> {
        let start = Instant::now();
        let _timer = time_histogram!(DISPATCH_DURATION);

        let result = {
            let mut ledger = self.ledger.write().await;
            let result = ledger.transact(request.from, request.to, request.data.as_slice());
            if let Ok(receipt) = &result {
                self.publish(&ledger, receipt);
            }
            result
        };

        let elapsed_us = start.elapsed().as_micros() as u64;
        let mut stats = self.stats.write().await;
        match &result {
            Ok(receipt) => {
                metric_inc!(TRANSACTIONS, &["committed"]);
                stats.transactions_committed += 1;
                stats.events_published += receipt.logs.len() as u64;
                stats.module_cuts += receipt
                    .events()
                    .filter(|event| event.is_module_event())
                    .count() as u64;
                info!(
                    tx_hash = ?receipt.tx_hash,
                    logs = receipt.logs.len(),
                    "Transaction committed"
                );
            }
            Err(e) => {
                metric_inc!(TRANSACTIONS, &["reverted"]);
                REVERTS.with_label_values(&[kind_label(e)]).inc();
                stats.transactions_reverted += 1;
                warn!(error = %e, "Transaction reverted");
            }
        }

        let total = stats.transactions_committed + stats.transactions_reverted;
        stats.avg_execution_time_us =
            (stats.avg_execution_time_us * (total - 1) + elapsed_us) / total;

        result
    }

    /// Execute a read-only call.
    #[instrument(skip(self, request), fields(from = ?request.from, to = ?request.to))]
    pub async fn execute_call(&self, request: CallRequest) -> Result<Bytes, RegistryError> {
        let _timer = time_histogram!(DISPATCH_DURATION);
        let result = self
            .ledger
            .read()
            .await
            .call(request.from, request.to, request.data.as_slice());

        metric_inc!(CALLS_SERVED);
        self.stats.write().await.calls_served += 1;
        if let Err(e) = &result {
            debug!(error = %e, "Call failed");
        }
        result
    }

    fn publish(&self, ledger: &InMemoryLedger, receipt: &Receipt) {
        for log in &receipt.logs {
            record_event(&log.event);
            EVENTS_PUBLISHED
                .with_label_values(&[log.event.name()])
                .inc();
            if self.config.enable_tracing {
                debug!(address = ?log.address, event = ?log.event, "Publishing log");
            }
            // No subscribers is not an error.
            let _ = self.events.send(log.clone());
        }

        if receipt.events().any(RegistryEvent::is_module_event) {
            if let Some(storage) = ledger.storage_at(receipt.to) {
                ROUTED_SELECTORS.set(storage.routes.len() as f64);
            }
        }
    }
}

impl Default for RegistryService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

fn record_event(event: &RegistryEvent) {
    match event {
        RegistryEvent::ModuleAdded { .. } => MODULE_CUTS.with_label_values(&["add"]).inc(),
        RegistryEvent::ModuleUpdated { .. } => MODULE_CUTS.with_label_values(&["update"]).inc(),
        RegistryEvent::ModuleRemoved { .. } => MODULE_CUTS.with_label_values(&["remove"]).inc(),
        RegistryEvent::DidCreated { .. } => DOCUMENTS_CREATED.inc(),
        RegistryEvent::DidUpdatedInfo { .. } => {
            DOCUMENT_MUTATIONS.with_label_values(&["update_info"]).inc();
        }
        RegistryEvent::DidVersionUpgraded { .. } => {
            DOCUMENT_MUTATIONS
                .with_label_values(&["upgrade_version"])
                .inc();
        }
    }
}

fn kind_label(error: &RegistryError) -> &'static str {
    use crate::errors::ErrorKind;
    match error.kind() {
        ErrorKind::Authorization => "authorization",
        ErrorKind::NotFound => "not_found",
        ErrorKind::Conflict => "conflict",
        ErrorKind::Unrecognized => "unrecognized",
        ErrorKind::InvalidInput => "invalid_input",
    }
}

// =============================================================================
// RegistryApi Implementation
// =============================================================================

#[async_trait]
impl RegistryApi for RegistryService {
    async fn deploy(
        &self,
        deployer: Address,
        code: Arc<dyn Module>,
    ) -> Result<Address, RegistryError> {
        self.deploy_code(deployer, code).await
    }

    async fn transact(&self, request: CallRequest) -> Result<Receipt, RegistryError> {
        self.execute_transaction(Uuid::new_v4(), request).await
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, RegistryError> {
        self.execute_call(request).await
    }

    async fn snapshot(&self) -> u64 {
        self.ledger.write().await.snapshot()
    }

    async fn revert_to_snapshot(&self, id: u64) -> Result<(), RegistryError> {
        self.ledger.write().await.revert_to_snapshot(id)
    }
}

// =============================================================================
// TESTS
// =============================================================================
