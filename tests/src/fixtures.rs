//! # Shared Fixtures
//!
//! A fully deployed registry with both DID module versions and the
//! documents module, plus a handful of well-known accounts.

use std::sync::Arc;

use did_registry::prelude::*;
use rand::Rng;
use registry_telemetry::TelemetryConfig;

/// Deploys everything and administers the registry.
pub const ADMIN: Address = Address::repeat_byte(0xAD);
/// Document owner in most flows.
pub const ALICE: Address = Address::repeat_byte(0xA1);
/// A second honest caller.
pub const BOB: Address = Address::repeat_byte(0xB0);
/// Adversarial caller.
pub const MALLORY: Address = Address::repeat_byte(0x66);

/// Registry plus deployed (not yet routed) modules.
pub struct Deployment {
    pub service: RegistryService,
    pub registry: Address,
    pub did_v1: Address,
    pub did_v2: Address,
    pub documents: Address,
}

impl Deployment {
    /// Deploys the registry and every module; routes nothing.
    pub async fn new() -> Self {
        Self::with_service(RegistryService::default()).await
    }

    /// Deploys onto an existing service.
    pub async fn with_service(service: RegistryService) -> Self {
        init_test_logging();
        let registry = service.deploy_registry(ADMIN).await.unwrap();
        let did_v1 = service
            .deploy_code(ADMIN, Arc::new(DidModuleV1))
            .await
            .unwrap();
        let did_v2 = service
            .deploy_code(ADMIN, Arc::new(DidModuleV2))
            .await
            .unwrap();
        let documents = service
            .deploy_code(ADMIN, Arc::new(DocumentsModule))
            .await
            .unwrap();
        Self {
            service,
            registry,
            did_v1,
            did_v2,
            documents,
        }
    }

    /// Deploys and routes DID v1 plus the documents module.
    pub async fn wired() -> Self {
        let deployment = Self::new().await;
        let admin = deployment.admin();
        admin
            .add_module(ADMIN, deployment.documents, &DocumentsModule.selectors())
            .await
            .unwrap();
        admin
            .add_module(ADMIN, deployment.did_v1, &DidModuleV1.selectors())
            .await
            .unwrap();
        deployment
    }

    /// Table administration through the registry.
    pub fn admin(&self) -> RegistryAdminHandle<'_, RegistryService> {
        RegistryAdminHandle::new(&self.service, self.registry)
    }

    /// DID operations through the registry.
    pub fn did(&self) -> DidHandle<'_, RegistryService> {
        DidHandle::new(&self.service, self.registry)
    }

    /// Document queries through the registry.
    pub fn documents(&self) -> DocumentsHandle<'_, RegistryService> {
        DocumentsHandle::new(&self.service, self.registry)
    }

    /// Current selector table of the registry.
    pub async fn routes(&self) -> SelectorTable {
        self.service
            .storage(self.registry)
            .await
            .map(|storage| storage.routes)
            .unwrap_or_default()
    }
}

/// Installs a silent subscriber; only the first call in a process wins.
pub fn init_test_logging() {
    let config = TelemetryConfig {
        console_output: false,
        ..TelemetryConfig::default()
    };
    let _ = registry_telemetry::init_logging(&config);
}

/// Random non-zero account.
pub fn random_address(rng: &mut impl Rng) -> Address {
    loop {
        let address = Address::new(rng.gen());
        if !address.is_zero() {
            return address;
        }
    }
}

/// `count` distinct random selectors.
pub fn random_selectors(rng: &mut impl Rng, count: usize) -> Vec<Selector> {
    let mut selectors = std::collections::BTreeSet::new();
    while selectors.len() < count {
        selectors.insert(Selector::new(rng.gen()));
    }
    selectors.into_iter().collect()
}
