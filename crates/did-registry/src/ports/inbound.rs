//! # Driving Ports (API - Inbound)
//!
//! The interface exposed to callers: deployment, transactions, read-only
//! calls and snapshot isolation. [`RegistryService`](crate::service::RegistryService)
//! is the production implementation; the typed handles in
//! [`handles`](crate::handles) are written against this trait only.

use crate::domain::entities::Receipt;
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::RegistryError;
use crate::ports::outbound::Module;
use async_trait::async_trait;
use std::sync::Arc;

/// A call submitted by an external account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    /// Calling account. Becomes the frame's `caller`.
    pub from: Address,
    /// Target account.
    pub to: Address,
    /// Selector-prefixed call data.
    pub data: Bytes,
}

impl CallRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(from: Address, to: Address, data: Bytes) -> Self {
        Self { from, to, data }
    }
}

/// Primary API of the registry host.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Deploys `code` on behalf of `deployer`.
    ///
    /// The new account's storage records `deployer` as admin. The address is
    /// derived from the deployer and its nonce.
    async fn deploy(
        &self,
        deployer: Address,
        code: Arc<dyn Module>,
    ) -> Result<Address, RegistryError>;

    /// Executes a state-changing transaction. All-or-nothing.
    async fn transact(&self, request: CallRequest) -> Result<Receipt, RegistryError>;

    /// Executes a read-only call. Never changes state or publishes logs.
    async fn call(&self, request: CallRequest) -> Result<Bytes, RegistryError>;

    /// Captures the whole ledger state. Returns an opaque id.
    async fn snapshot(&self) -> u64;

    /// Restores the state captured by `id`, discarding `id` and every later
    /// snapshot.
    async fn revert_to_snapshot(&self, id: u64) -> Result<(), RegistryError>;
}
