//! # In-Memory Ledger
//!
//! A serial, totally-ordered host for deployed modules.
//!
//! - Accounts hold code ([`Module`]) and storage ([`RegistryStorage`]).
//! - Deployment addresses derive from `(deployer, nonce)`.
//! - Transactions run against a working copy of the target's storage, which
//!   replaces the committed storage only if execution and the post-execution
//!   invariant checks both succeed. Logs of a failed transaction are dropped.
//! - Snapshots capture everything (accounts and nonces) for test isolation.

use crate::abi::split_call;
use crate::domain::entities::{Log, Receipt, RegistryStorage};
use crate::domain::invariants::{check_all_invariants, InvariantCheckResult};
use crate::domain::services::{compute_deployment_address, transaction_hash};
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::RegistryError;
use crate::ports::outbound::{CallFrame, Module, StateView};
use registry_telemetry::log_tx_event;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info};

// =============================================================================
// ACCOUNTS
// =============================================================================

/// A deployed account.
#[derive(Clone, Debug)]
pub struct Account {
    /// Executable code.
    pub code: Arc<dyn Module>,
    /// Persistent storage.
    pub storage: RegistryStorage,
}

#[derive(Clone, Debug, Default)]
struct LedgerState {
    accounts: BTreeMap<Address, Account>,
    nonces: BTreeMap<Address, u64>,
}

/// Result of executing a call, before commit.
struct Execution {
    storage: RegistryStorage,
    output: Bytes,
    logs: Vec<Log>,
}

// =============================================================================
// LEDGER
// =============================================================================

/// In-memory ledger.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: LedgerState,
    snapshots: Vec<(u64, LedgerState)>,
    next_snapshot_id: u64,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transactions and deployments sent by `address`.
    #[must_use]
    pub fn nonce(&self, address: Address) -> u64 {
        self.state.nonces.get(&address).copied().unwrap_or(0)
    }

    /// Number of deployed accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.state.accounts.len()
    }

    fn bump_nonce(&mut self, address: Address) -> u64 {
        let nonce = self.state.nonces.entry(address).or_insert(0);
        let current = *nonce;
        *nonce += 1;
        current
    }

    /// Deploys `code`; the new account's storage records `deployer` as admin.
    pub fn deploy(
        &mut self,
        deployer: Address,
        code: Arc<dyn Module>,
    ) -> Result<Address, RegistryError> {
        if deployer.is_zero() {
            return Err(RegistryError::ZeroAddress);
        }
        let nonce = self.bump_nonce(deployer);
        let address = compute_deployment_address(deployer, nonce);

        info!(
            deployer = ?deployer,
            address = ?address,
            code = code.name(),
            nonce,
            "Module deployed"
        );

        self.state.accounts.insert(
            address,
            Account {
                code,
                storage: RegistryStorage::with_admin(deployer),
            },
        );
        Ok(address)
    }

    /// Executes a transaction and commits it if it succeeds.
    ///
    /// The sender's nonce is consumed even when the transaction reverts.
    pub fn transact(
        &mut self,
        from: Address,
        to: Address,
        data: &[u8],
    ) -> Result<Receipt, RegistryError> {
        if from.is_zero() {
            return Err(RegistryError::ZeroAddress);
        }
        let nonce = self.bump_nonce(from);
        let tx_hash = transaction_hash(from, to, nonce, data);

        let execution = match self.execute(from, to, data) {
            Ok(execution) => execution,
            Err(e) => {
                log_tx_event!(
                    warn,
                    "Transaction reverted",
                    tx_hash,
                    from = ?from,
                    to = ?to,
                    error = %e
                );
                return Err(e);
            }
        };

        if let Some(account) = self.state.accounts.get_mut(&to) {
            account.storage = execution.storage;
        }

        log_tx_event!(debug, "Transaction committed", tx_hash, logs = execution.logs.len());

        Ok(Receipt {
            tx_hash,
            from,
            to,
            output: execution.output,
            logs: execution.logs,
        })
    }

    /// Executes a read-only call. Nothing is committed.
    pub fn call(&self, from: Address, to: Address, data: &[u8]) -> Result<Bytes, RegistryError> {
        self.execute(from, to, data).map(|execution| execution.output)
    }

    fn execute(&self, from: Address, to: Address, data: &[u8]) -> Result<Execution, RegistryError> {
        let account = self
            .state
            .accounts
            .get(&to)
            .ok_or(RegistryError::NoCode(to))?;
        let (selector, args) = split_call(data)?;

        let mut storage = account.storage.clone();
        let mut logs = Vec::new();
        let output = {
            let mut frame = CallFrame::new(from, to, &mut storage, self, &mut logs);
            account.code.execute(&mut frame, selector, args)?
        };

        if let InvariantCheckResult::Invalid(violations) =
            check_all_invariants(&account.storage, &storage)
        {
            let summary = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            error!(
                address = ?to,
                code = account.code.name(),
                %summary,
                "Storage invariant violated"
            );
            return Err(RegistryError::InvariantViolated(summary));
        }

        Ok(Execution {
            storage,
            output,
            logs,
        })
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    /// Captures the full ledger state.
    pub fn snapshot(&mut self) -> u64 {
        let id = self.next_snapshot_id;
        self.next_snapshot_id += 1;
        self.snapshots.push((id, self.state.clone()));
        debug!(snapshot = id, "Snapshot taken");
        id
    }

    /// Restores snapshot `id`, discarding it and every later snapshot.
    pub fn revert_to_snapshot(&mut self, id: u64) -> Result<(), RegistryError> {
        let position = self
            .snapshots
            .iter()
            .position(|(snapshot_id, _)| *snapshot_id == id)
            .ok_or(RegistryError::SnapshotNotFound(id))?;

        let mut discarded = self.snapshots.split_off(position).into_iter();
        if let Some((_, state)) = discarded.next() {
            self.state = state;
        }
        debug!(snapshot = id, "Reverted to snapshot");
        Ok(())
    }
}

impl StateView for InMemoryLedger {
    fn code_at(&self, address: Address) -> Option<Arc<dyn Module>> {
        self.state
            .accounts
            .get(&address)
            .map(|account| Arc::clone(&account.code))
    }

    fn storage_at(&self, address: Address) -> Option<&RegistryStorage> {
        self.state
            .accounts
            .get(&address)
            .map(|account| &account.storage)
    }
}

// =============================================================================
// TESTS
// =============================================================================
