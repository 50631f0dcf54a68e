//! # Core Domain Entities
//!
//! Documents, per-account storage, logs and receipts.

use crate::domain::documents::DocumentStore;
use crate::domain::selector_table::SelectorTable;
use crate::domain::value_objects::{Address, Bytes, Hash};
use crate::events::RegistryEvent;
use serde::{Deserialize, Serialize};

// =============================================================================
// DID DOCUMENT
// =============================================================================

/// A DID document as held in registry storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidDocument {
    /// Set once at creation.
    pub owner: Address,
    /// Opaque document body.
    pub content: String,
    /// Starts at 1; bumped only by version upgrades.
    pub version: u64,
}

// =============================================================================
// REGISTRY STORAGE
// =============================================================================

/// Persistent storage of one account.
///
/// Every module version reads and writes this same struct, so its layout is
/// a frozen schema: fields may be appended, never reshaped or removed.
/// Every deployed account gets one, with its deployer as admin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStorage {
    /// Sole identity allowed to mutate `routes`.
    pub admin: Address,
    /// Selector routing table.
    pub routes: SelectorTable,
    /// DID document space.
    pub documents: DocumentStore,
}

impl RegistryStorage {
    /// Storage for a new registry administered by `admin`.
    #[must_use]
    pub fn with_admin(admin: Address) -> Self {
        Self {
            admin,
            ..Self::default()
        }
    }
}

// =============================================================================
// LOGS & RECEIPTS
// =============================================================================

/// An event emitted during execution, tagged with the storage context it ran in.
///
/// Under delegated execution the emitter is the registry, not the module
/// whose code produced the event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Emitting address.
    pub address: Address,
    /// Event payload.
    pub event: RegistryEvent,
}

/// Outcome of a committed transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Transaction hash.
    pub tx_hash: Hash,
    /// Caller.
    pub from: Address,
    /// Target account.
    pub to: Address,
    /// Return data.
    pub output: Bytes,
    /// Logs in emission order.
    pub logs: Vec<Log>,
}

impl Receipt {
    /// Returns true if any log carries `event`.
    #[must_use]
    pub fn emitted(&self, event: &RegistryEvent) -> bool {
        self.logs.iter().any(|log| &log.event == event)
    }

    /// Events in emission order.
    pub fn events(&self) -> impl Iterator<Item = &RegistryEvent> {
        self.logs.iter().map(|log| &log.event)
    }
}
