//! # Event Schema
//!
//! Every observable state change of a registry is announced by one of the
//! events below. Events reach indexers in two ways:
//!
//! - attached to the transaction [`Receipt`](crate::domain::Receipt), in emission order;
//! - published on the service's broadcast channel after the transaction commits.
//!
//! A reverted transaction publishes nothing.
//!
//! | Event | Emitted by | Fields |
//! |-------|-----------|--------|
//! | `ModuleAdded` | registry | module, selectors |
//! | `ModuleUpdated` | registry | old/new module, old/new selectors |
//! | `ModuleRemoved` | registry | module, selectors |
//! | `DIDCreated` | DID module | owner, doc id |
//! | `DIDUpdatedInfo` | DID module | doc id |
//! | `DIDVersionUpgraded` | DID module (v2) | doc id |

use crate::domain::entities::Log;
use crate::domain::value_objects::{Address, DocId, Selector};
use serde::{Deserialize, Serialize};

/// Domain events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RegistryEvent {
    /// Selectors were routed to a module.
    ModuleAdded {
        /// Implementing module.
        module: Address,
        /// Selectors routed.
        selectors: Vec<Selector>,
    },
    /// A module was swapped for another.
    ModuleUpdated {
        /// Previous module.
        old_module: Address,
        /// Replacement module.
        new_module: Address,
        /// Selectors released by the previous module.
        old_selectors: Vec<Selector>,
        /// Selectors routed to the replacement.
        new_selectors: Vec<Selector>,
    },
    /// Selectors were unrouted.
    ModuleRemoved {
        /// Module that lost the selectors.
        module: Address,
        /// Selectors released.
        selectors: Vec<Selector>,
    },
    /// A document was created.
    #[serde(rename = "DIDCreated")]
    DidCreated {
        /// Recorded owner.
        owner: Address,
        /// Document id.
        doc_id: DocId,
    },
    /// A document's content changed.
    #[serde(rename = "DIDUpdatedInfo")]
    DidUpdatedInfo {
        /// Document id.
        doc_id: DocId,
    },
    /// A document's version was bumped.
    #[serde(rename = "DIDVersionUpgraded")]
    DidVersionUpgraded {
        /// Document id.
        doc_id: DocId,
    },
}

impl RegistryEvent {
    /// Event name as seen by indexers.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ModuleAdded { .. } => topics::MODULE_ADDED,
            Self::ModuleUpdated { .. } => topics::MODULE_UPDATED,
            Self::ModuleRemoved { .. } => topics::MODULE_REMOVED,
            Self::DidCreated { .. } => topics::DID_CREATED,
            Self::DidUpdatedInfo { .. } => topics::DID_UPDATED_INFO,
            Self::DidVersionUpgraded { .. } => topics::DID_VERSION_UPGRADED,
        }
    }

    /// Returns true for selector-table events.
    #[must_use]
    pub fn is_module_event(&self) -> bool {
        matches!(
            self,
            Self::ModuleAdded { .. } | Self::ModuleUpdated { .. } | Self::ModuleRemoved { .. }
        )
    }
}

// =============================================================================
// EVENT TOPICS
// =============================================================================

/// Event names.
pub mod topics {
    /// `ModuleAdded`
    pub const MODULE_ADDED: &str = "ModuleAdded";
    /// `ModuleUpdated`
    pub const MODULE_UPDATED: &str = "ModuleUpdated";
    /// `ModuleRemoved`
    pub const MODULE_REMOVED: &str = "ModuleRemoved";
    /// `DIDCreated`
    pub const DID_CREATED: &str = "DIDCreated";
    /// `DIDUpdatedInfo`
    pub const DID_UPDATED_INFO: &str = "DIDUpdatedInfo";
    /// `DIDVersionUpgraded`
    pub const DID_VERSION_UPGRADED: &str = "DIDVersionUpgraded";
}

// =============================================================================
// EVENT FILTER
// =============================================================================

/// Subscription filter over committed logs.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    /// Only logs emitted by this address.
    pub address: Option<Address>,
    /// Only these event names. Empty matches all.
    pub names: Vec<&'static str>,
}

impl EventFilter {
    /// Matches every log.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches logs of one emitter.
    #[must_use]
    pub fn emitter(address: Address) -> Self {
        Self {
            address: Some(address),
            names: Vec::new(),
        }
    }

    /// Restricts to the given event names.
    #[must_use]
    pub fn with_names(mut self, names: &[&'static str]) -> Self {
        self.names.extend_from_slice(names);
        self
    }

    /// Returns true if `log` passes the filter.
    #[must_use]
    pub fn matches(&self, log: &Log) -> bool {
        if let Some(address) = self.address {
            if log.address != address {
                return false;
            }
        }
        self.names.is_empty() || self.names.contains(&log.event.name())
    }
}

// =============================================================================
// TESTS
// =============================================================================
