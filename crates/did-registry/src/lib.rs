//! # DID Registry - Pluggable Module Identity Registry
//!
//! A registry is a long-lived address that implements no business logic of
//! its own. It keeps a routing table from function selector to module
//! address and runs the owning module's code against the registry's own
//! storage. DID documents live in that storage, so the modules that manage
//! them can be swapped without migrating a single document.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Each selector routes to at most one module | `domain/selector_table.rs` - `SelectorTable::apply()` |
//! | Table cuts are all-or-nothing | `domain/selector_table.rs` - working copy swap |
//! | Only the admin mutates the table | `modules/registry.rs` - `require_admin()` |
//! | Document owner fixed at creation | `domain/documents.rs`, `domain/invariants.rs` |
//! | Version starts at 1, +1 per upgrade | `domain/documents.rs`, `domain/invariants.rs` |
//! | Failed transactions change nothing | `adapters/ledger.rs` - `InMemoryLedger::transact()` |
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Selector table | `domain/selector_table.rs` | `selector → module` routing |
//! | Documents | `domain/documents.rs` | DID document state machine |
//! | Call encoding | `abi.rs` | Selectors and argument tuples |
//! | Modules | `modules/` | Registry, DID v1/v2, Documents |
//! | Ledger | `adapters/ledger.rs` | Deployment, transactions, snapshots |
//! | Service | `service.rs` | Async host, event publication, stats |
//! | Handles | `handles.rs` | Typed call wrappers |
//!
//! ## Usage Example
//!
//! ```ignore
//! use did_registry::prelude::*;
//!
//! let service = RegistryService::default();
//! let registry = service.deploy_registry(admin).await?;
//! let did = service.deploy_code(admin, Arc::new(DidModuleV1)).await?;
//!
//! RegistryAdminHandle::new(&service, registry)
//!     .add_module(admin, did, &DidModuleV1.selectors())
//!     .await?;
//!
//! DidHandle::new(&service, registry)
//!     .create_did(alice, alice, DocId::from(500), "test")
//!     .await?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod abi;
pub mod adapters;
pub mod domain;
pub mod errors;
pub mod events;
pub mod handles;
pub mod modules;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{DidDocument, Log, Receipt, RegistryStorage};
    pub use crate::domain::documents::{DocumentStore, INITIAL_VERSION};
    pub use crate::domain::selector_table::{RouteChange, SelectorTable};

    // Value objects
    pub use crate::domain::value_objects::{Address, Bytes, DocId, Hash, Selector, U256};

    // Domain services
    pub use crate::domain::services::{compute_deployment_address, keccak256};

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, InvariantCheckResult, InvariantViolation,
    };

    // Call encoding
    pub use crate::abi::{Function, ParamType, Token};

    // Ports
    pub use crate::ports::inbound::{CallRequest, RegistryApi};
    pub use crate::ports::outbound::{CallFrame, Module, StateView};

    // Modules
    pub use crate::modules::{DidModuleV1, DidModuleV2, DocumentsModule, RegistryModule};

    // Events
    pub use crate::events::{topics, EventFilter, RegistryEvent};

    // Errors
    pub use crate::errors::{AbiError, ErrorKind, RegistryError};

    // Adapters
    pub use crate::adapters::InMemoryLedger;

    // Service
    pub use crate::service::{RegistryService, ServiceConfig, ServiceStats};

    // Handles
    pub use crate::handles::{DidHandle, DocumentsHandle, RegistryAdminHandle};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
