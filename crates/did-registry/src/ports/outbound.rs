//! # Driven Ports (SPI - Outbound)
//!
//! The contract between the ledger and the code it runs.
//!
//! - [`Module`]: executable code deployed at an address. The registry, the
//!   DID modules and the documents module all implement it.
//! - [`StateView`]: read access to committed accounts, supplied by the ledger.
//! - [`CallFrame`]: one execution context. Under delegated execution the
//!   frame keeps the registry's storage and caller and only swaps the code.

use crate::abi::Function;
use crate::domain::documents::DocumentStore;
use crate::domain::entities::{Log, RegistryStorage};
use crate::domain::value_objects::{Address, Bytes, Selector};
use crate::errors::RegistryError;
use crate::events::RegistryEvent;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// MODULE (deployable code)
// =============================================================================

/// Code that can be deployed at an address and invoked by selector.
///
/// Implementations must be stateless: everything persistent lives in the
/// [`RegistryStorage`] handed over through the frame.
pub trait Module: Send + Sync {
    /// Human-readable name, used in logs.
    fn name(&self) -> &'static str;

    /// Functions this code implements.
    fn interface(&self) -> &'static [Function];

    /// Selectors of [`Self::interface`], in declaration order.
    fn selectors(&self) -> Vec<Selector> {
        self.interface().iter().map(Function::selector).collect()
    }

    /// Returns true if `selector` belongs to [`Self::interface`].
    fn implements(&self, selector: Selector) -> bool {
        find_function(self.interface(), selector).is_some()
    }

    /// Executes `selector` with ABI-encoded `args` inside `frame`.
    fn execute(
        &self,
        frame: &mut CallFrame<'_>,
        selector: Selector,
        args: &[u8],
    ) -> Result<Bytes, RegistryError>;
}

impl fmt::Debug for dyn Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Module({})", self.name())
    }
}

/// Looks up the function of `interface` whose selector is `selector`.
#[must_use]
pub fn find_function(
    interface: &'static [Function],
    selector: Selector,
) -> Option<&'static Function> {
    interface.iter().find(|f| f.selector() == selector)
}

// =============================================================================
// STATE VIEW (committed ledger state)
// =============================================================================

/// Read-only view of committed accounts.
pub trait StateView {
    /// Code deployed at `address`, if any.
    fn code_at(&self, address: Address) -> Option<Arc<dyn Module>>;

    /// Committed storage of `address`, if it is a deployed account.
    fn storage_at(&self, address: Address) -> Option<&RegistryStorage>;
}

// =============================================================================
// CALL FRAME
// =============================================================================

/// One execution context.
///
/// `storage` is the working copy of the account at `storage_address`; the
/// ledger commits it only if the whole transaction succeeds.
pub struct CallFrame<'a> {
    /// Original caller. Preserved across delegation.
    pub caller: Address,
    /// Account whose storage is being used.
    pub storage_address: Address,
    /// Account whose code is running.
    pub code_address: Address,
    /// Working storage.
    pub storage: &'a mut RegistryStorage,
    state: &'a dyn StateView,
    logs: &'a mut Vec<Log>,
}

impl<'a> CallFrame<'a> {
    /// A frame running the code stored at `address` against its own storage.
    pub fn new(
        caller: Address,
        address: Address,
        storage: &'a mut RegistryStorage,
        state: &'a dyn StateView,
        logs: &'a mut Vec<Log>,
    ) -> Self {
        Self {
            caller,
            storage_address: address,
            code_address: address,
            storage,
            state,
            logs,
        }
    }

    /// Returns true if code runs in someone else's storage.
    #[must_use]
    pub fn is_delegated(&self) -> bool {
        self.storage_address != self.code_address
    }

    /// Committed ledger state.
    #[must_use]
    pub fn state(&self) -> &dyn StateView {
        self.state
    }

    /// A child frame running `code_address` with this frame's storage,
    /// caller and log sink.
    pub fn delegate(&mut self, code_address: Address) -> CallFrame<'_> {
        CallFrame {
            caller: self.caller,
            storage_address: self.storage_address,
            code_address,
            storage: &mut *self.storage,
            state: self.state,
            logs: &mut *self.logs,
        }
    }

    /// Records `event` as emitted by the storage address.
    pub fn emit(&mut self, event: RegistryEvent) {
        self.logs.push(Log {
            address: self.storage_address,
            event,
        });
    }

    /// Document space of `address`.
    ///
    /// The running storage context sees its own uncommitted writes; every
    /// other address is read from committed state.
    pub fn documents_at(&self, address: Address) -> Result<&DocumentStore, RegistryError> {
        if address == self.storage_address {
            return Ok(&self.storage.documents);
        }
        self.state
            .storage_at(address)
            .map(|storage| &storage.documents)
            .ok_or(RegistryError::StorageNotFound(address))
    }
}

// =============================================================================
// TESTS
// =============================================================================
