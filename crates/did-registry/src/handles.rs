//! # Typed Handles
//!
//! Bind a module interface to an address. A handle built on the registry
//! address routes through the selector table and runs against the registry's
//! storage; a handle built on a module's own address runs that module
//! against its own storage.
//!
//! ```ignore
//! let did = DidHandle::new(&service, registry);
//! did.create_did(alice, alice, DocId::from(500), "test").await?;
//!
//! let documents = DocumentsHandle::new(&service, registry);
//! let owner = documents.document_owner(registry, DocId::from(500)).await?;
//! ```

use crate::abi::{Function, Token};
use crate::domain::entities::Receipt;
use crate::domain::value_objects::{Address, DocId, Selector, U256};
use crate::errors::{AbiError, RegistryError};
use crate::modules::{did, documents, registry};
use crate::ports::inbound::{CallRequest, RegistryApi};

/// Caller used for read-only queries.
const ANONYMOUS: Address = Address::ZERO;

async fn send<A: RegistryApi + ?Sized>(
    api: &A,
    from: Address,
    to: Address,
    function: &Function,
    args: &[Token],
) -> Result<Receipt, RegistryError> {
    let data = function.encode_call(args)?;
    api.transact(CallRequest::new(from, to, data)).await
}

async fn query<A: RegistryApi + ?Sized>(
    api: &A,
    to: Address,
    function: &Function,
    args: &[Token],
) -> Result<Token, RegistryError> {
    let data = function.encode_call(args)?;
    let output = api.call(CallRequest::new(ANONYMOUS, to, data)).await?;
    let mut tokens = function.decode_output(output.as_slice())?.into_iter();
    tokens.next().ok_or_else(|| {
        AbiError::ArityMismatch {
            expected: 1,
            actual: 0,
        }
        .into()
    })
}

// =============================================================================
// REGISTRY ADMINISTRATION
// =============================================================================

/// Selector-table administration and introspection.
pub struct RegistryAdminHandle<'a, A: ?Sized> {
    api: &'a A,
    registry: Address,
}

impl<'a, A: RegistryApi + ?Sized> RegistryAdminHandle<'a, A> {
    /// Binds to the registry at `registry`.
    pub fn new(api: &'a A, registry: Address) -> Self {
        Self { api, registry }
    }

    /// Bound address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.registry
    }

    /// `addModule(module, selectors)`
    pub async fn add_module(
        &self,
        from: Address,
        module: Address,
        selectors: &[Selector],
    ) -> Result<Receipt, RegistryError> {
        let args = [Token::Address(module), Token::selectors(selectors)];
        send(self.api, from, self.registry, &registry::ADD_MODULE, &args).await
    }

    /// `updateModule(old, new, oldSelectors, newSelectors)`
    pub async fn update_module(
        &self,
        from: Address,
        old_module: Address,
        new_module: Address,
        old_selectors: &[Selector],
        new_selectors: &[Selector],
    ) -> Result<Receipt, RegistryError> {
        let args = [
            Token::Address(old_module),
            Token::Address(new_module),
            Token::selectors(old_selectors),
            Token::selectors(new_selectors),
        ];
        send(self.api, from, self.registry, &registry::UPDATE_MODULE, &args).await
    }

    /// `removeModule(module, selectors)`
    pub async fn remove_module(
        &self,
        from: Address,
        module: Address,
        selectors: &[Selector],
    ) -> Result<Receipt, RegistryError> {
        let args = [Token::Address(module), Token::selectors(selectors)];
        send(self.api, from, self.registry, &registry::REMOVE_MODULE, &args).await
    }

    /// `admin()`
    pub async fn admin(&self) -> Result<Address, RegistryError> {
        Ok(query(self.api, self.registry, &registry::ADMIN, &[])
            .await?
            .into_address()?)
    }

    /// `moduleAddress(selector)`; `None` when unrouted.
    pub async fn module_address(
        &self,
        selector: Selector,
    ) -> Result<Option<Address>, RegistryError> {
        let module = query(
            self.api,
            self.registry,
            &registry::MODULE_ADDRESS,
            &[Token::Selector(selector)],
        )
        .await?
        .into_address()?;
        Ok((!module.is_zero()).then_some(module))
    }

    /// `moduleSelectors(module)`
    pub async fn module_selectors(&self, module: Address) -> Result<Vec<Selector>, RegistryError> {
        Ok(query(
            self.api,
            self.registry,
            &registry::MODULE_SELECTORS,
            &[Token::Address(module)],
        )
        .await?
        .into_selectors()?)
    }

    /// `moduleAddresses()`
    pub async fn module_addresses(&self) -> Result<Vec<Address>, RegistryError> {
        Ok(query(self.api, self.registry, &registry::MODULE_ADDRESSES, &[])
            .await?
            .into_addresses()?)
    }
}

// =============================================================================
// DID
// =============================================================================

/// DID module interface (v1 and v2).
pub struct DidHandle<'a, A: ?Sized> {
    api: &'a A,
    target: Address,
}

impl<'a, A: RegistryApi + ?Sized> DidHandle<'a, A> {
    /// Binds to `target`.
    pub fn new(api: &'a A, target: Address) -> Self {
        Self { api, target }
    }

    /// `createDID(owner, docId, content)`
    pub async fn create_did(
        &self,
        from: Address,
        owner: Address,
        doc_id: DocId,
        content: &str,
    ) -> Result<Receipt, RegistryError> {
        let args = [
            Token::Address(owner),
            Token::Uint(doc_id),
            Token::String(content.to_string()),
        ];
        send(self.api, from, self.target, &did::CREATE_DID, &args).await
    }

    /// `updateDidInfo(docId, content)`
    pub async fn update_did_info(
        &self,
        from: Address,
        doc_id: DocId,
        content: &str,
    ) -> Result<Receipt, RegistryError> {
        let args = [Token::Uint(doc_id), Token::String(content.to_string())];
        send(self.api, from, self.target, &did::UPDATE_DID_INFO, &args).await
    }

    /// `upgradeDidVersion(docId)`; v2 only.
    pub async fn upgrade_did_version(
        &self,
        from: Address,
        doc_id: DocId,
    ) -> Result<Receipt, RegistryError> {
        send(
            self.api,
            from,
            self.target,
            &did::UPGRADE_DID_VERSION,
            &[Token::Uint(doc_id)],
        )
        .await
    }

    /// `getStorageAddress()`
    pub async fn storage_address(&self) -> Result<Address, RegistryError> {
        Ok(query(self.api, self.target, &did::GET_STORAGE_ADDRESS, &[])
            .await?
            .into_address()?)
    }
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// Documents module interface.
pub struct DocumentsHandle<'a, A: ?Sized> {
    api: &'a A,
    target: Address,
}

impl<'a, A: RegistryApi + ?Sized> DocumentsHandle<'a, A> {
    /// Binds to `target`.
    pub fn new(api: &'a A, target: Address) -> Self {
        Self { api, target }
    }

    /// `getDocumentOwner(storageAddress, docId)`
    pub async fn document_owner(
        &self,
        storage_address: Address,
        doc_id: DocId,
    ) -> Result<Address, RegistryError> {
        let args = [Token::Address(storage_address), Token::Uint(doc_id)];
        Ok(query(self.api, self.target, &documents::GET_DOCUMENT_OWNER, &args)
            .await?
            .into_address()?)
    }

    /// `getDocumentVersion(storageAddress, docId)`
    pub async fn document_version(
        &self,
        storage_address: Address,
        doc_id: DocId,
    ) -> Result<U256, RegistryError> {
        let args = [Token::Address(storage_address), Token::Uint(doc_id)];
        Ok(query(self.api, self.target, &documents::GET_DOCUMENT_VERSION, &args)
            .await?
            .into_uint()?)
    }
}
