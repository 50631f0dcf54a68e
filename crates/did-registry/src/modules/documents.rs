//! # Documents Module
//!
//! Read-only document queries. The storage address is an explicit argument:
//! pass the registry address (as returned by `getStorageAddress`) to read the
//! registry's documents.

use crate::abi::{Function, ParamType, Token};
use crate::domain::value_objects::{Bytes, Selector, U256};
use crate::errors::RegistryError;
use crate::modules::decode_args;
use crate::ports::outbound::{find_function, CallFrame, Module};

/// `getDocumentOwner(address,uint256)`
pub const GET_DOCUMENT_OWNER: Function = Function {
    name: "getDocumentOwner",
    inputs: &[ParamType::Address, ParamType::Uint256],
    outputs: &[ParamType::Address],
};

/// `getDocumentVersion(address,uint256)`
pub const GET_DOCUMENT_VERSION: Function = Function {
    name: "getDocumentVersion",
    inputs: &[ParamType::Address, ParamType::Uint256],
    outputs: &[ParamType::Uint256],
};

/// Documents module interface.
pub const INTERFACE: &[Function] = &[GET_DOCUMENT_OWNER, GET_DOCUMENT_VERSION];

/// Documents module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentsModule;

impl Module for DocumentsModule {
    fn name(&self) -> &'static str {
        "documents"
    }

    fn interface(&self) -> &'static [Function] {
        INTERFACE
    }

    fn execute(
        &self,
        frame: &mut CallFrame<'_>,
        selector: Selector,
        args: &[u8],
    ) -> Result<Bytes, RegistryError> {
        let function = find_function(INTERFACE, selector)
            .ok_or(RegistryError::UnrecognizedOperation(selector))?;
        let [storage_address, doc_id] = decode_args(function, args)?;
        let storage_address = storage_address.into_address()?;
        let doc_id = doc_id.into_uint()?;

        let document = frame.documents_at(storage_address)?.require(doc_id)?;
        let output = if function.name == GET_DOCUMENT_OWNER.name {
            Token::Address(document.owner)
        } else {
            Token::Uint(U256::from(document.version))
        };
        Ok(function.encode_output(&[output])?)
    }
}
