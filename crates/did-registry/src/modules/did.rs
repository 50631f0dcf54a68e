//! # DID Modules
//!
//! Two versions of the DID document logic. Both operate on the document
//! space of whatever storage context they run in, so v2 can replace v1 behind
//! a registry and keep every document v1 created.
//!
//! | Function | v1 | v2 | Event |
//! |----------|----|----|-------|
//! | `createDID(address,uint256,string)` | ✓ | ✓ | `DIDCreated` |
//! | `updateDidInfo(uint256,string)` | ✓ | ✓ | `DIDUpdatedInfo` |
//! | `getStorageAddress()` | ✓ | ✓ | |
//! | `upgradeDidVersion(uint256)` | | ✓ | `DIDVersionUpgraded` |

use crate::abi::{Function, ParamType, Token};
use crate::domain::value_objects::{Bytes, Selector};
use crate::errors::RegistryError;
use crate::events::RegistryEvent;
use crate::modules::decode_args;
use crate::ports::outbound::{find_function, CallFrame, Module};

// =============================================================================
// INTERFACE
// =============================================================================

/// `createDID(address,uint256,string)`
pub const CREATE_DID: Function = Function {
    name: "createDID",
    inputs: &[ParamType::Address, ParamType::Uint256, ParamType::String],
    outputs: &[],
};

/// `updateDidInfo(uint256,string)`
pub const UPDATE_DID_INFO: Function = Function {
    name: "updateDidInfo",
    inputs: &[ParamType::Uint256, ParamType::String],
    outputs: &[],
};

/// `getStorageAddress()`
pub const GET_STORAGE_ADDRESS: Function = Function {
    name: "getStorageAddress",
    inputs: &[],
    outputs: &[ParamType::Address],
};

/// `upgradeDidVersion(uint256)`
pub const UPGRADE_DID_VERSION: Function = Function {
    name: "upgradeDidVersion",
    inputs: &[ParamType::Uint256],
    outputs: &[],
};

/// DID module v1 interface.
pub const INTERFACE_V1: &[Function] = &[CREATE_DID, UPDATE_DID_INFO, GET_STORAGE_ADDRESS];

/// DID module v2 interface.
pub const INTERFACE_V2: &[Function] = &[
    CREATE_DID,
    UPDATE_DID_INFO,
    GET_STORAGE_ADDRESS,
    UPGRADE_DID_VERSION,
];

// =============================================================================
// OPERATIONS
// =============================================================================

fn create_did(frame: &mut CallFrame<'_>, args: &[u8]) -> Result<Bytes, RegistryError> {
    let [owner, doc_id, content] = decode_args(&CREATE_DID, args)?;
    let owner = owner.into_address()?;
    let doc_id = doc_id.into_uint()?;

    frame
        .storage
        .documents
        .create(owner, doc_id, content.into_string()?)?;
    frame.emit(RegistryEvent::DidCreated { owner, doc_id });
    Ok(Bytes::new())
}

fn update_did_info(frame: &mut CallFrame<'_>, args: &[u8]) -> Result<Bytes, RegistryError> {
    let [doc_id, content] = decode_args(&UPDATE_DID_INFO, args)?;
    let doc_id = doc_id.into_uint()?;
    let caller = frame.caller;

    frame
        .storage
        .documents
        .update_info(caller, doc_id, content.into_string()?)?;
    frame.emit(RegistryEvent::DidUpdatedInfo { doc_id });
    Ok(Bytes::new())
}

fn get_storage_address(frame: &CallFrame<'_>) -> Result<Bytes, RegistryError> {
    Ok(GET_STORAGE_ADDRESS.encode_output(&[Token::Address(frame.storage_address)])?)
}

fn upgrade_did_version(frame: &mut CallFrame<'_>, args: &[u8]) -> Result<Bytes, RegistryError> {
    let [doc_id] = decode_args(&UPGRADE_DID_VERSION, args)?;
    let doc_id = doc_id.into_uint()?;
    let caller = frame.caller;

    frame.storage.documents.upgrade_version(caller, doc_id)?;
    frame.emit(RegistryEvent::DidVersionUpgraded { doc_id });
    Ok(Bytes::new())
}

fn execute_did(
    interface: &'static [Function],
    frame: &mut CallFrame<'_>,
    selector: Selector,
    args: &[u8],
) -> Result<Bytes, RegistryError> {
    let function =
        find_function(interface, selector).ok_or(RegistryError::UnrecognizedOperation(selector))?;
    match function.name {
        "createDID" => create_did(frame, args),
        "updateDidInfo" => update_did_info(frame, args),
        "getStorageAddress" => get_storage_address(frame),
        "upgradeDidVersion" => upgrade_did_version(frame, args),
        _ => Err(RegistryError::UnrecognizedOperation(selector)),
    }
}

// =============================================================================
// MODULES
// =============================================================================

/// DID module, version 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DidModuleV1;

impl Module for DidModuleV1 {
    fn name(&self) -> &'static str {
        "did-v1"
    }

    fn interface(&self) -> &'static [Function] {
        INTERFACE_V1
    }

    fn execute(
        &self,
        frame: &mut CallFrame<'_>,
        selector: Selector,
        args: &[u8],
    ) -> Result<Bytes, RegistryError> {
        execute_did(INTERFACE_V1, frame, selector, args)
    }
}

/// DID module, version 2. Adds version upgrades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DidModuleV2;

impl Module for DidModuleV2 {
    fn name(&self) -> &'static str {
        "did-v2"
    }

    fn interface(&self) -> &'static [Function] {
        INTERFACE_V2
    }

    fn execute(
        &self,
        frame: &mut CallFrame<'_>,
        selector: Selector,
        args: &[u8],
    ) -> Result<Bytes, RegistryError> {
        execute_did(INTERFACE_V2, frame, selector, args)
    }
}
