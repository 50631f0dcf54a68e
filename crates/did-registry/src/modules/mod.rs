//! # Deployable Modules
//!
//! Concrete [`Module`](crate::ports::Module) implementations.
//!
//! | Module | Interface | Notes |
//! |--------|-----------|-------|
//! | [`RegistryModule`] | `addModule`, `updateModule`, `removeModule`, introspection | forwards everything else through its selector table |
//! | [`DidModuleV1`] | `createDID`, `updateDidInfo`, `getStorageAddress` | |
//! | [`DidModuleV2`] | v1 + `upgradeDidVersion` | drop-in replacement over the same storage |
//! | [`DocumentsModule`] | `getDocumentOwner`, `getDocumentVersion` | read-only |

pub mod did;
pub mod documents;
pub mod registry;

pub use did::{DidModuleV1, DidModuleV2};
pub use documents::DocumentsModule;
pub use registry::RegistryModule;

use crate::abi::{Function, Token};
use crate::errors::{AbiError, RegistryError};

/// Decodes the arguments of `function` into a fixed-size array.
pub(crate) fn decode_args<const N: usize>(
    function: &Function,
    args: &[u8],
) -> Result<[Token; N], RegistryError> {
    let tokens = function.decode_input(args)?;
    let arity = tokens.len();
    tokens.try_into().map_err(|_| {
        RegistryError::from(AbiError::ArityMismatch {
            expected: N,
            actual: arity,
        })
    })
}
