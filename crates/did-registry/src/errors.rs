//! # Error Types
//!
//! All error types for registry dispatch, module execution and call encoding.
//!
//! Every [`RegistryError`] reverts the transaction that raised it: the ledger
//! discards the working copy of storage and every log emitted so far.

use crate::domain::value_objects::{Address, DocId, Selector};
use thiserror::Error;

// =============================================================================
// REGISTRY ERRORS
// =============================================================================

/// Coarse classification of a [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller lacks the capability for the operation.
    Authorization,
    /// A referenced document, selector, account or snapshot is missing.
    NotFound,
    /// The operation would overwrite state owned by someone else.
    Conflict,
    /// No module implements the requested selector.
    Unrecognized,
    /// Malformed arguments or call data.
    InvalidInput,
}

/// Errors that revert a registry transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A non-administrator attempted to mutate the selector table.
    #[error("caller {caller:?} is not the registry admin")]
    Unauthorized {
        /// The rejected caller.
        caller: Address,
    },

    /// A non-owner attempted to mutate a document.
    #[error("Only document owner")]
    NotDocumentOwner {
        /// Document being mutated.
        doc_id: DocId,
        /// The rejected caller.
        caller: Address,
    },

    /// The document id has never been created in this storage.
    #[error("document {0} does not exist")]
    DocumentNotFound(DocId),

    /// The document id is already taken.
    #[error("document {0} already exists")]
    DocumentExists(DocId),

    /// The version counter cannot be incremented further.
    #[error("document {0} version counter exhausted")]
    VersionOverflow(DocId),

    /// A selector does not resolve to the module the caller named.
    #[error("selector {selector} is not owned by {expected:?} (owner: {actual:?})")]
    SelectorNotOwned {
        /// The selector in question.
        selector: Selector,
        /// The module the caller expected.
        expected: Address,
        /// The module currently registered, if any.
        actual: Option<Address>,
    },

    /// A selector is already routed to a different module.
    #[error("selector {selector} already routed to {existing:?}")]
    SelectorConflict {
        /// The contested selector.
        selector: Selector,
        /// The module currently owning it.
        existing: Address,
    },

    /// No module implements the selector.
    #[error("unrecognized operation: {0}")]
    UnrecognizedOperation(Selector),

    /// The target address has no deployed code.
    #[error("no code deployed at {0:?}")]
    NoCode(Address),

    /// The address holds no storage that could contain documents.
    #[error("no storage at {0:?}")]
    StorageNotFound(Address),

    /// Snapshot id is unknown or was already reverted.
    #[error("snapshot {0} not found")]
    SnapshotNotFound(u64),

    /// A module cut carried no selectors.
    #[error("selector set is empty")]
    EmptySelectorSet,

    /// A module cut carried more selectors than the configured bound.
    #[error("selector set too large: {size} > {max}")]
    TooManySelectors {
        /// Selectors submitted.
        size: usize,
        /// Configured bound.
        max: usize,
    },

    /// The zero address was supplied where an account is required.
    #[error("zero address not allowed")]
    ZeroAddress,

    /// Module code broke a storage invariant; the transaction is reverted.
    #[error("storage invariant violated: {0}")]
    InvariantViolated(String),

    /// Call data could not be decoded.
    #[error("abi error: {0}")]
    Abi(#[from] AbiError),
}

impl RegistryError {
    /// Classifies this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } | Self::NotDocumentOwner { .. } => ErrorKind::Authorization,
            Self::DocumentNotFound(_)
            | Self::SelectorNotOwned { .. }
            | Self::NoCode(_)
            | Self::StorageNotFound(_)
            | Self::SnapshotNotFound(_) => ErrorKind::NotFound,
            Self::DocumentExists(_)
            | Self::VersionOverflow(_)
            | Self::SelectorConflict { .. }
            | Self::InvariantViolated(_) => ErrorKind::Conflict,
            Self::UnrecognizedOperation(_) => ErrorKind::Unrecognized,
            Self::EmptySelectorSet
            | Self::TooManySelectors { .. }
            | Self::ZeroAddress
            | Self::Abi(_) => ErrorKind::InvalidInput,
        }
    }

    /// Returns true for authorization failures.
    #[must_use]
    pub fn is_authorization(&self) -> bool {
        self.kind() == ErrorKind::Authorization
    }
}

// =============================================================================
// ABI ERRORS
// =============================================================================

/// Errors from encoding or decoding call data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Call data shorter than the 4-byte selector.
    #[error("call data too short for selector: {0} bytes")]
    MissingSelector(usize),

    /// Buffer ended before the value at `offset` could be read.
    #[error("unexpected end of data at offset {offset} (need {needed} bytes)")]
    UnexpectedEof {
        /// Offset of the failed read.
        offset: usize,
        /// Bytes required.
        needed: usize,
    },

    /// A length or offset word does not fit in memory.
    #[error("length or offset out of range at offset {0}")]
    OffsetOutOfRange(usize),

    /// Address word has non-zero padding.
    #[error("invalid address padding at offset {0}")]
    InvalidAddress(usize),

    /// String payload is not UTF-8.
    #[error("string is not valid utf-8")]
    InvalidUtf8,

    /// Token does not match the declared parameter type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Declared type.
        expected: String,
        /// Supplied token kind.
        actual: String,
    },

    /// Wrong number of arguments.
    #[error("argument count mismatch: expected {expected}, got {actual}")]
    ArityMismatch {
        /// Declared arity.
        expected: usize,
        /// Supplied arity.
        actual: usize,
    },
}

// =============================================================================
// TESTS
// =============================================================================
