//! # Domain Invariants
//!
//! Post-conditions every committed transaction must satisfy, checked on the
//! storage before and after execution. A violation means a module broke the
//! shared storage contract; the ledger reverts such a transaction.
//!
//! | Invariant | Check |
//! |-----------|-------|
//! | Admin is fixed at creation | [`check_admin_invariant`] |
//! | Documents are never deleted | [`check_document_retention_invariant`] |
//! | Owner is set exactly once | [`check_owner_invariant`] |
//! | Versions start at 1 and never decrease | [`check_version_invariant`] |

use crate::domain::documents::INITIAL_VERSION;
use crate::domain::entities::RegistryStorage;
use crate::domain::value_objects::{Address, DocId};
use std::fmt;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// The administrator never changes.
#[must_use]
pub fn check_admin_invariant(before: &RegistryStorage, after: &RegistryStorage) -> bool {
    before.admin == after.admin
}

/// Every document that existed before still exists.
#[must_use]
pub fn check_document_retention_invariant(
    before: &RegistryStorage,
    after: &RegistryStorage,
) -> Option<DocId> {
    before
        .documents
        .iter()
        .map(|(id, _)| id)
        .find(|id| !after.documents.contains(*id))
}

/// Owners of pre-existing documents are unchanged.
#[must_use]
pub fn check_owner_invariant(
    before: &RegistryStorage,
    after: &RegistryStorage,
) -> Option<(DocId, Address, Address)> {
    before.documents.iter().find_map(|(id, old)| {
        after
            .documents
            .get(id)
            .filter(|new| new.owner != old.owner)
            .map(|new| (id, old.owner, new.owner))
    })
}

/// New documents start at version 1; existing ones never go backwards.
#[must_use]
pub fn check_version_invariant(
    before: &RegistryStorage,
    after: &RegistryStorage,
) -> Option<(DocId, u64, u64)> {
    after.documents.iter().find_map(|(id, new)| {
        let floor = before
            .documents
            .get(id)
            .map_or(INITIAL_VERSION, |old| old.version);
        let fresh_ok = before.documents.contains(id) || new.version == INITIAL_VERSION;
        (new.version < floor || !fresh_ok).then_some((id, floor, new.version))
    })
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(
    before: &RegistryStorage,
    after: &RegistryStorage,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_admin_invariant(before, after) {
        violations.push(InvariantViolation::AdminChanged {
            before: before.admin,
            after: after.admin,
        });
    }

    if let Some(doc_id) = check_document_retention_invariant(before, after) {
        violations.push(InvariantViolation::DocumentDeleted { doc_id });
    }

    if let Some((doc_id, before, after)) = check_owner_invariant(before, after) {
        violations.push(InvariantViolation::OwnerChanged {
            doc_id,
            before,
            after,
        });
    }

    if let Some((doc_id, expected_at_least, actual)) = check_version_invariant(before, after) {
        violations.push(InvariantViolation::VersionRegressed {
            doc_id,
            expected_at_least,
            actual,
        });
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Admin field rewritten.
    AdminChanged { before: Address, after: Address },
    /// A document disappeared.
    DocumentDeleted { doc_id: DocId },
    /// A document changed hands.
    OwnerChanged {
        doc_id: DocId,
        before: Address,
        after: Address,
    },
    /// A version went backwards or a new document skipped version 1.
    VersionRegressed {
        doc_id: DocId,
        expected_at_least: u64,
        actual: u64,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdminChanged { before, after } => {
                write!(f, "admin changed: {before:?} -> {after:?}")
            }
            Self::DocumentDeleted { doc_id } => write!(f, "document {doc_id} deleted"),
            Self::OwnerChanged {
                doc_id,
                before,
                after,
            } => write!(f, "document {doc_id} owner changed: {before:?} -> {after:?}"),
            Self::VersionRegressed {
                doc_id,
                expected_at_least,
                actual,
            } => write!(
                f,
                "document {doc_id} version {actual} below {expected_at_least}"
            ),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
