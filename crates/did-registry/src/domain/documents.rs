//! # DID Document State Machine
//!
//! ```text
//! Absent ──create──→ Created(v=1) ──update_info──→ Updated(v=1)
//!                          │                             │
//!                          └──────upgrade_version───────→ Upgraded(v=n+1)
//! ```
//!
//! The owner is fixed at creation. Content updates never touch the version,
//! version upgrades never touch the content, and every mutation is gated on
//! the caller being the recorded owner.

use crate::domain::entities::DidDocument;
use crate::domain::value_objects::{Address, DocId};
use crate::errors::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version assigned to a freshly created document.
pub const INITIAL_VERSION: u64 = 1;

/// Document space of one storage context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStore {
    documents: BTreeMap<DocId, DidDocument>,
}

impl DocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a document.
    #[must_use]
    pub fn get(&self, doc_id: DocId) -> Option<&DidDocument> {
        self.documents.get(&doc_id)
    }

    /// Looks up a document, failing if it was never created.
    pub fn require(&self, doc_id: DocId) -> Result<&DidDocument, RegistryError> {
        self.get(doc_id)
            .ok_or(RegistryError::DocumentNotFound(doc_id))
    }

    /// Returns true if `doc_id` has been created.
    #[must_use]
    pub fn contains(&self, doc_id: DocId) -> bool {
        self.documents.contains_key(&doc_id)
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no document exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterates documents in id order.
    pub fn iter(&self) -> impl Iterator<Item = (DocId, &DidDocument)> + '_ {
        self.documents.iter().map(|(id, doc)| (*id, doc))
    }

    /// `Absent → Created(v=1)`.
    pub fn create(
        &mut self,
        owner: Address,
        doc_id: DocId,
        content: String,
    ) -> Result<&DidDocument, RegistryError> {
        if owner.is_zero() {
            return Err(RegistryError::ZeroAddress);
        }
        if self.contains(doc_id) {
            return Err(RegistryError::DocumentExists(doc_id));
        }
        let document = self.documents.entry(doc_id).or_insert(DidDocument {
            owner,
            content,
            version: INITIAL_VERSION,
        });
        Ok(document)
    }

    /// Replaces the content. Version is unchanged.
    pub fn update_info(
        &mut self,
        caller: Address,
        doc_id: DocId,
        content: String,
    ) -> Result<&DidDocument, RegistryError> {
        let document = self.owned_mut(caller, doc_id)?;
        document.content = content;
        Ok(document)
    }

    /// Bumps the version by exactly one. Returns the new version.
    pub fn upgrade_version(
        &mut self,
        caller: Address,
        doc_id: DocId,
    ) -> Result<u64, RegistryError> {
        let document = self.owned_mut(caller, doc_id)?;
        document.version = document
            .version
            .checked_add(1)
            .ok_or(RegistryError::VersionOverflow(doc_id))?;
        Ok(document.version)
    }

    fn owned_mut(
        &mut self,
        caller: Address,
        doc_id: DocId,
    ) -> Result<&mut DidDocument, RegistryError> {
        let document = self
            .documents
            .get_mut(&doc_id)
            .ok_or(RegistryError::DocumentNotFound(doc_id))?;
        if document.owner != caller {
            return Err(RegistryError::NotDocumentOwner { doc_id, caller });
        }
        Ok(document)
    }
}

// =============================================================================
// TESTS
// =============================================================================
