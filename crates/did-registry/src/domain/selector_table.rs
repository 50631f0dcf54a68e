//! # Selector Table
//!
//! The single source of truth for `selector → module` resolution.
//!
//! Batches of route changes are applied all-or-nothing: [`SelectorTable::apply`]
//! runs every change against a working copy and only swaps it in once the
//! whole batch has validated.

use crate::domain::value_objects::{Address, Selector};
use crate::errors::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One change to the routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteChange {
    /// Route `selectors` to `module`.
    ///
    /// A selector already routed to `module` is left as is; one routed to
    /// any other module is a conflict.
    Add {
        /// Implementing module.
        module: Address,
        /// Selectors to claim.
        selectors: Vec<Selector>,
    },
    /// Drop `selectors`, each of which must currently route to `module`.
    Remove {
        /// Module expected to own the selectors.
        module: Address,
        /// Selectors to release.
        selectors: Vec<Selector>,
    },
}

/// Ordered mapping from selector to implementing module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorTable {
    routes: BTreeMap<Selector, Address>,
}

impl SelectorTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a route.
    pub fn register(&mut self, selector: Selector, module: Address) {
        self.routes.insert(selector, module);
    }

    /// Removes a route, returning the module it pointed at.
    pub fn unregister(&mut self, selector: Selector) -> Option<Address> {
        self.routes.remove(&selector)
    }

    /// Looks up the module implementing `selector`.
    #[must_use]
    pub fn resolve(&self, selector: Selector) -> Option<Address> {
        self.routes.get(&selector).copied()
    }

    /// All selectors currently routed to `module`, ascending.
    #[must_use]
    pub fn selectors_of(&self, module: Address) -> Vec<Selector> {
        self.routes
            .iter()
            .filter(|(_, owner)| **owner == module)
            .map(|(selector, _)| *selector)
            .collect()
    }

    /// Distinct modules with at least one route, ascending.
    #[must_use]
    pub fn modules(&self) -> Vec<Address> {
        self.routes
            .values()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of routed selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if nothing is routed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates routes in selector order.
    pub fn iter(&self) -> impl Iterator<Item = (Selector, Address)> + '_ {
        self.routes.iter().map(|(s, a)| (*s, *a))
    }

    /// Applies a batch of changes atomically.
    ///
    /// On error the table is left exactly as it was.
    pub fn apply(&mut self, changes: &[RouteChange]) -> Result<(), RegistryError> {
        let mut next = self.clone();
        for change in changes {
            next.apply_one(change)?;
        }
        *self = next;
        Ok(())
    }

    fn apply_one(&mut self, change: &RouteChange) -> Result<(), RegistryError> {
        match change {
            RouteChange::Add { module, selectors } => {
                for &selector in selectors {
                    match self.resolve(selector) {
                        Some(existing) if existing != *module => {
                            return Err(RegistryError::SelectorConflict { selector, existing });
                        }
                        Some(_) => {}
                        None => self.register(selector, *module),
                    }
                }
            }
            RouteChange::Remove { module, selectors } => {
                for &selector in selectors {
                    match self.resolve(selector) {
                        Some(owner) if owner == *module => {
                            self.unregister(selector);
                        }
                        actual => {
                            return Err(RegistryError::SelectorNotOwned {
                                selector,
                                expected: *module,
                                actual,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
