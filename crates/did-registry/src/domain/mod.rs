//! # Domain Layer (Inner Hexagon)
//!
//! Pure registry logic: routing, documents, invariants.
//! NO I/O, NO async.
//!
//! - Dependencies point INWARD only (adapters depend on this, not vice versa).

pub mod documents;
pub mod entities;
pub mod invariants;
pub mod selector_table;
pub mod services;
pub mod value_objects;

pub use documents::*;
pub use entities::*;
pub use invariants::*;
pub use selector_table::*;
pub use services::*;
pub use value_objects::*;
