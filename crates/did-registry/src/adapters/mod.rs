//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete hosts for the ports.
//!
//! - [`InMemoryLedger`]: implements [`StateView`](crate::ports::StateView)
//!   and executes transactions against deployed [`Module`](crate::ports::Module)s.

pub mod ledger;

pub use ledger::*;
