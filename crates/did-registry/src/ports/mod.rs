//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the domain and the outside world.
//!
//! - **Driving Ports (Inbound)**: `RegistryApi`
//! - **Driven Ports (Outbound)**: `Module`, `StateView`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
