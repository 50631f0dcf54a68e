//! # Integration Flows
//!
//! End-to-end flows through [`RegistryService`](did_registry::service::RegistryService):
//! deployment, routing, document lifecycle, upgrades and isolation.

pub mod did_lifecycle;
pub mod isolation;
