//! # DID Registry Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Shared deployments and well-known accounts
//! │
//! ├── integration/      # End-to-end flows through RegistryService
//! │   ├── did_lifecycle.rs
//! │   ├── module_upgrade.rs
//! │   ├── module_removal.rs
//! │   ├── isolation.rs
//! │   ├── metrics_export.rs
//! │   └── event_stream.rs
//! │
//! └── exploits/         # Adversarial callers and misbehaving modules
//!     ├── access_control.rs
//!     ├── selector_hijack.rs
//!     └── storage_tampering.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p registry-tests
//!
//! # By category
//! cargo test -p registry-tests integration::
//! cargo test -p registry-tests exploits::
//!
//! # Benchmarks
//! cargo bench -p registry-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod exploits;
pub mod fixtures;
pub mod integration;
