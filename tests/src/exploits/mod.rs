//! # Exploits
//!
//! Adversarial callers and misbehaving module code. Every attack must revert
//! and leave routes, admin and documents exactly as they were.

pub mod access_control;
pub mod storage_tampering;
