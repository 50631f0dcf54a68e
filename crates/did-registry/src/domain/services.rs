//! # Domain Services
//!
//! Pure functions for address and hash derivation.
//! These functions are deterministic and have no side effects.

use crate::domain::value_objects::{Address, Hash};
use sha3::{Digest, Keccak256};

// =============================================================================
// DEPLOYMENT ADDRESS COMPUTATION
// =============================================================================

/// Computes the address of an account deployed by `deployer` at `nonce`.
///
/// Address = keccak256(rlp(\[deployer, nonce\]))\[12:\]
///
/// Same derivation as the `CREATE` opcode, so a deployer's N-th deployment
/// always lands at the same address.
#[must_use]
pub fn compute_deployment_address(deployer: Address, nonce: u64) -> Address {
    let deployer_bytes: &[u8] = deployer.as_bytes();
    let mut stream = rlp::RlpStream::new_list(2);
    stream.append(&deployer_bytes);
    stream.append(&nonce);
    let encoded = stream.out();

    let hash = Keccak256::digest(&encoded[..]);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..32]);
    Address::new(addr)
}

// =============================================================================
// HASHING
// =============================================================================

/// Computes keccak256 hash of data.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let hash = Keccak256::digest(data);
    Hash::new(hash.into())
}

/// Transaction hash: keccak256(from ++ to ++ nonce ++ data).
#[must_use]
pub fn transaction_hash(from: Address, to: Address, nonce: u64, data: &[u8]) -> Hash {
    let mut preimage = Vec::with_capacity(48 + data.len());
    preimage.extend_from_slice(from.as_bytes());
    preimage.extend_from_slice(to.as_bytes());
    preimage.extend_from_slice(&nonce.to_be_bytes());
    preimage.extend_from_slice(data);
    keccak256(&preimage)
}

// =============================================================================
// TESTS
// =============================================================================
