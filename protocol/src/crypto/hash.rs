//! # Hashing Utilities
//!
//! SHA-256 helpers used by the Merkle subsystem. The choice of SHA-256 is
//! deliberate: eligibility snapshots and claim proofs are produced by
//! external tooling on other chains, and SHA-256 is the lowest common
//! denominator that every wallet SDK can reproduce byte-for-byte.
//!
//! Both a `Vec<u8>` and a `[u8; 32]` variant exist because half the callers
//! want to chain digests into further hashing and the other half want a
//! fixed-size type that propagates naturally through the tree code.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// Returns a 32-byte digest as a `Vec<u8>`. For the fixed-size variant used
/// in the Merkle tree hot path, see [`sha256_array`].
///
/// # Example
///
/// ```
/// use airdrop_protocol::crypto::sha256;
///
/// let hash = sha256(b"nova airdrop");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
///
/// Same as [`sha256`] but returns `[u8; 32]` for callers that want a
/// fixed-size type without the heap allocation. This is the workhorse of the
/// Merkle tree code, where the array type propagates through every level.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices together without concatenation overhead.
///
/// Instead of allocating a buffer to concatenate inputs, we feed them
/// sequentially into the hasher. Same result, less allocation. Used by the
/// Merkle tree to hash sibling pairs `(left || right)` without a temporary
/// 64-byte buffer per node.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}
