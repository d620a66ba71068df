//! # Merkle Membership Trees
//!
//! A binary Merkle tree over an eligibility set, built for one job: let a
//! contract commit to tens of thousands of addresses with a single 32-byte
//! root, then check any claimant's membership in `O(log n)` hashes.
//!
//! ## Canonical pairing
//!
//! At every level, sibling pairs are ordered by comparing the two digests as
//! byte sequences (smaller first) before concatenation. A verifier folding a
//! leaf up the tree therefore never needs to know whether each sibling sat
//! on the left or the right — the ordering rule reconstructs it. This halves
//! proof metadata and eliminates the classic position-confusion bug where a
//! proof verifies against the wrong branch.
//!
//! ## Determinism
//!
//! The root is a function of set membership and nothing else. Leaf hashes
//! are sorted and deduplicated before the first pairing pass, so two
//! parties that agree on *who* is eligible compute the same root regardless
//! of the order they enumerated the accounts in.
//!
//! ## Odd levels
//!
//! An unpaired node at the end of a level is promoted unchanged to the next
//! level. No self-pairing, no duplication — duplication is how Bitcoin got
//! CVE-2012-2459, and a promoted hash keeps proofs one element shorter for
//! the promoted branch.

use thiserror::Error;

use crate::crypto::hash::{sha256_array, sha256_multi};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while building roots or proofs.
#[derive(Debug, Error)]
pub enum MerkleError {
    /// Tried to build a tree over zero keys. There is no meaningful root
    /// for an empty set, and we refuse to invent a sentinel for one.
    #[error("cannot build a merkle tree from an empty key set")]
    EmptyInput,

    /// Asked for a proof for a key that is not in the eligibility set.
    #[error("key not present in the eligibility set: {0}")]
    KeyNotFound(String),
}

// ---------------------------------------------------------------------------
// Hashing rules
// ---------------------------------------------------------------------------

/// Hashes an eligibility key into its leaf digest.
///
/// Identical keys always produce identical leaves — the tree's determinism
/// rests on this, so the leaf is nothing more than the SHA-256 of the key's
/// bytes. Keys are opaque to this module; addresses, hex pubkeys, and
/// bech32 strings all work.
pub fn leaf_hash(key: &str) -> [u8; 32] {
    sha256_array(key.as_bytes())
}

/// Hashes two sibling digests into their parent.
///
/// The pair is ordered smaller-first by byte-lexicographic comparison
/// before concatenation. This is the canonical-pairing rule: verification
/// applies the same comparison, so proofs carry no left/right flags.
fn parent_hash(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    if a <= b {
        sha256_multi(&[a, b])
    } else {
        sha256_multi(&[b, a])
    }
}

/// Hashes every key to a leaf, then sorts and deduplicates the result.
///
/// Sorting is what makes the root insertion-order independent; dedup makes
/// it a function of the *set* rather than the listing.
fn leaf_level<K: AsRef<str>>(keys: &[K]) -> Vec<[u8; 32]> {
    let mut leaves: Vec<[u8; 32]> = keys.iter().map(|k| leaf_hash(k.as_ref())).collect();
    leaves.sort_unstable();
    leaves.dedup();
    leaves
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Builds the Merkle root committing to the given eligibility set.
///
/// Deterministic: the same set of keys yields the same root on every
/// machine, in any enumeration order, duplicates ignored. A single-key set
/// has its leaf hash as the root.
///
/// # Errors
///
/// Returns [`MerkleError::EmptyInput`] if `keys` is empty.
pub fn build_root<K: AsRef<str>>(keys: &[K]) -> Result<[u8; 32], MerkleError> {
    let mut level = leaf_level(keys);
    if level.is_empty() {
        return Err(MerkleError::EmptyInput);
    }

    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len() / 2 + 1);
        for chunk in level.chunks(2) {
            if chunk.len() == 2 {
                next.push(parent_hash(&chunk[0], &chunk[1]));
            } else {
                // Unpaired node at the end of an odd level: promote unchanged.
                next.push(chunk[0]);
            }
        }
        level = next;
    }

    Ok(level[0])
}

/// Builds the sibling path proving that `key` is a member of `keys`.
///
/// The proof is the ordered sequence of sibling digests from the key's leaf
/// up to (but excluding) the root. Feed it to [`verify`] together with the
/// root from [`build_root`] over the same set. Proof length is at most
/// `ceil(log2(n))`; promoted levels contribute no element.
///
/// # Errors
///
/// Returns [`MerkleError::EmptyInput`] if `keys` is empty.
/// Returns [`MerkleError::KeyNotFound`] if `key` is not in `keys`.
pub fn build_proof<K: AsRef<str>>(key: &str, keys: &[K]) -> Result<Vec<[u8; 32]>, MerkleError> {
    let mut level = leaf_level(keys);
    if level.is_empty() {
        return Err(MerkleError::EmptyInput);
    }

    let target = leaf_hash(key);
    // Leaves are sorted, so membership is a binary search.
    let mut index = level
        .binary_search(&target)
        .map_err(|_| MerkleError::KeyNotFound(key.to_string()))?;

    let mut proof = Vec::new();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len() / 2 + 1);
        for (pair, chunk) in level.chunks(2).enumerate() {
            if chunk.len() == 2 {
                if index == 2 * pair {
                    proof.push(chunk[1]);
                } else if index == 2 * pair + 1 {
                    proof.push(chunk[0]);
                }
                next.push(parent_hash(&chunk[0], &chunk[1]));
            } else {
                // Promoted node: carries no sibling, contributes no proof
                // element.
                next.push(chunk[0]);
            }
            if index == 2 * pair || index == 2 * pair + 1 {
                index = pair;
            }
        }
        level = next;
    }

    Ok(proof)
}

/// Verifies a membership proof against a root.
///
/// Folds the key's leaf hash with each proof element under the canonical
/// pairing rule and compares the result to `root` for exact equality. Pure
/// and total: a malformed or truncated proof simply yields `false`, never
/// an error. Callers decide what a rejected proof means.
pub fn verify(root: &[u8; 32], key: &str, proof: &[[u8; 32]]) -> bool {
    let mut computed = leaf_hash(key);
    for sibling in proof {
        computed = parent_hash(&computed, sibling);
    }
    computed == *root
}
