//! # Cryptographic Primitives for the Airdrop Suite
//!
//! Everything hash-shaped in the distribution engine flows through here.
//! There is exactly one hash function in this crate — SHA-256 — and that is
//! a feature, not a limitation.
//!
//! ## Why SHA-256 and nothing else
//!
//! Airdrop eligibility snapshots are taken on *other* chains, and the proofs
//! claimants submit are generated by external wallet tooling in whatever
//! language the claimant's ecosystem speaks. SHA-256 is the one hash function
//! every one of those toolchains ships out of the box. A faster NOVA-native
//! hash would buy us microseconds and cost us every third-party integrator.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. These are thin, type-safe wrappers around the audited `sha2`
//! implementation. If you're tempted to optimize them, please reconsider.

pub mod hash;

// Re-export the things people actually need so they don't have to memorize
// our module hierarchy.
pub use hash::{sha256, sha256_array, sha256_multi};
