// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # NOVA Airdrop — Core Primitives
//!
//! The distribution engine behind NOVA token airdrops: prove you were on the
//! list, claim your allocation, and do it all without the contract ever
//! storing the list itself.
//!
//! An airdrop campaign commits to its full eligibility set with a single
//! 32-byte Merkle root. Claimants show up with an inclusion proof and the
//! contract checks it in `O(log n)` hashes — no per-account storage, no
//! gas-melting iteration over ten thousand addresses.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual concerns of a
//! distribution campaign:
//!
//! - **crypto** — SHA-256 hashing helpers. Don't roll your own.
//! - **merkle** — Canonically-paired Merkle trees: roots, proofs, verification.
//! - **schedule** — Epoch boundaries and tiered payout amounts over time.
//! - **config** — Distribution constants and default campaign parameters.
//!
//! Contract state machines (the claim window, the ledger, the public facade)
//! live in the sibling `airdrop-contracts` crate.
//!
//! ## Design Philosophy
//!
//! 1. Deterministic everywhere: same eligibility set, same root, any machine.
//! 2. Time is an argument, never an ambient — callers inject `now`.
//! 3. If it touches token amounts, the arithmetic is checked.

pub mod config;
pub mod crypto;
pub mod merkle;
pub mod schedule;
