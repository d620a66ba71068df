//! # NOVA Airdrop Contracts
//!
//! On-chain logic for Merkle-gated token distribution campaigns. A campaign
//! commits to its allow-list with a single Merkle root, opens a bounded
//! claiming window, and pays tiered amounts that decay epoch over epoch:
//!
//! - **Claim Window** — the campaign lifecycle (created → open → closed),
//!   with the close derived lazily from elapsed time rather than a timer
//!   callback.
//! - **Ledger** — exactly-once claim records, supply accounting, and
//!   proof-gated payout authorization.
//! - **Airdrop** — the public facade tying window, ledger, and schedule
//!   together behind the operations a host platform actually calls.
//!
//! ## Design Principles
//!
//! 1. All supply arithmetic is checked — wrapping arithmetic and token
//!    balances do not mix.
//! 2. Check-then-act: every claim validation precedes every mutation, so a
//!    failed claim leaves no observable state change.
//! 3. Time is injected. Every time-sensitive operation takes `now`; nothing
//!    here ever consults a wall clock behind the caller's back.
//! 4. Every public type is serializable (serde) for wire transport and
//!    persistent storage.

pub mod airdrop;
pub mod claim_window;
pub mod ledger;
