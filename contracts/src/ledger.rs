//! # Airdrop Ledger
//!
//! The single source of truth for who has claimed and how much supply
//! remains. The ledger owns three things: the eligibility set (mutable only
//! until the Merkle root is locked), the claim records (written exactly once
//! per account, immutable afterwards), and the supply counters.
//!
//! ## Exactly-once claims
//!
//! A claim runs four ordered checks — uniqueness, proof verification,
//! payout computation, supply — and only then applies its single mutation.
//! There is no compensating rollback because there is nothing to roll back:
//! a failed claim returns before the first write.
//!
//! ## Supply conservation
//!
//! `remaining_supply == total_supply - Σ claims.amount_paid` holds after
//! every operation, and `remaining_supply` can never go negative; a claim
//! that would overdraw the pool is rejected with the amount still owed to
//! nobody.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use airdrop_protocol::merkle::{self, MerkleError};
use airdrop_protocol::schedule::{epoch_at, payout_for, Epoch, ScheduleError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The Merkle root has been published and locked; the eligibility set
    /// can no longer change.
    #[error("eligibility tree already finalized: the merkle root is locked")]
    TreeAlreadyFinalized,

    /// A claim arrived before any root was locked. The facade finalizes the
    /// root when the window opens, so seeing this means the window gating
    /// was bypassed.
    #[error("eligibility tree not finalized: no merkle root to verify against")]
    TreeNotFinalized,

    /// The account already holds a claim record. One claim per account,
    /// forever.
    #[error("account has already claimed: {account}")]
    AlreadyClaimed {
        /// The account that tried to claim again.
        account: String,
    },

    /// The supplied proof does not place the account under the locked root.
    #[error("account is not eligible: merkle proof rejected for {account}")]
    IneligibleAccount {
        /// The account whose proof failed.
        account: String,
    },

    /// The payout pool cannot cover the computed amount.
    #[error("insufficient supply: {requested} requested, {remaining} remaining")]
    InsufficientSupply {
        /// The payout amount the claim would have required.
        requested: u64,
        /// Tokens still available in the pool.
        remaining: u64,
    },

    /// A deposit would push the supply counters past u64::MAX.
    ///
    /// If you're hitting this, someone is depositing more than 18.4
    /// quintillion of the smallest denomination. That's either a bug or an
    /// attack.
    #[error("supply overflow: depositing {amount} would exceed u64::MAX")]
    SupplyOverflow {
        /// The deposit amount that caused the overflow.
        amount: u64,
    },

    /// Root construction failed (empty eligibility set).
    #[error(transparent)]
    Merkle(#[from] MerkleError),

    /// Payout computation failed (no active epoch, bad tier).
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The record of one account's claim. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// The eligibility key (address or pubkey) that claimed.
    pub account: String,
    /// Index of the epoch that priced the payout.
    pub epoch_index: u64,
    /// Tokens paid, after tier scaling. Smallest denomination.
    pub amount_paid: u64,
    /// When the claim was admitted.
    pub timestamp: DateTime<Utc>,
}

/// Eligibility, supply, and claim-record state for one campaign.
///
/// In production this state is persisted in the host platform's storage;
/// the in-memory representation carries the validation logic and is what
/// the contract facade serializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirdropLedger {
    /// Accounts eligible to claim. Mutable only until the root locks.
    /// Kept ordered so snapshots serialize deterministically.
    eligible: BTreeSet<String>,
    /// The locked Merkle root, once published. `Some` means finalized.
    root: Option<[u8; 32]>,
    /// Total tokens ever deposited into the campaign.
    total_supply: u64,
    /// Tokens still available for payouts.
    remaining_supply: u64,
    /// Claim records keyed by account.
    claims: HashMap<String, ClaimRecord>,
}

impl AirdropLedger {
    /// Creates an empty ledger with an unlocked eligibility set.
    pub fn new() -> Self {
        Self {
            eligible: BTreeSet::new(),
            root: None,
            total_supply: 0,
            remaining_supply: 0,
            claims: HashMap::new(),
        }
    }

    /// Creates a ledger around a pre-computed Merkle root.
    ///
    /// The root is locked from the first instant — campaigns that build
    /// their tree off-chain publish the root at creation and never touch
    /// the eligibility set on-chain at all.
    pub fn with_root(root: [u8; 32]) -> Self {
        Self {
            eligible: BTreeSet::new(),
            root: Some(root),
            total_supply: 0,
            remaining_supply: 0,
            claims: HashMap::new(),
        }
    }

    /// Merges keys into the eligibility set.
    ///
    /// Returns the number of accounts actually added (duplicates are
    /// silently absorbed — the set is a set).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::TreeAlreadyFinalized`] once the root is
    /// locked.
    pub fn add_eligible<I>(&mut self, keys: I) -> Result<usize, LedgerError>
    where
        I: IntoIterator<Item = String>,
    {
        if self.root.is_some() {
            return Err(LedgerError::TreeAlreadyFinalized);
        }
        let before = self.eligible.len();
        self.eligible.extend(keys);
        Ok(self.eligible.len() - before)
    }

    /// Computes the Merkle root over the eligibility set and locks it.
    ///
    /// Idempotent: a second call returns the already-locked root unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`MerkleError::EmptyInput`] (via [`LedgerError::Merkle`]) if
    /// no root is locked and the eligibility set is empty. The ledger is
    /// left unchanged in that case.
    pub fn finalize_root(&mut self) -> Result<[u8; 32], LedgerError> {
        if let Some(root) = self.root {
            return Ok(root);
        }
        let keys: Vec<&String> = self.eligible.iter().collect();
        let root = merkle::build_root(&keys)?;
        self.root = Some(root);
        Ok(root)
    }

    /// The locked Merkle root, or `None` while the set is still open.
    pub fn tree_root(&self) -> Option<[u8; 32]> {
        self.root
    }

    /// `true` once the root is locked.
    pub fn is_finalized(&self) -> bool {
        self.root.is_some()
    }

    /// Number of accounts currently in the eligibility set.
    pub fn eligible_count(&self) -> usize {
        self.eligible.len()
    }

    /// Deposits tokens into the payout pool.
    ///
    /// Increases both the total and remaining supply. Returns the new
    /// remaining supply.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SupplyOverflow`] if either counter would
    /// exceed `u64::MAX`; neither counter moves in that case.
    pub fn deposit(&mut self, amount: u64) -> Result<u64, LedgerError> {
        let new_total = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { amount })?;
        let new_remaining = self
            .remaining_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { amount })?;

        self.total_supply = new_total;
        self.remaining_supply = new_remaining;
        Ok(new_remaining)
    }

    /// Admits a claim: verifies eligibility, prices the payout, debits the
    /// pool, and writes the claim record.
    ///
    /// The checks run strictly in order — uniqueness, proof, payout
    /// computation, supply — and all of them precede the mutation. Window
    /// gating is the facade's responsibility and must already have passed.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AlreadyClaimed`] if the account holds a
    /// record, [`LedgerError::IneligibleAccount`] if the proof does not
    /// verify, a transparent [`ScheduleError`] if no epoch is active or the
    /// tier is invalid, and [`LedgerError::InsufficientSupply`] if the pool
    /// cannot cover the amount. On any error the ledger is unchanged.
    pub fn claim(
        &mut self,
        account: &str,
        proof: &[[u8; 32]],
        tier: u8,
        now: DateTime<Utc>,
        schedule: &[Epoch],
    ) -> Result<ClaimRecord, LedgerError> {
        let root = self.root.ok_or(LedgerError::TreeNotFinalized)?;

        if self.claims.contains_key(account) {
            return Err(LedgerError::AlreadyClaimed {
                account: account.to_string(),
            });
        }

        if !merkle::verify(&root, account, proof) {
            return Err(LedgerError::IneligibleAccount {
                account: account.to_string(),
            });
        }

        let epoch_index = epoch_at(schedule, now)
            .map(|epoch| epoch.index)
            .ok_or(ScheduleError::NoActiveEpoch { at: now })?;
        let amount = payout_for(schedule, now, tier)?;

        if self.remaining_supply < amount {
            return Err(LedgerError::InsufficientSupply {
                requested: amount,
                remaining: self.remaining_supply,
            });
        }

        // All checks passed — the single mutation point.
        self.remaining_supply -= amount;
        let record = ClaimRecord {
            account: account.to_string(),
            epoch_index,
            amount_paid: amount,
            timestamp: now,
        };
        self.claims.insert(account.to_string(), record.clone());
        Ok(record)
    }

    /// The claim record for an account, if it has claimed.
    pub fn claim_record(&self, account: &str) -> Option<&ClaimRecord> {
        self.claims.get(account)
    }

    /// `true` if the account has already claimed.
    pub fn has_claimed(&self, account: &str) -> bool {
        self.claims.contains_key(account)
    }

    /// Number of successful claims so far.
    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    /// Total tokens ever deposited.
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Tokens still available for payouts.
    pub fn remaining_supply(&self) -> u64 {
        self.remaining_supply
    }

    /// Total tokens paid out across all claims.
    pub fn total_paid(&self) -> u64 {
        self.total_supply - self.remaining_supply
    }
}

impl Default for AirdropLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdrop_protocol::config::{IDENTITY_TIER, SECONDS_PER_DAY};
    use airdrop_protocol::merkle::{build_proof, build_root};
    use airdrop_protocol::schedule::compute_schedule;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
    }

    fn accounts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("nova1claimant{i:03}")).collect()
    }

    fn flat_schedule(quantity: u64) -> Vec<Epoch> {
        compute_schedule(3, SECONDS_PER_DAY, &[quantity, quantity, quantity], t0()).unwrap()
    }

    /// Helper: a finalized, funded ledger over `n` accounts.
    fn funded_ledger(n: usize, supply: u64) -> (AirdropLedger, Vec<String>) {
        let keys = accounts(n);
        let mut ledger = AirdropLedger::new();
        ledger.add_eligible(keys.iter().cloned()).unwrap();
        ledger.finalize_root().unwrap();
        ledger.deposit(supply).unwrap();
        (ledger, keys)
    }

    #[test]
    fn add_eligible_counts_new_accounts() {
        let mut ledger = AirdropLedger::new();
        let added = ledger.add_eligible(accounts(5)).unwrap();
        assert_eq!(added, 5);

        // Re-adding the same accounts adds nothing.
        let added = ledger.add_eligible(accounts(5)).unwrap();
        assert_eq!(added, 0);
        assert_eq!(ledger.eligible_count(), 5);
    }

    #[test]
    fn add_eligible_after_finalize_rejected() {
        let mut ledger = AirdropLedger::new();
        ledger.add_eligible(accounts(4)).unwrap();
        ledger.finalize_root().unwrap();

        let result = ledger.add_eligible(vec!["nova1latecomer".to_string()]);
        assert!(matches!(result, Err(LedgerError::TreeAlreadyFinalized)));
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut ledger = AirdropLedger::new();
        ledger.add_eligible(accounts(4)).unwrap();
        let first = ledger.finalize_root().unwrap();
        let second = ledger.finalize_root().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn finalize_empty_set_rejected() {
        let mut ledger = AirdropLedger::new();
        let result = ledger.finalize_root();
        assert!(matches!(
            result,
            Err(LedgerError::Merkle(MerkleError::EmptyInput))
        ));
        // And the failure locked nothing.
        assert!(!ledger.is_finalized());
    }

    #[test]
    fn root_matches_engine_output() {
        let keys = accounts(6);
        let mut ledger = AirdropLedger::new();
        ledger.add_eligible(keys.iter().cloned()).unwrap();
        let root = ledger.finalize_root().unwrap();
        assert_eq!(root, build_root(&keys).unwrap());
    }

    #[test]
    fn pre_computed_root_is_locked_from_creation() {
        let keys = accounts(4);
        let root = build_root(&keys).unwrap();
        let mut ledger = AirdropLedger::with_root(root);

        assert!(ledger.is_finalized());
        assert_eq!(ledger.tree_root(), Some(root));
        assert!(matches!(
            ledger.add_eligible(vec!["x".to_string()]),
            Err(LedgerError::TreeAlreadyFinalized)
        ));
    }

    #[test]
    fn deposit_accumulates() {
        let mut ledger = AirdropLedger::new();
        assert_eq!(ledger.deposit(2_000).unwrap(), 2_000);
        assert_eq!(ledger.deposit(500).unwrap(), 2_500);
        assert_eq!(ledger.total_supply(), 2_500);
        assert_eq!(ledger.remaining_supply(), 2_500);
    }

    #[test]
    fn deposit_overflow_rejected() {
        let mut ledger = AirdropLedger::new();
        ledger.deposit(u64::MAX).unwrap();
        let result = ledger.deposit(1);
        assert!(matches!(result, Err(LedgerError::SupplyOverflow { .. })));
        // Counters unchanged by the failed deposit.
        assert_eq!(ledger.total_supply(), u64::MAX);
        assert_eq!(ledger.remaining_supply(), u64::MAX);
    }

    #[test]
    fn claim_happy_path() {
        let (mut ledger, keys) = funded_ledger(8, 100_000);
        let schedule = flat_schedule(1_000);
        let proof = build_proof(&keys[2], &keys).unwrap();

        let record = ledger
            .claim(&keys[2], &proof, IDENTITY_TIER, t0(), &schedule)
            .unwrap();

        assert_eq!(record.account, keys[2]);
        assert_eq!(record.epoch_index, 0);
        assert_eq!(record.amount_paid, 1_000);
        assert_eq!(record.timestamp, t0());
        assert_eq!(ledger.remaining_supply(), 99_000);
        assert!(ledger.has_claimed(&keys[2]));
        assert_eq!(ledger.claim_record(&keys[2]), Some(&record));
    }

    #[test]
    fn second_claim_rejected_even_with_valid_proof() {
        let (mut ledger, keys) = funded_ledger(8, 100_000);
        let schedule = flat_schedule(1_000);
        let proof = build_proof(&keys[0], &keys).unwrap();

        ledger
            .claim(&keys[0], &proof, IDENTITY_TIER, t0(), &schedule)
            .unwrap();
        let result = ledger.claim(&keys[0], &proof, IDENTITY_TIER, t0(), &schedule);

        assert!(matches!(result, Err(LedgerError::AlreadyClaimed { .. })));
        // Exactly one debit happened.
        assert_eq!(ledger.remaining_supply(), 99_000);
        assert_eq!(ledger.claim_count(), 1);
    }

    #[test]
    fn invalid_proof_rejected() {
        let (mut ledger, keys) = funded_ledger(8, 100_000);
        let schedule = flat_schedule(1_000);

        // An outsider borrowing a member's proof.
        let proof = build_proof(&keys[1], &keys).unwrap();
        let result = ledger.claim("nova1outsider", &proof, IDENTITY_TIER, t0(), &schedule);

        assert!(matches!(result, Err(LedgerError::IneligibleAccount { .. })));
        assert_eq!(ledger.remaining_supply(), 100_000);
        assert_eq!(ledger.claim_count(), 0);
    }

    #[test]
    fn claim_outside_schedule_rejected() {
        let (mut ledger, keys) = funded_ledger(4, 100_000);
        let schedule = flat_schedule(1_000);
        let proof = build_proof(&keys[0], &keys).unwrap();

        let late = t0() + chrono::Duration::days(30);
        let result = ledger.claim(&keys[0], &proof, IDENTITY_TIER, late, &schedule);
        assert!(matches!(
            result,
            Err(LedgerError::Schedule(ScheduleError::NoActiveEpoch { .. }))
        ));
    }

    #[test]
    fn claim_before_finalize_rejected() {
        let keys = accounts(4);
        let mut ledger = AirdropLedger::new();
        ledger.add_eligible(keys.iter().cloned()).unwrap();
        ledger.deposit(10_000).unwrap();
        let schedule = flat_schedule(1_000);
        let proof = build_proof(&keys[0], &keys).unwrap();

        let result = ledger.claim(&keys[0], &proof, IDENTITY_TIER, t0(), &schedule);
        assert!(matches!(result, Err(LedgerError::TreeNotFinalized)));
    }

    #[test]
    fn insufficient_supply_rejected() {
        // A 2000-token pool pays one 2000-token claim, then nothing.
        let (mut ledger, keys) = funded_ledger(4, 2_000);
        let schedule = flat_schedule(2_000);

        let proof = build_proof(&keys[0], &keys).unwrap();
        let record = ledger
            .claim(&keys[0], &proof, IDENTITY_TIER, t0(), &schedule)
            .unwrap();
        assert_eq!(record.amount_paid, 2_000);
        assert_eq!(ledger.remaining_supply(), 0);

        let proof = build_proof(&keys[1], &keys).unwrap();
        let result = ledger.claim(&keys[1], &proof, IDENTITY_TIER, t0(), &schedule);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientSupply {
                requested: 2_000,
                remaining: 0
            })
        ));
        // The failed claim wrote nothing.
        assert!(!ledger.has_claimed(&keys[1]));
    }

    #[test]
    fn supply_conservation_across_claims() {
        let (mut ledger, keys) = funded_ledger(10, 50_000);
        let schedule = flat_schedule(1_000);

        for key in keys.iter().take(7) {
            let proof = build_proof(key, &keys).unwrap();
            ledger
                .claim(key, &proof, IDENTITY_TIER, t0(), &schedule)
                .unwrap();
        }

        let paid: u64 = keys
            .iter()
            .filter_map(|k| ledger.claim_record(k))
            .map(|r| r.amount_paid)
            .sum();
        assert_eq!(paid, ledger.total_paid());
        assert_eq!(
            ledger.remaining_supply() + paid,
            ledger.total_supply(),
            "remaining + paid must equal total, always"
        );
    }

    #[test]
    fn ledger_serialization_roundtrip() {
        let (mut ledger, keys) = funded_ledger(4, 10_000);
        let schedule = flat_schedule(1_000);
        let proof = build_proof(&keys[0], &keys).unwrap();
        ledger
            .claim(&keys[0], &proof, IDENTITY_TIER, t0(), &schedule)
            .unwrap();

        let json = serde_json::to_string(&ledger).unwrap();
        let restored: AirdropLedger = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.tree_root(), ledger.tree_root());
        assert_eq!(restored.remaining_supply(), 9_000);
        assert!(restored.has_claimed(&keys[0]));
    }
}
