//! # Airdrop Contract Facade
//!
//! The public face of a distribution campaign. The facade owns one claim
//! window, one ledger, and one epoch schedule, and exposes exactly the
//! operations a host platform calls:
//!
//! - **Admin**: `add_eligible_users`, `open_window`, `deposit_payment`.
//! - **Public**: `claim`, plus the read-only queries (`status`, `tree_root`,
//!   supply and claim-record lookups).
//!
//! ## Execution model
//!
//! Every operation is synchronous and runs to completion — the host's
//! sequenced, message-driven execution is what makes check-then-act safe
//! here without locks. A host embedding this state in a genuinely
//! multi-threaded runtime must serialize access to the whole [`Airdrop`]
//! value.
//!
//! ## Time
//!
//! The facade never reads a clock. Callers pass `now` — a block timestamp,
//! a timer-service reading, a test constant — and the campaign's entire
//! notion of time derives from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use airdrop_protocol::config::{
    DEFAULT_CLAIM_WINDOW_SECS, DEFAULT_EPOCH_LENGTH_SECS, DEFAULT_EPOCH_PAYOUTS,
    DEFAULT_TARGET_EPOCHS,
};
use airdrop_protocol::schedule::{compute_schedule, Epoch, ScheduleError};

use crate::claim_window::{ClaimWindow, WindowError, WindowStatus};
use crate::ledger::{AirdropLedger, ClaimRecord, LedgerError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by the contract facade.
///
/// Window, ledger, and schedule errors pass through transparently so hosts
/// can distinguish every failure kind; only terms validation adds a variant
/// of its own.
#[derive(Debug, Error)]
pub enum AirdropError {
    /// The campaign terms are internally inconsistent.
    #[error("invalid terms: {0}")]
    InvalidTerms(String),

    /// A window lifecycle rule was violated.
    #[error(transparent)]
    Window(#[from] WindowError),

    /// A ledger rule was violated (claims, supply, eligibility).
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The epoch schedule rejected the configuration or the query.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

/// The complete, strongly-typed configuration of one campaign.
///
/// Everything a deployment needs to say about a campaign is here — there is
/// no side channel of loosely-typed options. Terms are fixed at contract
/// creation and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirdropTerms {
    /// Number of distribution epochs.
    pub total_epochs: u64,
    /// Length of each epoch in seconds.
    pub epoch_length_secs: u64,
    /// Base payout per epoch, in the token's smallest denomination. Must
    /// contain exactly `total_epochs` entries.
    pub per_epoch_payouts: Vec<u64>,
    /// Instant the epoch schedule begins. The claim window also opens by
    /// itself at this instant if no admin opens it earlier.
    pub schedule_start: DateTime<Utc>,
    /// Length of the claiming window in seconds, measured from opening.
    pub claim_window_secs: u64,
    /// A pre-computed Merkle root, for campaigns whose tree was built
    /// off-chain. When set, the eligibility set is locked from creation.
    pub merkle_root: Option<[u8; 32]>,
}

impl AirdropTerms {
    /// Standard campaign terms starting at `schedule_start`: five one-day
    /// epochs with the default decaying payouts and a four-week window.
    pub fn with_defaults(schedule_start: DateTime<Utc>) -> Self {
        Self {
            total_epochs: DEFAULT_TARGET_EPOCHS,
            epoch_length_secs: DEFAULT_EPOCH_LENGTH_SECS,
            per_epoch_payouts: DEFAULT_EPOCH_PAYOUTS.to_vec(),
            schedule_start,
            claim_window_secs: DEFAULT_CLAIM_WINDOW_SECS,
            merkle_root: None,
        }
    }

    /// Checks the terms for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`AirdropError::InvalidTerms`] for a zero-length claim
    /// window; schedule-shape problems surface as the corresponding
    /// [`ScheduleError`] from schedule construction.
    pub fn validate(&self) -> Result<(), AirdropError> {
        if self.claim_window_secs == 0 {
            return Err(AirdropError::InvalidTerms(
                "claim window length must be nonzero".to_string(),
            ));
        }
        // Building the schedule exercises the remaining constraints
        // (nonzero epochs and length, payout list shape).
        compute_schedule(
            self.total_epochs,
            self.epoch_length_secs,
            &self.per_epoch_payouts,
            self.schedule_start,
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// The contract
// ---------------------------------------------------------------------------

/// One deployed airdrop campaign.
///
/// Construction validates the terms and freezes the epoch schedule; from
/// then on the only mutating entry points are the five public operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airdrop {
    /// Unique identifier for this campaign instance.
    pub airdrop_id: String,
    /// The frozen campaign configuration.
    terms: AirdropTerms,
    /// The epoch schedule derived from the terms at creation.
    schedule: Vec<Epoch>,
    /// The claiming window lifecycle.
    window: ClaimWindow,
    /// Eligibility, supply, and claim records.
    ledger: AirdropLedger,
    /// Timestamp the campaign was instantiated.
    pub created_at: DateTime<Utc>,
}

impl Airdrop {
    /// Instantiates a campaign from its terms.
    ///
    /// The window is armed to open by itself at `terms.schedule_start`; an
    /// admin may still open it earlier with [`open_window`](Self::open_window).
    /// If the terms carry a pre-computed Merkle root, the eligibility set is
    /// locked immediately and [`add_eligible_users`](Self::add_eligible_users)
    /// will refuse every call.
    ///
    /// # Errors
    ///
    /// Returns [`AirdropError::InvalidTerms`] or a [`ScheduleError`] if the
    /// terms do not validate.
    pub fn new(terms: AirdropTerms, created_at: DateTime<Utc>) -> Result<Self, AirdropError> {
        terms.validate()?;
        let schedule = compute_schedule(
            terms.total_epochs,
            terms.epoch_length_secs,
            &terms.per_epoch_payouts,
            terms.schedule_start,
        )?;

        let window =
            ClaimWindow::new(terms.claim_window_secs).with_scheduled_open(terms.schedule_start);
        let ledger = match terms.merkle_root {
            Some(root) => AirdropLedger::with_root(root),
            None => AirdropLedger::new(),
        };

        let airdrop_id = Uuid::new_v4().to_string();
        info!(
            airdrop_id = %airdrop_id,
            epochs = terms.total_epochs,
            window_secs = terms.claim_window_secs,
            "airdrop campaign created"
        );

        Ok(Self {
            airdrop_id,
            terms,
            schedule,
            window,
            ledger,
            created_at,
        })
    }

    // -- admin operations ---------------------------------------------------

    /// Merges accounts into the eligibility set.
    ///
    /// Additions are only possible while the window is still created —
    /// the published root must commit to the final set.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::TreeAlreadyFinalized`] once the window has
    /// opened (by admin action or by schedule) or the root is otherwise
    /// locked.
    pub fn add_eligible_users<I>(&mut self, now: DateTime<Utc>, keys: I) -> Result<usize, AirdropError>
    where
        I: IntoIterator<Item = String>,
    {
        if self.window.status(now) != WindowStatus::Created {
            return Err(LedgerError::TreeAlreadyFinalized.into());
        }
        let added = self.ledger.add_eligible(keys)?;
        info!(
            airdrop_id = %self.airdrop_id,
            added,
            eligible = self.ledger.eligible_count(),
            "eligible accounts added"
        );
        Ok(added)
    }

    /// Opens the claiming window, publishing and locking the Merkle root.
    ///
    /// Returns the locked root.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::AlreadyOpen`] if the window has left the
    /// created state, and [`MerkleError::EmptyInput`] (via the ledger) if no
    /// root was pre-computed and no accounts were added. Both checks run
    /// before any state changes.
    ///
    /// [`MerkleError::EmptyInput`]: airdrop_protocol::merkle::MerkleError::EmptyInput
    pub fn open_window(&mut self, now: DateTime<Utc>) -> Result<[u8; 32], AirdropError> {
        let status = self.window.status(now);
        if status != WindowStatus::Created {
            return Err(WindowError::AlreadyOpen { status }.into());
        }

        // finalize_root mutates nothing on failure, so the order below
        // cannot leave a half-opened campaign behind.
        let root = self.ledger.finalize_root()?;
        self.window.open(now)?;

        info!(
            airdrop_id = %self.airdrop_id,
            root = %hex::encode(root),
            eligible = self.ledger.eligible_count(),
            "claim window opened"
        );
        Ok(root)
    }

    /// Deposits tokens into the payout pool. Returns the new remaining
    /// supply.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SupplyOverflow`] on counter overflow.
    pub fn deposit_payment(&mut self, amount: u64) -> Result<u64, AirdropError> {
        let remaining = self.ledger.deposit(amount)?;
        info!(
            airdrop_id = %self.airdrop_id,
            amount,
            remaining,
            "payment deposited"
        );
        Ok(remaining)
    }

    // -- public operations --------------------------------------------------

    /// Admits a claim for `key` with the given inclusion proof and tier.
    ///
    /// Runs the full gauntlet in order: window open, account not yet
    /// claimed, proof verifies, payout priced by the active epoch, supply
    /// sufficient. Exactly one ledger mutation happens on success; none on
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::NotOpen`], [`LedgerError::AlreadyClaimed`],
    /// [`LedgerError::IneligibleAccount`],
    /// [`ScheduleError::NoActiveEpoch`] / [`ScheduleError::InvalidTier`], or
    /// [`LedgerError::InsufficientSupply`], in that precedence.
    pub fn claim(
        &mut self,
        now: DateTime<Utc>,
        key: &str,
        proof: &[[u8; 32]],
        tier: u8,
    ) -> Result<ClaimRecord, AirdropError> {
        if let Err(err) = self.window.assert_open(now) {
            warn!(airdrop_id = %self.airdrop_id, account = %key, %err, "claim rejected");
            return Err(err.into());
        }

        // A schedule-opened window never saw open_window(), so the root may
        // still be pending; lock it on the first admission. Idempotent.
        if !self.ledger.is_finalized() {
            let root = self.ledger.finalize_root()?;
            debug!(
                airdrop_id = %self.airdrop_id,
                root = %hex::encode(root),
                "root locked on first claim after scheduled opening"
            );
        }

        match self.ledger.claim(key, proof, tier, now, &self.schedule) {
            Ok(record) => {
                info!(
                    airdrop_id = %self.airdrop_id,
                    account = %record.account,
                    amount = record.amount_paid,
                    epoch = record.epoch_index,
                    remaining = self.ledger.remaining_supply(),
                    "claim paid"
                );
                Ok(record)
            }
            Err(err) => {
                warn!(airdrop_id = %self.airdrop_id, account = %key, %err, "claim rejected");
                Err(err.into())
            }
        }
    }

    // -- queries ------------------------------------------------------------

    /// The published Merkle root, or `None` while the eligibility set is
    /// still open.
    pub fn tree_root(&self) -> Option<[u8; 32]> {
        self.ledger.tree_root()
    }

    /// The window status at `now`.
    pub fn status(&self, now: DateTime<Utc>) -> WindowStatus {
        self.window.status(now)
    }

    /// The instant the window closes, or `None` while it is still created.
    pub fn closes_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.window.closes_at(now)
    }

    /// Tokens still available for payouts.
    pub fn remaining_supply(&self) -> u64 {
        self.ledger.remaining_supply()
    }

    /// Total tokens ever deposited.
    pub fn total_supply(&self) -> u64 {
        self.ledger.total_supply()
    }

    /// Number of successful claims so far.
    pub fn claim_count(&self) -> usize {
        self.ledger.claim_count()
    }

    /// The claim record for an account, if it has claimed.
    pub fn claim_record(&self, account: &str) -> Option<&ClaimRecord> {
        self.ledger.claim_record(account)
    }

    /// `true` if the account has already claimed.
    pub fn has_claimed(&self, account: &str) -> bool {
        self.ledger.has_claimed(account)
    }

    /// Number of accounts currently in the eligibility set.
    pub fn eligible_count(&self) -> usize {
        self.ledger.eligible_count()
    }

    /// The frozen campaign terms.
    pub fn terms(&self) -> &AirdropTerms {
        &self.terms
    }

    /// The epoch schedule derived from the terms.
    pub fn schedule(&self) -> &[Epoch] {
        &self.schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdrop_protocol::config::IDENTITY_TIER;
    use airdrop_protocol::merkle::{build_proof, build_root};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
    }

    fn accounts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("nova1claimant{i:03}")).collect()
    }

    fn terms() -> AirdropTerms {
        AirdropTerms::with_defaults(t0())
    }

    #[test]
    fn default_terms_validate() {
        assert!(terms().validate().is_ok());
    }

    #[test]
    fn zero_window_rejected() {
        let mut t = terms();
        t.claim_window_secs = 0;
        assert!(matches!(
            Airdrop::new(t, t0()),
            Err(AirdropError::InvalidTerms(_))
        ));
    }

    #[test]
    fn mismatched_payouts_rejected() {
        let mut t = terms();
        t.per_epoch_payouts.pop();
        assert!(matches!(
            Airdrop::new(t, t0()),
            Err(AirdropError::Schedule(ScheduleError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn schedule_derived_from_terms() {
        let airdrop = Airdrop::new(terms(), t0()).unwrap();
        assert_eq!(airdrop.schedule().len(), 5);
        assert_eq!(airdrop.schedule()[0].start_time, t0());
        assert_eq!(airdrop.schedule()[2].token_quantity, 3_500);
    }

    #[test]
    fn additions_blocked_once_window_opens() {
        let keys = accounts(4);
        let mut airdrop = Airdrop::new(terms(), t0() - Duration::days(1)).unwrap();
        airdrop
            .add_eligible_users(t0() - Duration::days(1), keys.clone())
            .unwrap();
        airdrop.open_window(t0() - Duration::hours(1)).unwrap();

        let result = airdrop.add_eligible_users(t0(), vec!["nova1late".to_string()]);
        assert!(matches!(
            result,
            Err(AirdropError::Ledger(LedgerError::TreeAlreadyFinalized))
        ));
    }

    #[test]
    fn open_window_publishes_root() {
        let keys = accounts(4);
        let created = t0() - Duration::days(1);
        let mut airdrop = Airdrop::new(terms(), created).unwrap();
        assert_eq!(airdrop.tree_root(), None);

        airdrop.add_eligible_users(created, keys.clone()).unwrap();
        let root = airdrop.open_window(created).unwrap();

        assert_eq!(root, build_root(&keys).unwrap());
        assert_eq!(airdrop.tree_root(), Some(root));
        assert_eq!(airdrop.status(created), WindowStatus::Open);
    }

    #[test]
    fn open_empty_campaign_rejected() {
        let created = t0() - Duration::days(1);
        let mut airdrop = Airdrop::new(terms(), created).unwrap();
        assert!(airdrop.open_window(created).is_err());
        // The failed open left the window untouched.
        assert_eq!(airdrop.status(created), WindowStatus::Created);
    }

    #[test]
    fn pre_computed_root_campaign_locks_additions() {
        let keys = accounts(4);
        let root = build_root(&keys).unwrap();
        let mut t = terms();
        t.merkle_root = Some(root);

        let created = t0() - Duration::days(1);
        let mut airdrop = Airdrop::new(t, created).unwrap();
        assert_eq!(airdrop.tree_root(), Some(root));
        assert!(airdrop.add_eligible_users(created, keys.clone()).is_err());

        // But claims verify against the published root just fine.
        airdrop.open_window(created).unwrap();
        airdrop.deposit_payment(100_000).unwrap();
        let proof = build_proof(&keys[1], &keys).unwrap();
        let record = airdrop.claim(t0(), &keys[1], &proof, IDENTITY_TIER).unwrap();
        assert_eq!(record.amount_paid, 9_000);
    }

    #[test]
    fn scheduled_opening_admits_claims_without_admin_open() {
        let keys = accounts(4);
        let created = t0() - Duration::days(1);
        let mut airdrop = Airdrop::new(terms(), created).unwrap();
        airdrop.add_eligible_users(created, keys.clone()).unwrap();
        airdrop.deposit_payment(100_000).unwrap();

        // Nobody called open_window; the schedule start does the opening.
        assert_eq!(airdrop.status(created), WindowStatus::Created);
        assert_eq!(airdrop.status(t0()), WindowStatus::Open);

        let proof = build_proof(&keys[0], &keys).unwrap();
        let record = airdrop.claim(t0(), &keys[0], &proof, IDENTITY_TIER).unwrap();
        assert_eq!(record.epoch_index, 0);
        // The first admission locked the root.
        assert!(airdrop.tree_root().is_some());
    }

    #[test]
    fn deposit_tracks_supply() {
        let mut airdrop = Airdrop::new(terms(), t0()).unwrap();
        airdrop.deposit_payment(2_000).unwrap();
        airdrop.deposit_payment(3_000).unwrap();
        assert_eq!(airdrop.total_supply(), 5_000);
        assert_eq!(airdrop.remaining_supply(), 5_000);
    }
}
