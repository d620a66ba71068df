//! # Epoch Schedules & Tiered Payouts
//!
//! Pure time arithmetic for a distribution campaign: slice the campaign into
//! contiguous epochs, attach a base payout amount to each, and scale that
//! amount by the claimant's tier.
//!
//! Nothing in this module owns a clock. Every function takes the timestamp
//! it should reason about, which keeps the schedule trivially testable and
//! keeps contract-level code honest about where "now" comes from.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{tier_multiplier_bps, BPS_DENOMINATOR, PAYOUT_TIER_COUNT, SECONDS_PER_DAY};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while building or querying a schedule.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The per-epoch payout list does not match the configured epoch count.
    #[error("schedule length mismatch: {expected} epochs configured, {actual} payout entries supplied")]
    LengthMismatch {
        /// The configured number of epochs.
        expected: u64,
        /// The number of payout entries actually supplied.
        actual: usize,
    },

    /// The schedule would contain no time at all.
    #[error("degenerate schedule: epoch count and epoch length must both be nonzero")]
    DegenerateSchedule,

    /// No epoch contains the queried timestamp.
    #[error("no active epoch at {at}")]
    NoActiveEpoch {
        /// The timestamp that fell outside the schedule.
        at: DateTime<Utc>,
    },

    /// The requested payout tier does not exist.
    #[error("invalid payout tier {tier}: tiers range from 0 to {max}")]
    InvalidTier {
        /// The tier that was requested.
        tier: u8,
        /// The highest valid tier.
        max: u8,
    },

    /// Scaling the epoch payout by the tier multiplier would overflow u64.
    #[error("payout overflow: epoch quantity {quantity} at tier {tier}")]
    PayoutOverflow {
        /// The epoch's base payout amount.
        quantity: u64,
        /// The tier whose multiplier caused the overflow.
        tier: u8,
    },
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One distribution epoch: a fixed time window with a base payout amount.
///
/// Epochs are contiguous and non-overlapping; each epoch's `end_time` is
/// exactly the next epoch's `start_time`. Membership is half-open —
/// `[start_time, end_time)` — so a timestamp on the boundary belongs to the
/// later epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    /// Zero-based position of this epoch in the schedule.
    pub index: u64,
    /// Length of the epoch in seconds.
    pub window_length_secs: u64,
    /// Base number of tokens paid to each claimant during this epoch,
    /// before tier scaling. Smallest denomination.
    pub token_quantity: u64,
    /// Instant the epoch begins (inclusive).
    pub start_time: DateTime<Utc>,
    /// Instant the epoch ends (exclusive).
    pub end_time: DateTime<Utc>,
}

impl Epoch {
    /// Returns `true` if `at` falls inside this epoch's `[start, end)` window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start_time <= at && at < self.end_time
    }

    /// The epoch length expressed in whole days, for display and logging.
    pub fn length_days(&self) -> u64 {
        self.window_length_secs / SECONDS_PER_DAY
    }
}

// ---------------------------------------------------------------------------
// Schedule construction & queries
// ---------------------------------------------------------------------------

/// Builds the epoch schedule for a campaign.
///
/// Produces `total_epochs` contiguous epochs of `epoch_length_secs` each,
/// starting at `schedule_start`, with `per_epoch_payouts[i]` as the base
/// payout of epoch `i`.
///
/// # Errors
///
/// Returns [`ScheduleError::DegenerateSchedule`] if `total_epochs` or
/// `epoch_length_secs` is zero.
/// Returns [`ScheduleError::LengthMismatch`] if the payout list length does
/// not equal `total_epochs`.
pub fn compute_schedule(
    total_epochs: u64,
    epoch_length_secs: u64,
    per_epoch_payouts: &[u64],
    schedule_start: DateTime<Utc>,
) -> Result<Vec<Epoch>, ScheduleError> {
    if total_epochs == 0 || epoch_length_secs == 0 {
        return Err(ScheduleError::DegenerateSchedule);
    }
    if per_epoch_payouts.len() as u64 != total_epochs {
        return Err(ScheduleError::LengthMismatch {
            expected: total_epochs,
            actual: per_epoch_payouts.len(),
        });
    }

    let length = Duration::seconds(epoch_length_secs as i64);
    let mut epochs = Vec::with_capacity(per_epoch_payouts.len());
    let mut start = schedule_start;
    for (index, &token_quantity) in per_epoch_payouts.iter().enumerate() {
        let end = start + length;
        epochs.push(Epoch {
            index: index as u64,
            window_length_secs: epoch_length_secs,
            token_quantity,
            start_time: start,
            end_time: end,
        });
        start = end;
    }

    Ok(epochs)
}

/// Returns the epoch whose window contains `at`, or `None` if `at` precedes
/// the first epoch or follows the last.
pub fn epoch_at(schedule: &[Epoch], at: DateTime<Utc>) -> Option<&Epoch> {
    schedule.iter().find(|epoch| epoch.contains(at))
}

/// Computes the per-account payout at time `at` for the given tier.
///
/// The active epoch's base quantity is scaled by the tier multiplier in
/// integer basis-point arithmetic: `quantity * bps / 10_000`.
///
/// # Errors
///
/// Returns [`ScheduleError::NoActiveEpoch`] if `at` is outside the schedule.
/// Returns [`ScheduleError::InvalidTier`] if `tier` is out of range.
/// Returns [`ScheduleError::PayoutOverflow`] if the scaled amount exceeds u64.
pub fn payout_for(schedule: &[Epoch], at: DateTime<Utc>, tier: u8) -> Result<u64, ScheduleError> {
    let epoch = epoch_at(schedule, at).ok_or(ScheduleError::NoActiveEpoch { at })?;
    let bps = tier_multiplier_bps(tier).ok_or(ScheduleError::InvalidTier {
        tier,
        max: (PAYOUT_TIER_COUNT - 1) as u8,
    })?;

    let scaled = epoch
        .token_quantity
        .checked_mul(bps)
        .ok_or(ScheduleError::PayoutOverflow {
            quantity: epoch.token_quantity,
            tier,
        })?;

    Ok(scaled / BPS_DENOMINATOR)
}
