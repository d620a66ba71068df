//! # Distribution Configuration & Constants
//!
//! Every magic number in the airdrop suite lives here. If you're hardcoding
//! a constant somewhere else, you're doing it wrong and you owe the team
//! coffee.
//!
//! These values define the default shape of a distribution campaign.
//! Individual campaigns override them through their terms struct; the
//! defaults exist so test harnesses and deployment tooling agree on what a
//! "standard" campaign looks like.

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Hash output length in bytes. SHA-256 produces 32-byte digests, and both
/// Merkle roots and proof elements are exactly this size.
pub const HASH_OUTPUT_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Seconds per day. Epoch lengths are configured in seconds but discussed
/// in days; this keeps the two in agreement.
pub const SECONDS_PER_DAY: u64 = 86_400;

// ---------------------------------------------------------------------------
// Default Campaign Parameters
// ---------------------------------------------------------------------------

/// Default number of distribution epochs. Five single-day epochs with
/// front-loaded payouts rewards early claimants without leaving latecomers
/// with nothing.
pub const DEFAULT_TARGET_EPOCHS: u64 = 5;

/// Default epoch length: one day. Short enough that the decay schedule has
/// teeth, long enough that claimants in every timezone get a fair shot at
/// each payout level.
pub const DEFAULT_EPOCH_LENGTH_SECS: u64 = SECONDS_PER_DAY;

/// Default per-epoch base payout amounts, in the token's smallest
/// denomination. Decays epoch over epoch — claim on day one and receive
/// 9000, wait until day five and receive 750.
pub const DEFAULT_EPOCH_PAYOUTS: [u64; 5] = [9_000, 6_500, 3_500, 1_500, 750];

/// Default total token supply allocated to a campaign.
pub const DEFAULT_TARGET_TOKEN_SUPPLY: u64 = 10_000_000;

/// Default claim window length: four weeks from opening. After this the
/// window reports closed and all claim attempts are rejected, whatever
/// supply remains.
pub const DEFAULT_CLAIM_WINDOW_SECS: u64 = 28 * SECONDS_PER_DAY;

// ---------------------------------------------------------------------------
// Payout Tiers
// ---------------------------------------------------------------------------

/// Number of payout tiers. Tiers are assigned off-chain (referral standing,
/// allocation class) and submitted with the claim; the contract only scales
/// the epoch's base amount by the tier multiplier.
pub const PAYOUT_TIER_COUNT: usize = 5;

/// Tier multipliers in basis points, indexed by tier. Tier 0 is the premium
/// allocation class at 1.5x; tier 1 is the 1.0x identity; lower standings
/// scale down from there.
pub const PAYOUT_TIER_MULTIPLIERS_BPS: [u64; PAYOUT_TIER_COUNT] =
    [15_000, 10_000, 7_500, 5_000, 2_500];

/// Basis-point denominator. 10_000 bps = 1.0x.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// The tier whose multiplier is exactly 1.0x. Claims at this tier receive
/// the epoch's base payout amount unscaled.
pub const IDENTITY_TIER: u8 = 1;

/// Returns the multiplier for a tier in basis points, or `None` if the tier
/// is out of range. We don't guess.
pub fn tier_multiplier_bps(tier: u8) -> Option<u64> {
    PAYOUT_TIER_MULTIPLIERS_BPS.get(tier as usize).copied()
}
