//! # Claim Window State Machine
//!
//! Tracks the lifecycle of a claiming window: created → open → closed.
//! Opening happens either by explicit admin action or by reaching a
//! configured start time; closing happens purely by elapsed time.
//!
//! The close transition is *derived*, not scheduled: every status query
//! compares the supplied `now` against the stored threshold. There is no
//! wake-up to miss and no callback to lose — a window whose time has passed
//! reports closed no matter what the host's timer service did or didn't do.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during window operations.
#[derive(Debug, Error)]
pub enum WindowError {
    /// The window has already left the created state and cannot be opened
    /// (again).
    #[error("claim window cannot be opened: status is {status}")]
    AlreadyOpen {
        /// The window's current status.
        status: WindowStatus,
    },

    /// An operation that requires an open window found it in another state.
    #[error("claim window is not open: status is {status}")]
    NotOpen {
        /// The window's current status.
        status: WindowStatus,
    },
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The lifecycle status of a claim window.
///
/// Transitions are monotonic: created → open → closed, never backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowStatus {
    /// Configured but not yet accepting claims.
    Created,
    /// Accepting claims.
    Open,
    /// The claiming period has elapsed. Terminal.
    Closed,
}

impl std::fmt::Display for WindowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowStatus::Created => write!(f, "created"),
            WindowStatus::Open => write!(f, "claim-window-open"),
            WindowStatus::Closed => write!(f, "claim-window-closed"),
        }
    }
}

/// A time-boxed claiming window.
///
/// The window stores at most two instants: an optional scheduled opening
/// time fixed at configuration, and the actual opening time once one is
/// established. Everything else — including whether the window is currently
/// closed — is derived from those and the supplied `now`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimWindow {
    /// Length of the claiming period in seconds, measured from opening.
    claim_window_secs: u64,
    /// If set, the window opens by itself at this instant, no admin action
    /// required.
    scheduled_open: Option<DateTime<Utc>>,
    /// The instant the window was explicitly opened, if it has been.
    opened_at: Option<DateTime<Utc>>,
}

impl ClaimWindow {
    /// Creates a window of the given length in the created state.
    pub fn new(claim_window_secs: u64) -> Self {
        Self {
            claim_window_secs,
            scheduled_open: None,
            opened_at: None,
        }
    }

    /// Configures the window to open by itself at `start`.
    ///
    /// An explicit [`open`](Self::open) before `start` still wins; the
    /// scheduled time is a fallback, not a lock.
    pub fn with_scheduled_open(mut self, start: DateTime<Utc>) -> Self {
        self.scheduled_open = Some(start);
        self
    }

    /// The instant the window is (or will be) considered opened, given `now`.
    ///
    /// `None` while the window is still created.
    fn effective_opened_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match (self.opened_at, self.scheduled_open) {
            (Some(t), _) => Some(t),
            (None, Some(s)) if now >= s => Some(s),
            _ => None,
        }
    }

    /// Explicitly opens the window.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::AlreadyOpen`] unless the window is currently
    /// in the created state.
    pub fn open(&mut self, now: DateTime<Utc>) -> Result<(), WindowError> {
        let status = self.status(now);
        if status != WindowStatus::Created {
            return Err(WindowError::AlreadyOpen { status });
        }
        self.opened_at = Some(now);
        Ok(())
    }

    /// The window's status at `now`.
    ///
    /// Closed is derived lazily: once `now` is at or past the opening
    /// instant plus the window length, the window reports closed with no
    /// explicit transition ever having run.
    pub fn status(&self, now: DateTime<Utc>) -> WindowStatus {
        match self.effective_opened_at(now) {
            None => WindowStatus::Created,
            Some(opened) => {
                if now >= opened + Duration::seconds(self.claim_window_secs as i64) {
                    WindowStatus::Closed
                } else {
                    WindowStatus::Open
                }
            }
        }
    }

    /// Fails unless the window is open at `now`.
    ///
    /// Every claim-admission path calls this before touching ledger state.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::NotOpen`] with the current status otherwise.
    pub fn assert_open(&self, now: DateTime<Utc>) -> Result<(), WindowError> {
        let status = self.status(now);
        if status != WindowStatus::Open {
            return Err(WindowError::NotOpen { status });
        }
        Ok(())
    }

    /// The instant the window closes, or `None` while it is still created.
    pub fn closes_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.effective_opened_at(now)
            .map(|opened| opened + Duration::seconds(self.claim_window_secs as i64))
    }

    /// The configured window length in seconds.
    pub fn window_length_secs(&self) -> u64 {
        self.claim_window_secs
    }
}
