//! Join-time planning for the notetaker bot.
//!
//! Given a meeting start time and a desired lead interval, decide the
//! instant the bot should actually attempt to join:
//! - ideal: start minus the lead interval
//! - if that window already passed, join just BEFORE start
//! - if even that is impossible, join ASAP
//!
//! The decision is a pure function of `(start_at, lead_minutes, now)`. The
//! clock is always passed in, never read, so identical inputs always produce
//! identical plans.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Arrive at least this long before start if possible.
const BUFFER_BEFORE_START_SECS: i64 = 15;

/// Minimum margin from the evaluation instant; dispatch can't reliably act
/// sooner than this.
const BUFFER_NOW_SECS: i64 = 10;

/// Which policy branch produced the join instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinMode {
    /// The ideal lead window is still reachable.
    Lead,
    /// The lead window passed; joining shortly before start instead.
    JustBefore,
    /// Neither window is reachable; joining as soon as feasible.
    Asap,
}

impl JoinMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinMode::Lead => "lead",
            JoinMode::JustBefore => "just_before",
            JoinMode::Asap => "asap",
        }
    }
}

impl std::fmt::Display for JoinMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decided join attempt for one meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinPlan {
    /// When the meeting is scheduled to begin.
    pub start_at: DateTime<Utc>,
    /// The ideal join instant: start minus the lead interval.
    pub desired_at: DateTime<Utc>,
    /// When the bot should actually be dispatched.
    pub actual_join_at: DateTime<Utc>,
    /// True if the join can only happen at or after the meeting start.
    pub is_late: bool,
    pub mode: JoinMode,
}

/// Decide when the bot should join a meeting.
///
/// Total over its domain: any start instant (past or future), any
/// non-negative lead (fractional minutes allowed), any evaluation instant.
/// It never fails; a meeting that is already over still yields a plan, just
/// one flagged `is_late` for the caller to act on.
pub fn plan_join(start_at: DateTime<Utc>, lead_minutes: f64, now: DateTime<Utc>) -> JoinPlan {
    let lead = Duration::milliseconds((lead_minutes * 60_000.0).round() as i64);

    // Saturate instead of panicking near the representable range; events
    // with a missing start are carried as a minimum-instant sentinel and
    // must still yield a plan.
    let desired_at = start_at
        .checked_sub_signed(lead)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let earliest_dispatch = now
        .checked_add_signed(Duration::seconds(BUFFER_NOW_SECS))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let latest_before_start = start_at
        .checked_sub_signed(Duration::seconds(BUFFER_BEFORE_START_SECS))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let (actual_join_at, mode) = if desired_at > earliest_dispatch {
        (desired_at, JoinMode::Lead)
    } else if latest_before_start > earliest_dispatch {
        (latest_before_start, JoinMode::JustBefore)
    } else {
        (earliest_dispatch, JoinMode::Asap)
    };

    JoinPlan {
        start_at,
        desired_at,
        actual_join_at,
        is_late: actual_join_at >= start_at,
        mode,
    }
}
