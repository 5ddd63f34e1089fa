//! Bucket arithmetic for the question rotation.
//!
//! Wall-clock time since a fixed epoch is cut into equal buckets. The
//! bucket a moment falls into decides the question; the distance to the
//! next boundary decides how long the scheduler sleeps and when the
//! current question expires.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::QuizError;

/// Upper bound accepted for the interval and the expiry margin.
pub const MAX_SCHEDULE_SPAN: Duration = Duration::from_secs(24 * 60 * 60);

/// Fixed bucket grid shared by every room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionSchedule {
    interval_ms: u64,
    margin_ms: u64,
    epoch: DateTime<Utc>,
}

/// Where a given instant sits on the bucket grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Start of the current bucket in milliseconds since the epoch.
    /// Strictly increases from one bucket to the next.
    pub round: u64,
    /// `round` truncated to 32 bits; the value fed to the generator.
    pub bucket: u32,
    /// Time left until the next boundary. Never zero.
    pub remaining: Duration,
    /// Instant after which clients should consider the question stale.
    pub expires_at: DateTime<Utc>,
}

impl QuestionSchedule {
    /// Builds a schedule.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::InvalidRequest`] if the interval is shorter
    /// than one millisecond, or either span exceeds [`MAX_SCHEDULE_SPAN`].
    pub fn new(
        interval: Duration,
        margin: Duration,
        epoch: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        if interval > MAX_SCHEDULE_SPAN || margin > MAX_SCHEDULE_SPAN {
            return Err(QuizError::InvalidRequest(format!(
                "interval and margin must not exceed {}s",
                MAX_SCHEDULE_SPAN.as_secs()
            )));
        }
        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(0);
        if interval_ms == 0 {
            return Err(QuizError::InvalidRequest(
                "interval must be at least 1ms".to_string(),
            ));
        }
        let margin_ms = u64::try_from(margin.as_millis()).unwrap_or(0);
        Ok(Self {
            interval_ms,
            margin_ms,
            epoch,
        })
    }

    /// Bucket width.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Extra time granted past the bucket boundary before a question expires.
    #[must_use]
    pub const fn margin(&self) -> Duration {
        Duration::from_millis(self.margin_ms)
    }

    /// Origin of the bucket grid.
    #[must_use]
    pub const fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Locates `now` on the grid. Instants before the epoch clamp to the
    /// first bucket.
    ///
    /// Both `now` and the epoch are floored to whole unix milliseconds
    /// before subtracting, so sub-millisecond digits of the epoch never
    /// shift a boundary.
    #[must_use]
    pub fn tick(&self, now: DateTime<Utc>) -> Tick {
        let delta =
            u64::try_from(now.timestamp_millis() - self.epoch.timestamp_millis()).unwrap_or(0);
        let round = delta - delta % self.interval_ms;
        let remaining_ms = round + self.interval_ms - delta;

        Tick {
            round,
            bucket: round as u32,
            remaining: Duration::from_millis(remaining_ms),
            expires_at: now + millis(remaining_ms + self.margin_ms),
        }
    }
}

fn millis(ms: u64) -> TimeDelta {
    TimeDelta::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}
