//! Retention policy for stored artifacts.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long artifacts stay reachable after insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Time-to-live measured from the artifact's creation
    pub ttl: Duration,
    /// Whether expiry is enforced at all
    pub enabled: bool,
}

impl RetentionPolicy {
    /// Create a new retention policy with default settings.
    ///
    /// Default: one hour from creation.
    pub fn new() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            enabled: true,
        }
    }

    /// Set the time-to-live.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Enable or disable expiry.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Never expire anything.
    pub fn disabled() -> Self {
        Self {
            ttl: Duration::ZERO,
            enabled: false,
        }
    }

    /// Reap interval appropriate for this TTL.
    ///
    /// Shorter TTLs get tighter intervals so the drift between expiry and
    /// reclamation stays small relative to the TTL:
    /// - TTL <= 1 minute: every second
    /// - TTL <= 1 hour: every minute
    /// - TTL <= 1 day: every 10 minutes
    /// - longer: every hour
    pub fn recommended_reap_interval(&self) -> Duration {
        match self.ttl.as_secs() {
            0..=60 => Duration::from_secs(1),
            61..=3600 => Duration::from_secs(60),
            3601..=86400 => Duration::from_secs(600),
            _ => Duration::from_secs(3600),
        }
    }

    /// TTL as a chrono delta; saturates for durations chrono cannot represent.
    fn ttl_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.ttl).unwrap_or(TimeDelta::MAX)
    }

    /// Whether an artifact created at `created_at` has expired as of `now`.
    ///
    /// Expiry is strict: an artifact aged exactly `ttl` is still live.
    pub fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }
        now.signed_duration_since(created_at) > self.ttl_delta()
    }

    /// Instant after which an artifact created at `created_at` is no longer served.
    pub fn expires_at(&self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !self.enabled {
            return None;
        }
        created_at.checked_add_signed(self.ttl_delta())
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new()
    }
}
