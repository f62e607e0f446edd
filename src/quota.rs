use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::KeyValueStore;

const QUOTA_KEY: &str = "coach:quota";
const MIN_CALL_INTERVAL_SECS: i64 = 5;
const HOURLY_LIMIT: u32 = 10;
const DAILY_LIMIT: u32 = 50;

/// Persisted call counters with lazily evaluated windows. Windows are never
/// reset by a timer; a count is treated as zero once `now` has passed its
/// reset timestamp, so the tracker stays correct across arbitrarily long app
/// suspensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaState {
    pub hourly_count: u32,
    pub hourly_reset_at: DateTime<Utc>,
    pub daily_count: u32,
    pub daily_reset_at: DateTime<Utc>,
    pub last_call_at: DateTime<Utc>,
}

impl QuotaState {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            hourly_count: 0,
            hourly_reset_at: now + Duration::hours(1),
            daily_count: 0,
            daily_reset_at: now + Duration::hours(24),
            last_call_at: now - Duration::hours(24),
        }
    }

    fn apply_due_resets(&mut self, now: DateTime<Utc>) {
        if now >= self.hourly_reset_at {
            self.hourly_count = 0;
            self.hourly_reset_at = now + Duration::hours(1);
        }
        if now >= self.daily_reset_at {
            self.daily_count = 0;
            self.daily_reset_at = now + Duration::hours(24);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    Cooldown,
    HourlyLimit,
    DailyLimit,
}

impl DenialReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenialReason::Cooldown => "cooldown",
            DenialReason::HourlyLimit => "hourly_limit",
            DenialReason::DailyLimit => "daily_limit",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Admission {
    pub allowed: bool,
    pub reason: Option<DenialReason>,
}

impl Admission {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: DenialReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// Budget admission control for remote generation calls. This is cost
/// control, not a security boundary: store failures fail open and denials
/// route the caller to the fallback generator.
#[derive(Clone)]
pub struct QuotaTracker {
    store: Arc<dyn KeyValueStore>,
}

impl QuotaTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn can_call(&self) -> Admission {
        let now = Utc::now();
        let state = self.load(now).await;

        if now - state.last_call_at < Duration::seconds(MIN_CALL_INTERVAL_SECS) {
            return Admission::deny(DenialReason::Cooldown);
        }

        let effective_hourly = if now >= state.hourly_reset_at {
            0
        } else {
            state.hourly_count
        };
        if effective_hourly >= HOURLY_LIMIT {
            return Admission::deny(DenialReason::HourlyLimit);
        }

        let effective_daily = if now >= state.daily_reset_at {
            0
        } else {
            state.daily_count
        };
        if effective_daily >= DAILY_LIMIT {
            return Admission::deny(DenialReason::DailyLimit);
        }

        Admission::allow()
    }

    /// Records one remote call. Callers must invoke this only after a remote
    /// call actually succeeded, never speculatively.
    pub async fn record_call(&self) {
        let now = Utc::now();
        let mut state = self.load(now).await;
        state.apply_due_resets(now);
        state.hourly_count += 1;
        state.daily_count += 1;
        state.last_call_at = now;

        match serde_json::to_string(&state) {
            Ok(serialized) => {
                if let Err(error) = self.store.set(QUOTA_KEY, &serialized).await {
                    warn!(?error, "failed to persist quota state");
                }
            }
            Err(error) => warn!(?error, "failed to serialize quota state"),
        }
    }

    async fn load(&self, now: DateTime<Utc>) -> QuotaState {
        let raw = match self.store.get(QUOTA_KEY).await {
            Ok(raw) => raw,
            Err(error) => {
                warn!(?error, "failed to read quota state; assuming fresh state");
                return QuotaState::fresh(now);
            }
        };

        match raw {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                debug!(?error, "unparsable quota state replaced with defaults");
                QuotaState::fresh(now)
            }),
            None => QuotaState::fresh(now),
        }
    }
}
