//! Request quotas for the explanation endpoint: a sliding per-minute window
//! and a fixed per-day window, keyed by one global identifier. Rejections
//! say which window tripped and when to retry.

use crate::error::{RateLimitScope, SkittyError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

#[cfg(not(test))]
use crate::state::get_config;

#[cfg(test)]
use crate::tests::config_mock::mock_state::get_config;

const MINUTE_MS: u64 = 60 * 1000;
const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Global limiter instance; None when the explain service is disabled
static EXPLAIN_LIMITER: OnceCell<Option<ExplainRateLimiter>> = OnceCell::const_new();

/// Counts for both windows plus when each window frees a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCounts {
    pub last_minute: u64,
    pub last_day: u64,
    /// ms timestamp at which the oldest in-minute entry expires
    pub minute_reset_ms: u64,
    /// ms timestamp at which the oldest in-day entry expires
    pub day_reset_ms: u64,
}

/// Storage for request timestamps
#[async_trait]
pub trait WindowStore: Send + Sync {
    async fn record(&self, now_ms: u64) -> Result<(), SkittyError>;

    async fn counts(&self, now_ms: u64) -> Result<WindowCounts, SkittyError>;

    /// Clear all recorded timestamps (mainly for testing)
    async fn clear(&self) -> Result<(), SkittyError>;
}

/// In-memory implementation; entries older than a day are pruned on write
pub struct InMemoryWindowStore {
    timestamps: Mutex<Vec<u64>>,
}

impl InMemoryWindowStore {
    pub fn new() -> Self {
        Self { timestamps: Mutex::new(Vec::new()) }
    }
}

impl Default for InMemoryWindowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WindowStore for InMemoryWindowStore {
    async fn record(&self, now_ms: u64) -> Result<(), SkittyError> {
        let mut timestamps = self.timestamps.lock().map_err(|e| {
            SkittyError::InternalServerError(format!("Failed to lock window store: {e}"))
        })?;
        timestamps.retain(|&ts| now_ms.saturating_sub(ts) < DAY_MS);
        timestamps.push(now_ms);
        Ok(())
    }

    async fn counts(&self, now_ms: u64) -> Result<WindowCounts, SkittyError> {
        let timestamps = self.timestamps.lock().map_err(|e| {
            SkittyError::InternalServerError(format!("Failed to lock window store: {e}"))
        })?;
        let in_day: Vec<u64> = timestamps
            .iter()
            .copied()
            .filter(|&ts| now_ms.saturating_sub(ts) < DAY_MS)
            .collect();
        let in_minute: Vec<u64> = in_day
            .iter()
            .copied()
            .filter(|&ts| now_ms.saturating_sub(ts) < MINUTE_MS)
            .collect();
        Ok(WindowCounts {
            last_minute: in_minute.len() as u64,
            last_day: in_day.len() as u64,
            minute_reset_ms: in_minute.iter().min().map(|&ts| ts + MINUTE_MS).unwrap_or(now_ms),
            day_reset_ms: in_day.iter().min().map(|&ts| ts + DAY_MS).unwrap_or(now_ms),
        })
    }

    async fn clear(&self) -> Result<(), SkittyError> {
        let mut timestamps = self.timestamps.lock().map_err(|e| {
            SkittyError::InternalServerError(format!("Failed to lock window store: {e}"))
        })?;
        timestamps.clear();
        Ok(())
    }
}

pub struct ExplainRateLimiter {
    store: Arc<dyn WindowStore>,
    per_minute: u64,
    per_day: u64,
}

impl ExplainRateLimiter {
    pub fn new(store: Arc<dyn WindowStore>, per_minute: u64, per_day: u64) -> Self {
        Self { store, per_minute, per_day }
    }

    fn retry_after_seconds(reset_ms: u64, now_ms: u64) -> u64 {
        reset_ms.saturating_sub(now_ms).div_ceil(1000)
    }

    /// Admit or reject one request at the given instant, recording it when
    /// admitted. The minute window is checked first, then the day window.
    pub async fn check_and_record(&self, now_ms: u64) -> Result<(), SkittyError> {
        let counts = self.store.counts(now_ms).await?;

        if counts.last_minute >= self.per_minute {
            return Err(SkittyError::RateLimitExceeded {
                scope: RateLimitScope::PerMinute,
                retry_after_seconds: Self::retry_after_seconds(counts.minute_reset_ms, now_ms),
            });
        }
        if counts.last_day >= self.per_day {
            return Err(SkittyError::RateLimitExceeded {
                scope: RateLimitScope::PerDay,
                retry_after_seconds: Self::retry_after_seconds(counts.day_reset_ms, now_ms),
            });
        }

        self.store.record(now_ms).await
    }

    /// Initialize the global limiter from config
    pub async fn init_rate_limiter() -> Result<(), SkittyError> {
        let config = get_config()?;
        let limiter = if config.explain.enabled {
            log::info!(
                "Explain limiter initialized: {}/minute, {}/day",
                config.explain.requests_per_minute,
                config.explain.requests_per_day
            );
            Some(ExplainRateLimiter::new(
                Arc::new(InMemoryWindowStore::new()),
                config.explain.requests_per_minute,
                config.explain.requests_per_day,
            ))
        } else {
            log::info!("Explain service disabled");
            None
        };
        EXPLAIN_LIMITER.set(limiter).map_err(|_| {
            SkittyError::InternalServerError("Explain limiter already initialized".to_string())
        })?;
        Ok(())
    }

    /// Global admission check used by the server method
    pub async fn check_explain_limit() -> Result<(), SkittyError> {
        match EXPLAIN_LIMITER.get() {
            Some(Some(limiter)) => {
                let now_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
                limiter.check_and_record(now_ms).await
            }
            Some(None) => Err(SkittyError::ValidationError(
                "Explain service is disabled".to_string(),
            )),
            None => Err(SkittyError::InternalServerError(
                "Explain limiter not initialized".to_string(),
            )),
        }
    }
}
