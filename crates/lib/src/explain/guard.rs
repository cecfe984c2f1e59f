//! Client-side guard for the explanation endpoint: refuses oversized
//! payloads outright and tracks its own request timestamps in a persisted
//! file so calls the server would reject are pre-empted locally.

use crate::error::{RateLimitScope, SkittyError};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

const MINUTE_MS: u64 = 60 * 1000;
const DAY_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Serialize, Deserialize, Default)]
pub struct ExplainRequestTracker {
    pub timestamps: Vec<u64>,
}

impl ExplainRequestTracker {
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        if path.as_ref().exists() {
            let data = fs::read_to_string(path).unwrap_or_default();
            serde_json::from_str(&data).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) {
        if let Ok(json) = serde_json::to_string_pretty(&self) {
            let _ = fs::write(path, json);
        }
    }

    fn in_window(&self, now_ms: u64, window_ms: u64) -> u64 {
        self.timestamps
            .iter()
            .filter(|&&ts| now_ms.saturating_sub(ts) < window_ms)
            .count() as u64
    }

    /// Check whether a request of the given payload size may be sent now
    pub fn can_request(
        &self,
        payload_len: usize,
        max_payload_bytes: usize,
        per_minute: u64,
        per_day: u64,
        now_ms: u64,
    ) -> Result<(), SkittyError> {
        if payload_len > max_payload_bytes {
            return Err(SkittyError::ValidationError(
                "Transaction data is too large to explain".to_string(),
            ));
        }
        if self.in_window(now_ms, MINUTE_MS) >= per_minute {
            return Err(SkittyError::RateLimitExceeded {
                scope: RateLimitScope::PerMinute,
                retry_after_seconds: 60,
            });
        }
        if self.in_window(now_ms, DAY_MS) >= per_day {
            return Err(SkittyError::RateLimitExceeded {
                scope: RateLimitScope::PerDay,
                retry_after_seconds: DAY_MS / 1000,
            });
        }
        Ok(())
    }

    /// Record a request about to be sent, pruning entries older than a day
    pub fn record(&mut self, now_ms: u64) {
        self.timestamps.retain(|&ts| now_ms.saturating_sub(ts) < DAY_MS);
        self.timestamps.push(now_ms);
    }
}
