//! Fixed Window rate limiting algorithm.

use std::time::Duration;

use crate::algorithm::{current_timestamp_ms, timestamp_to_instant, Algorithm};
use crate::decision::{Decision, RateLimitInfo};
use crate::error::Result;
use crate::quota::Quota;
use crate::storage::{Storage, StorageEntry};

/// Fixed Window rate limiting algorithm.
///
/// Divides time into fixed-size windows aligned to the epoch and counts
/// requests within the current window. Simple and cheap, but allows up to
/// 2x the quota to pass at a window boundary (a burst of `limit` requests
/// at the tail of one window followed immediately by another `limit` at
/// the head of the next).
#[derive(Debug, Clone, Default)]
pub struct FixedWindow;

impl FixedWindow {
    /// Create a new Fixed Window algorithm instance.
    pub fn new() -> Self {
        Self
    }

    /// Calculate the start of the current window, aligned to the epoch.
    fn window_start(&self, now: u64, window_ms: u64) -> u64 {
        (now / window_ms) * window_ms
    }
}

impl Algorithm for FixedWindow {
    fn name(&self) -> &'static str {
        "fixed_window"
    }

    async fn check_and_record<S: Storage>(
        &self,
        storage: &S,
        key: &str,
        quota: &Quota,
    ) -> Result<Decision> {
        let now = current_timestamp_ms();
        let window_ms = quota.window().as_millis() as u64;
        let window_start = self.window_start(now, window_ms);
        let limit = quota.max_requests();
        let window_key = format!("{key}:window:{window_start}");
        let ttl = Duration::from_millis(window_ms);

        let decision = storage
            .execute_atomic(&window_key, ttl, |entry| {
                let count = match &entry {
                    Some(e) if e.window_start == window_start => e.count,
                    _ => 0,
                };

                let reset_at = timestamp_to_instant(window_start + window_ms);
                let window_instant = timestamp_to_instant(window_start);
                let retry_after = Duration::from_millis((window_start + window_ms).saturating_sub(now)).max(Duration::from_secs(1));

                if count < limit {
                    let new_count = count + 1;
                    let new_entry = StorageEntry::new(new_count, window_start).set_last_update(now);
                    let remaining = limit - new_count;
                    let info = RateLimitInfo::new(limit, remaining, reset_at, window_instant)
                        .with_algorithm("fixed_window");
                    (new_entry, Decision::allowed(info))
                } else {
                    let new_entry = entry.unwrap_or_else(|| StorageEntry::new(count, window_start));
                    let info = RateLimitInfo::new(limit, 0, reset_at, window_instant)
                        .with_algorithm("fixed_window")
                        .with_retry_after(retry_after);
                    (new_entry, Decision::denied(info))
                }
            })
            .await?;

        Ok(decision)
    }

    async fn check<S: Storage>(
        &self,
        storage: &S,
        key: &str,
        quota: &Quota,
    ) -> Result<Decision> {
        let now = current_timestamp_ms();
        let window_ms = quota.window().as_millis() as u64;
        let window_start = self.window_start(now, window_ms);
        let limit = quota.max_requests();
        let window_key = format!("{key}:window:{window_start}");

        let entry = storage.get(&window_key).await?;
        let count = match &entry {
            Some(e) if e.window_start == window_start => e.count,
            _ => 0,
        };

        let reset_at = timestamp_to_instant(window_start + window_ms);
        let window_instant = timestamp_to_instant(window_start);
        let info = RateLimitInfo::new(limit, limit.saturating_sub(count), reset_at, window_instant)
            .with_algorithm("fixed_window");

        Ok(if count < limit {
            Decision::allowed(info)
        } else {
            let retry_after = Duration::from_millis((window_start + window_ms).saturating_sub(now)).max(Duration::from_secs(1));
            Decision::denied(info.with_retry_after(retry_after))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_fixed_window_basic() {
        let algorithm = FixedWindow::new();
        let storage = MemoryStorage::new();
        let quota = Quota::per_minute(5);

        for i in 1..=5 {
            let decision = algorithm.check_and_record(&storage, "user:1", &quota).await.unwrap();
            assert!(decision.is_allowed(), "Request {} should be allowed", i);
        }

        let decision = algorithm.check_and_record(&storage, "user:1", &quota).await.unwrap();
        assert!(decision.is_denied());
        assert!(decision.info().retry_after.is_some());
    }

    #[tokio::test]
    async fn test_fixed_window_independent_keys() {
        let algorithm = FixedWindow::new();
        let storage = MemoryStorage::new();
        let quota = Quota::per_minute(1);

        assert!(algorithm.check_and_record(&storage, "user:1", &quota).await.unwrap().is_allowed());
        assert!(algorithm.check_and_record(&storage, "user:2", &quota).await.unwrap().is_allowed());
        assert!(algorithm.check_and_record(&storage, "user:1", &quota).await.unwrap().is_denied());
    }
}
