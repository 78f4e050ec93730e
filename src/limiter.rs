use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

// Admission decision for one request attempt. Denied is terminal for
// the attempt; the server never retries on the caller's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Denied,
}

// Per-user request counter over a fixed window.
struct RateWindow {
    window_start: Instant,
    count: u32,
}

// Fixed-window rate limiter keyed by user id. The whole
// reset-check-increment sequence for one user runs under a single lock
// acquisition, so two concurrent requests cannot both be admitted into
// a full window.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, RateWindow>>,
    max_requests: u32,
    window: Duration,
    evict_after: Duration,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests: config.max_requests,
            window: config.window(),
            evict_after: config.evict_after(),
        }
    }

    pub fn admit(&self, user_id: &str) -> Admission {
        self.admit_at(user_id, Instant::now())
    }

    // Check + record with an explicit timestamp, for deterministic tests.
    fn admit_at(&self, user_id: &str, now: Instant) -> Admission {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        let entry = windows
            .entry(user_id.to_string())
            .or_insert_with(|| RateWindow {
                window_start: now,
                count: 0,
            });

        if now.duration_since(entry.window_start) >= self.window {
            entry.window_start = now;
            entry.count = 0;
        }

        if entry.count < self.max_requests {
            entry.count += 1;
            Admission::Allowed
        } else {
            tracing::debug!("Rate limit hit for user {}", user_id);
            Admission::Denied
        }
    }

    // Drop windows that started longer than evict_after ago. A user who
    // comes back later just gets a fresh window, which admits exactly
    // the way an expired one would.
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    fn cleanup_at(&self, now: Instant) {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let before = windows.len();
        windows.retain(|_, w| now.duration_since(w.window_start) < self.evict_after);

        let evicted = before - windows.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} stale rate limit entries", evicted);
        }
    }

    #[allow(dead_code)]
    pub fn tracked_users(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    // Background loop keeping the window map bounded.
    pub fn start_cleanup_task(self: &Arc<Self>, interval: Duration) {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                limiter.cleanup();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_ms: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            window_ms,
            max_requests,
            evict_after_ms: window_ms * 60,
        })
    }

    #[test]
    fn second_request_in_window_is_denied() {
        let limiter = limiter(1, 1000);
        let now = Instant::now();

        assert_eq!(limiter.admit_at("u1", now), Admission::Allowed);
        assert_eq!(
            limiter.admit_at("u1", now + Duration::from_millis(500)),
            Admission::Denied
        );
    }

    #[test]
    fn window_expiry_readmits_exactly_one() {
        let limiter = limiter(1, 1000);
        let now = Instant::now();

        assert_eq!(limiter.admit_at("u1", now), Admission::Allowed);
        assert_eq!(
            limiter.admit_at("u1", now + Duration::from_millis(1100)),
            Admission::Allowed
        );
        assert_eq!(
            limiter.admit_at("u1", now + Duration::from_millis(1200)),
            Admission::Denied
        );
    }

    #[test]
    fn users_do_not_share_windows() {
        let limiter = limiter(1, 1000);
        let now = Instant::now();

        assert_eq!(limiter.admit_at("u1", now), Admission::Allowed);
        assert_eq!(limiter.admit_at("u2", now), Admission::Allowed);
        assert_eq!(limiter.admit_at("u1", now), Admission::Denied);
        assert_eq!(limiter.admit_at("u2", now), Admission::Denied);
    }

    #[test]
    fn denied_request_does_not_extend_window() {
        let limiter = limiter(1, 1000);
        let now = Instant::now();

        assert_eq!(limiter.admit_at("u1", now), Admission::Allowed);
        assert_eq!(
            limiter.admit_at("u1", now + Duration::from_millis(900)),
            Admission::Denied
        );
        // The window still expires relative to its start, not the denial.
        assert_eq!(
            limiter.admit_at("u1", now + Duration::from_millis(1000)),
            Admission::Allowed
        );
    }

    #[test]
    fn limits_above_one_admit_up_to_the_limit() {
        let limiter = limiter(3, 1000);
        let now = Instant::now();

        for _ in 0..3 {
            assert_eq!(limiter.admit_at("u1", now), Admission::Allowed);
        }
        assert_eq!(limiter.admit_at("u1", now), Admission::Denied);
    }

    #[test]
    fn cleanup_evicts_only_stale_entries() {
        let limiter = limiter(1, 1000);
        let now = Instant::now();

        limiter.admit_at("stale", now);
        limiter.admit_at("fresh", now + Duration::from_secs(59));
        assert_eq!(limiter.tracked_users(), 2);

        limiter.cleanup_at(now + Duration::from_secs(60));
        assert_eq!(limiter.tracked_users(), 1);

        // The evicted user starts over with a fresh window.
        assert_eq!(
            limiter.admit_at("stale", now + Duration::from_secs(61)),
            Admission::Allowed
        );
    }
}
