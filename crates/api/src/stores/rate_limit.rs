//! In-memory request counters.
//!
//! Process-lifetime only; counts reset on restart. `now` is always passed in
//! by the caller so window arithmetic is testable without sleeping.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Under the limit, includes current count.
    Allowed(i64),
    /// Over the limit, includes current count.
    Exceeded(i64),
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }
}

struct Bucket {
    count: i64,
    window_start: DateTime<Utc>,
}

/// Keyed counter with fixed windows that reset once the window has elapsed.
pub struct FixedWindowLimiter {
    window: Duration,
    max: i64,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, max: i64) -> Self {
        Self {
            window,
            max,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request against the key's current window.
    pub fn hit(&self, key: &str, now: DateTime<Utc>) -> RateLimitResult {
        let mut buckets = self.buckets.lock().unwrap();
        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            count: 0,
            window_start: now,
        });

        if now - bucket.window_start > self.window {
            bucket.count = 0;
            bucket.window_start = now;
        }
        bucket.count += 1;

        if bucket.count > self.max {
            RateLimitResult::Exceeded(bucket.count)
        } else {
            RateLimitResult::Allowed(bucket.count)
        }
    }
}

/// Keyed minimum-spacing tracker (expiry timestamps per key).
pub struct CooldownTracker {
    period: Duration,
    expiries: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl CooldownTracker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            expiries: Mutex::new(HashMap::new()),
        }
    }

    /// Whole seconds left on the key's cooldown, or None when not cooling down.
    pub fn remaining_secs(&self, key: &str, now: DateTime<Utc>) -> Option<i64> {
        let expiries = self.expiries.lock().unwrap();
        let expiry = expiries.get(key)?;
        let remaining = (*expiry - now).num_seconds();
        (remaining > 0).then_some(remaining)
    }

    /// Start (or restart) the cooldown for the key.
    pub fn touch(&self, key: &str, now: DateTime<Utc>) {
        let mut expiries = self.expiries.lock().unwrap();
        expiries.insert(key.to_string(), now + self.period);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        "2025-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn allows_up_to_the_limit() {
        let limiter = FixedWindowLimiter::new(Duration::seconds(60), 10);

        for i in 1..=10 {
            assert_eq!(limiter.hit("1.2.3.4", t0()), RateLimitResult::Allowed(i));
        }
        assert_eq!(limiter.hit("1.2.3.4", t0()), RateLimitResult::Exceeded(11));
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = FixedWindowLimiter::new(Duration::seconds(60), 2);

        limiter.hit("ip", t0());
        limiter.hit("ip", t0());
        assert!(!limiter.hit("ip", t0()).is_allowed());

        let later = t0() + Duration::seconds(61);
        assert_eq!(limiter.hit("ip", later), RateLimitResult::Allowed(1));
    }

    #[test]
    fn keys_are_counted_independently() {
        let limiter = FixedWindowLimiter::new(Duration::seconds(60), 1);

        assert!(limiter.hit("a", t0()).is_allowed());
        assert!(!limiter.hit("a", t0()).is_allowed());
        assert!(limiter.hit("b", t0()).is_allowed());
    }

    #[test]
    fn cooldown_reports_remaining_seconds() {
        let cooldown = CooldownTracker::new(Duration::seconds(60));

        assert!(cooldown.remaining_secs("a@b.com", t0()).is_none());

        cooldown.touch("a@b.com", t0());
        assert_eq!(cooldown.remaining_secs("a@b.com", t0()), Some(60));
        assert_eq!(
            cooldown.remaining_secs("a@b.com", t0() + Duration::seconds(45)),
            Some(15)
        );
        assert!(
            cooldown
                .remaining_secs("a@b.com", t0() + Duration::seconds(60))
                .is_none()
        );
    }

    #[test]
    fn touch_restarts_the_cooldown() {
        let cooldown = CooldownTracker::new(Duration::seconds(60));

        cooldown.touch("a@b.com", t0());
        cooldown.touch("a@b.com", t0() + Duration::seconds(30));
        assert_eq!(
            cooldown.remaining_secs("a@b.com", t0() + Duration::seconds(60)),
            Some(30)
        );
    }
}
