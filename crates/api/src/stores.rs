//! Rate-limit counters.
//!
//! All limits here are advisory, not security boundaries. The in-memory
//! counters are lost on restart; the daily quota prefers a durable Redis
//! counter and degrades to an in-process map when Redis is unavailable.
//!
//! ## Counters
//!
//! - **lead_ip** - 10 requests / 60 s fixed window per client IP (lead endpoint)
//! - **email_cooldown** - 60 s minimum spacing per email (lead endpoint)
//! - **quota** - 8 requests / 24 h per client IP (assistant endpoint)
//!
//! ## Redis Key Pattern
//!
//! ```text
//! quota:{ip}:{YYYY-MM-DD}   → daily assistant interaction count
//! ```
//!
//! ## Usage in Handlers
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     if !state.stores.lead_ip.hit(&ip, now).is_allowed() { /* 429 */ }
//!     let count = state.stores.quota.hit_daily(&ip, now).await?;
//! }
//! ```

mod quota;
mod rate_limit;

pub use quota::{QuotaStore, RedisBackedQuota};
pub use rate_limit::{CooldownTracker, FixedWindowLimiter, RateLimitResult};

#[cfg(test)]
pub use quota::MockQuotaStore;

use std::sync::Arc;

/// Collection of all rate-limit counters, constructed once at startup.
#[derive(Clone)]
pub struct Stores {
    pub lead_ip: Arc<FixedWindowLimiter>,
    pub email_cooldown: Arc<CooldownTracker>,
    pub quota: Arc<dyn QuotaStore>,
}
