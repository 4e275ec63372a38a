//! Daily per-IP quota for the assistant endpoint.
//!
//! Prefers a durable Redis counter (INCR + 24h EXPIRE) so the quota survives
//! restarts; degrades to an in-process daily window when Redis is
//! unconfigured or unreachable. Degraded counts are advisory only.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// Daily quota counter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// Count one interaction for the key's current UTC day and return the
    /// new count.
    async fn hit_daily(&self, key: &str, now: DateTime<Utc>) -> Result<i64>;
}

struct DayBucket {
    count: i64,
    window_start: DateTime<Utc>,
}

/// Redis-backed quota with an in-memory fallback.
pub struct RedisBackedQuota {
    client: Option<redis::Client>,
    fallback: Mutex<HashMap<String, DayBucket>>,
}

impl RedisBackedQuota {
    pub fn new(client: Option<redis::Client>) -> Self {
        Self {
            client,
            fallback: Mutex::new(HashMap::new()),
        }
    }

    async fn hit_redis(
        &self,
        client: &redis::Client,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let redis_key = format!("quota:{}:{}", key, now.format("%Y-%m-%d"));

        let count: i64 = redis::cmd("INCR")
            .arg(&redis_key)
            .query_async(&mut conn)
            .await?;

        if count == 1 {
            let _: () = redis::cmd("EXPIRE")
                .arg(&redis_key)
                .arg(86400)
                .query_async(&mut conn)
                .await?;
        }

        Ok(count)
    }

    fn hit_memory(&self, key: &str, now: DateTime<Utc>) -> i64 {
        let mut buckets = self.fallback.lock().unwrap();
        let bucket = buckets.entry(key.to_string()).or_insert(DayBucket {
            count: 0,
            window_start: now,
        });

        if now - bucket.window_start > Duration::hours(24) {
            bucket.count = 0;
            bucket.window_start = now;
        }
        bucket.count += 1;
        bucket.count
    }
}

#[async_trait]
impl QuotaStore for RedisBackedQuota {
    async fn hit_daily(&self, key: &str, now: DateTime<Utc>) -> Result<i64> {
        if let Some(client) = &self.client {
            match self.hit_redis(client, key, now).await {
                Ok(count) => return Ok(count),
                Err(e) => {
                    tracing::warn!("durable quota counter unavailable, using memory: {:#}", e);
                }
            }
        }

        Ok(self.hit_memory(key, now))
    }
}
