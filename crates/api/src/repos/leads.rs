//! Lead repository for PostgreSQL.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::models::Lead;

/// Repository for waitlist lead operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadRepo: Send + Sync {
    /// Find a lead by (normalized) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Lead>>;

    /// Insert a new lead. The timestamp is generated by the database.
    async fn create(&self, email: &str) -> Result<Lead>;

    /// Connectivity probe for health checks.
    async fn ping(&self) -> Result<()>;
}

/// PostgreSQL implementation of LeadRepo.
#[derive(Clone)]
pub struct PgLeadRepo {
    pool: Pool<Postgres>,
}

impl PgLeadRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadRepo for PgLeadRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<Lead>> {
        let lead = sqlx::query_as::<_, Lead>(
            "SELECT id, email, created_at FROM waitlist WHERE email = $1 LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lead)
    }

    async fn create(&self, email: &str) -> Result<Lead> {
        let lead = sqlx::query_as::<_, Lead>(
            "INSERT INTO waitlist (email) VALUES ($1) RETURNING id, email, created_at",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(lead)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
