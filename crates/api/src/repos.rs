//! Database repositories (PostgreSQL).
//!
//! This module contains traits and implementations for database access.
//! Each repository is abstracted behind a trait to enable mocking in tests.
//!
//! ## Repositories
//!
//! - **leads** - Waitlist lead lookup and insertion
//!
//! ## Usage in Handlers
//!
//! Repositories are accessed via `state.repos`:
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     let existing = state.repos.leads.find_by_email(&email).await?;
//! }
//! ```

mod leads;

pub use leads::{LeadRepo, PgLeadRepo};

#[cfg(test)]
pub use leads::MockLeadRepo;

use std::sync::Arc;

/// Collection of all database repositories.
#[derive(Clone)]
pub struct Repos {
    pub leads: Arc<dyn LeadRepo>,
}
