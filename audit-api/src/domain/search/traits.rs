//! Trait definitions for the audit log store.
//!
//! The HTTP layer only talks to [`AuditLogRepository`], so handlers can be
//! tested against an in-memory mock.

use async_trait::async_trait;

use super::types::{AuditLogRecord, DateRange, Pagination, SearchPage, SearchParams};

/// Error type for search operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("{0}")]
    InvalidPagination(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// Read access to stored audit logs.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Compile `params.query`, pick a strategy and return one page of matches.
    ///
    /// A blank query lists every record in the date range; a query that
    /// compiles to nothing returns an empty page without touching the store.
    async fn search(&self, params: &SearchParams) -> Result<SearchPage>;

    /// List records newest first, optionally bounded by date.
    async fn list(&self, pagination: Pagination, date_range: DateRange) -> Result<SearchPage>;

    /// Get a single record by id.
    async fn get_by_id(&self, id: i64) -> Result<Option<AuditLogRecord>>;
}
