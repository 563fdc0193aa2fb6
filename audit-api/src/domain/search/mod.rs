//! Audit log search - a small query language compiled to PostgreSQL.
//!
//! A query is compiled into one of two forms:
//!
//! - **Full-text**: `login AND failed`, `login OR logout`, `login NOT failed`
//!   become a `to_tsquery` expression matched against the precomputed
//!   `search_vector` column and ranked with `ts_rank`.
//! - **Column conditions**: any `column:value` pair in the query, e.g.
//!   `user_name:John AND action:LOGIN`, turns the *whole* query into `ILIKE`
//!   filters. Bare terms in such a query are matched across the free-text
//!   columns.
//!
//! # Architecture
//!
//! - [`compile`] - tokenizer, classifier and the two translators
//! - [`SearchStrategy`] - picks full-text, column-filtered or unfiltered execution
//! - [`StatementBuilder`] - parameterized count and data statements
//! - [`AuditLogRepository`] - storage port (PostgreSQL, mocks)
//!
//! # Example
//!
//! ```ignore
//! use audit_api::domain::search::{AuditLogRepository, StatementBuilder};
//! use audit_api::domain::search::repository::PgAuditLogRepository;
//!
//! let repository = PgAuditLogRepository::new(pool, StatementBuilder::default());
//! let page = repository.search(&params).await?;
//! ```

mod conditions;
mod full_text;
mod parser;
mod statement;
mod strategy;
mod tokenizer;
mod traits;
mod types;

pub mod repository;

// Re-export main types
pub use parser::{compile, is_column_specific};
pub use statement::{SearchStatements, StatementBuilder};
pub use strategy::SearchStrategy;
pub use tokenizer::tokenize;
pub use traits::{AuditLogRepository, SearchError};
pub use types::{
    AuditColumn, AuditLogRecord, CompiledQuery, DateRange, JoinOperator, Pagination,
    QueryCondition, SearchPage, SearchParams, SortColumn, SortOrder, MAX_PAGE_SIZE,
};
