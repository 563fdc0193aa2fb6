//! Core types for the audit log search domain.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use time::OffsetDateTime;

use super::traits::SearchError;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Columns of `audit_logs` that may appear in a `column:value` filter.
///
/// Parsing is ASCII case-insensitive, so `User_Name:john` resolves to
/// [`AuditColumn::UserName`]. Anything that fails to parse never reaches SQL.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AuditColumn {
    Id,
    Timestamp,
    UserId,
    UserName,
    Action,
    ResourceType,
    ResourceId,
    IpAddress,
    Status,
    Details,
    Metadata,
    CreatedAt,
}

impl AuditColumn {
    /// Columns searched by a bare term inside a column-specific query.
    pub const FREE_TEXT: [AuditColumn; 8] = [
        AuditColumn::UserId,
        AuditColumn::UserName,
        AuditColumn::Action,
        AuditColumn::ResourceType,
        AuditColumn::ResourceId,
        AuditColumn::IpAddress,
        AuditColumn::Status,
        AuditColumn::Details,
    ];

    /// The SQL identifier of this column.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// All column names, sorted alphabetically.
    pub fn sorted_names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = AuditColumn::iter().map(AuditColumn::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Boolean operator joining a condition to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum JoinOperator {
    #[default]
    And,
    Or,
}

impl JoinOperator {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A single filter produced by the column-condition translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCondition {
    /// `None` matches the term against every free-text column.
    pub column: Option<AuditColumn>,
    /// Literal with surrounding quotes removed.
    pub search_term: String,
    /// Joins this condition to the previous one; unused on the first.
    pub join: JoinOperator,
}

/// Output of [`compile`](super::compile).
///
/// Only one of `full_text` / `conditions` is meaningful, chosen by
/// `is_column_specific`. Both are empty for a degenerate query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledQuery {
    pub is_column_specific: bool,
    /// A `to_tsquery` expression such as `login:* & !failed:*`.
    pub full_text: String,
    pub conditions: Vec<QueryCondition>,
}

/// Whitelisted sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortColumn {
    #[default]
    Timestamp,
    UserId,
    UserName,
    Action,
    ResourceType,
    Status,
    CreatedAt,
}

impl SortColumn {
    /// Resolve a caller supplied key, falling back to `timestamp`.
    pub fn resolve(key: Option<&str>) -> Self {
        key.and_then(|k| k.parse().ok()).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Requested ordering of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub key: Option<String>,
    pub descending: bool,
}

impl SortOrder {
    pub fn new(key: Option<String>, descending: bool) -> Self {
        Self { key, descending }
    }

    /// `rank` and `relevance` ask for full-text relevance ordering.
    pub fn by_relevance(&self) -> bool {
        matches!(self.key.as_deref(), Some("rank" | "relevance"))
    }

    pub fn column(&self) -> SortColumn {
        SortColumn::resolve(self.key.as_deref())
    }

    pub fn direction(&self) -> &'static str {
        if self.descending {
            "DESC"
        } else {
            "ASC"
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::new(None, true)
    }
}

/// A validated, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    page_size: i64,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64) -> Result<Self, SearchError> {
        if page < 1 {
            return Err(SearchError::InvalidPagination(
                "Parameter 'from' must be greater than 0".to_string(),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(SearchError::InvalidPagination(format!(
                "Parameter 'size' must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if (page - 1).checked_mul(page_size).is_none() {
            return Err(SearchError::InvalidPagination(
                "Parameter 'from' is too large for the requested page size".to_string(),
            ));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

/// Optional bounds on `audit_logs.timestamp`, both inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
}

impl DateRange {
    pub fn new(from: Option<OffsetDateTime>, to: Option<OffsetDateTime>) -> Self {
        Self { from, to }
    }
}

/// Everything needed to run one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub pagination: Pagination,
    pub date_range: DateRange,
    pub sort: SortOrder,
}

/// A stored audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogRecord {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub user_id: String,
    pub user_name: Option<String>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub ip_address: Option<String>,
    pub status: String,
    pub details: Option<String>,
    pub metadata: Option<serde_json::Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Relevance score, only set by full-text searches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<f32>,
}

/// One page of results plus the number of rows matching the filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub hits: Vec<AuditLogRecord>,
    pub total: i64,
}

impl SearchPage {
    pub fn empty() -> Self {
        Self::default()
    }
}
