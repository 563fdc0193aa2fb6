//! Mock repository implementation for testing.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::domain::search::traits::{AuditLogRepository, Result, SearchError};
use crate::domain::search::types::{
    AuditLogRecord, DateRange, Pagination, SearchPage, SearchParams,
};

/// Calls seen by [`MockAuditLogRepository`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Search(SearchParams),
    List(Pagination, DateRange),
    GetById(i64),
}

/// In-memory repository that returns canned records and records every call.
///
/// # Examples
///
/// ```ignore
/// let repo = MockAuditLogRepository::new().with_records(vec![record]);
/// let state = AppState::new(repo.clone());
/// // ... drive the router ...
/// assert_eq!(repo.calls().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockAuditLogRepository {
    records: Arc<RwLock<Vec<AuditLogRecord>>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    fail: Arc<RwLock<bool>>,
}

#[allow(dead_code)]
impl MockAuditLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records returned by every search, list and id lookup.
    pub fn with_records(self, records: Vec<AuditLogRecord>) -> Self {
        *self.records.write().unwrap() = records;
        self
    }

    /// Make every call fail with a database error.
    pub fn failing(self) -> Self {
        *self.fail.write().unwrap() = true;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().unwrap().clone()
    }

    /// The parameters of the most recent search, if any.
    pub fn last_search(&self) -> Option<SearchParams> {
        self.calls().into_iter().rev().find_map(|call| match call {
            RecordedCall::Search(params) => Some(params),
            _ => None,
        })
    }

    fn record(&self, call: RecordedCall) -> Result<()> {
        self.calls.write().unwrap().push(call);
        if *self.fail.read().unwrap() {
            return Err(SearchError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn page(&self, pagination: Pagination) -> SearchPage {
        let records = self.records.read().unwrap();
        SearchPage {
            hits: records
                .iter()
                .skip(pagination.offset() as usize)
                .take(pagination.limit() as usize)
                .cloned()
                .collect(),
            total: records.len() as i64,
        }
    }
}

#[async_trait]
impl AuditLogRepository for MockAuditLogRepository {
    async fn search(&self, params: &SearchParams) -> Result<SearchPage> {
        self.record(RecordedCall::Search(params.clone()))?;
        Ok(self.page(params.pagination))
    }

    async fn list(&self, pagination: Pagination, date_range: DateRange) -> Result<SearchPage> {
        self.record(RecordedCall::List(pagination, date_range))?;
        Ok(self.page(pagination))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<AuditLogRecord>> {
        self.record(RecordedCall::GetById(id))?;
        Ok(self
            .records
            .read()
            .unwrap()
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }
}
