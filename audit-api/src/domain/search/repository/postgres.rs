//! PostgreSQL repository backed by the `audit_logs` table.

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::instrument;

use crate::domain::search::statement::{SearchStatements, StatementBuilder};
use crate::domain::search::strategy::SearchStrategy;
use crate::domain::search::traits::{AuditLogRepository, Result};
use crate::domain::search::types::{
    AuditLogRecord, DateRange, Pagination, SearchPage, SearchParams, SortOrder,
};

/// PostgreSQL-backed audit log repository.
///
/// Full-text searches rely on the `search_vector` tsvector column, which the
/// database keeps up to date (see `migrations/`).
#[derive(Clone)]
pub struct PgAuditLogRepository {
    pool: PgPool,
    statements: StatementBuilder,
}

impl PgAuditLogRepository {
    pub fn new(pool: PgPool, statements: StatementBuilder) -> Self {
        Self { pool, statements }
    }

    /// Run the count, then the page query. Either failing fails the search.
    async fn execute(&self, mut statements: SearchStatements) -> Result<SearchPage> {
        let total: i64 = statements
            .count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let rows: Vec<AuditLogRow> = statements
            .data
            .build_query_as::<AuditLogRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(SearchPage {
            hits: rows.into_iter().map(AuditLogRecord::from).collect(),
            total,
        })
    }

    async fn run(
        &self,
        strategy: &SearchStrategy,
        pagination: Pagination,
        date_range: DateRange,
        sort: &SortOrder,
    ) -> Result<SearchPage> {
        match self.statements.build(strategy, pagination, date_range, sort) {
            Some(statements) => self.execute(statements).await,
            None => Ok(SearchPage::empty()),
        }
    }
}

#[async_trait]
impl AuditLogRepository for PgAuditLogRepository {
    #[instrument(name = "audit_logs.search", skip_all, fields(query = %params.query))]
    async fn search(&self, params: &SearchParams) -> Result<SearchPage> {
        let strategy = SearchStrategy::select(&params.query);
        tracing::debug!(strategy = strategy.name(), "selected search strategy");

        self.run(&strategy, params.pagination, params.date_range, &params.sort)
            .await
    }

    #[instrument(name = "audit_logs.list", skip(self))]
    async fn list(&self, pagination: Pagination, date_range: DateRange) -> Result<SearchPage> {
        self.run(
            &SearchStrategy::Unfiltered,
            pagination,
            date_range,
            &SortOrder::default(),
        )
        .await
    }

    #[instrument(name = "audit_logs.get_by_id", skip(self))]
    async fn get_by_id(&self, id: i64) -> Result<Option<AuditLogRecord>> {
        let row = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT
                id,
                timestamp,
                user_id,
                user_name,
                action,
                resource_type,
                resource_id,
                host(ip_address) AS ip_address,
                status,
                details,
                metadata,
                created_at,
                NULL::real AS rank
            FROM audit_logs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuditLogRecord::from))
    }
}

#[derive(sqlx::FromRow)]
struct AuditLogRow {
    id: i64,
    timestamp: OffsetDateTime,
    user_id: String,
    user_name: Option<String>,
    action: String,
    resource_type: String,
    resource_id: Option<String>,
    ip_address: Option<String>,
    status: String,
    details: Option<String>,
    metadata: Option<serde_json::Value>,
    created_at: OffsetDateTime,
    rank: Option<f32>,
}

impl From<AuditLogRow> for AuditLogRecord {
    fn from(row: AuditLogRow) -> Self {
        Self {
            id: row.id,
            timestamp: row.timestamp,
            user_id: row.user_id,
            user_name: row.user_name,
            action: row.action,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            ip_address: row.ip_address,
            status: row.status,
            details: row.details,
            metadata: row.metadata,
            created_at: row.created_at,
            rank: row.rank,
        }
    }
}
