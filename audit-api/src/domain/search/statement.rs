//! Builds the count and data statements for a search strategy.
//!
//! Identifiers are only ever taken from [`AuditColumn`] and [`SortColumn`];
//! every value goes through `push_bind`.

use sqlx::{Postgres, QueryBuilder};

use super::strategy::SearchStrategy;
use super::types::{AuditColumn, DateRange, Pagination, QueryCondition, SortOrder};

const SELECT_COLUMNS: &str = "id, timestamp, user_id, user_name, action, resource_type, \
     resource_id, host(ip_address) AS ip_address, status, details, metadata, created_at";

/// Count and data statements sharing one filter.
pub struct SearchStatements {
    pub count: QueryBuilder<'static, Postgres>,
    pub data: QueryBuilder<'static, Postgres>,
}

/// Builds statements against the `audit_logs` table.
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    text_search_config: String,
}

impl StatementBuilder {
    /// `text_search_config` is the regconfig passed to `to_tsquery`, e.g. `english`.
    pub fn new(text_search_config: impl Into<String>) -> Self {
        Self {
            text_search_config: text_search_config.into(),
        }
    }

    /// Returns `None` for [`SearchStrategy::Empty`], which needs no query.
    pub fn build(
        &self,
        strategy: &SearchStrategy,
        pagination: Pagination,
        date_range: DateRange,
        sort: &SortOrder,
    ) -> Option<SearchStatements> {
        if matches!(strategy, SearchStrategy::Empty) {
            return None;
        }

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM audit_logs");
        self.push_filter(&mut count, strategy, date_range);

        let mut data = QueryBuilder::new("SELECT ");
        data.push(SELECT_COLUMNS);
        match strategy {
            SearchStrategy::FullText(expression) => {
                data.push(", ts_rank(search_vector, ");
                self.push_ts_query(&mut data, expression);
                data.push(") AS rank");
            }
            _ => {
                data.push(", NULL::real AS rank");
            }
        }
        data.push(" FROM audit_logs");
        self.push_filter(&mut data, strategy, date_range);
        push_order_by(&mut data, strategy, sort);
        data.push(" LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        Some(SearchStatements { count, data })
    }

    fn push_filter(
        &self,
        qb: &mut QueryBuilder<'static, Postgres>,
        strategy: &SearchStrategy,
        date_range: DateRange,
    ) {
        let has_predicate = match strategy {
            SearchStrategy::FullText(expression) => {
                qb.push(" WHERE search_vector @@ ");
                self.push_ts_query(qb, expression);
                true
            }
            SearchStrategy::Columns(conditions) => {
                qb.push(" WHERE (");
                push_conditions(qb, conditions);
                qb.push(")");
                true
            }
            SearchStrategy::Unfiltered | SearchStrategy::Empty => false,
        };

        push_date_range(qb, date_range, has_predicate);
    }

    fn push_ts_query(&self, qb: &mut QueryBuilder<'static, Postgres>, expression: &str) {
        qb.push("to_tsquery(")
            .push_bind(self.text_search_config.clone())
            .push("::regconfig, ")
            .push_bind(expression.to_string())
            .push(")");
    }
}

impl Default for StatementBuilder {
    fn default() -> Self {
        Self::new("english")
    }
}

fn push_conditions(qb: &mut QueryBuilder<'static, Postgres>, conditions: &[QueryCondition]) {
    for (i, condition) in conditions.iter().enumerate() {
        // The first condition's operator has nothing to join.
        if i > 0 {
            qb.push(" ").push(condition.join.as_str()).push(" ");
        }
        push_condition(qb, condition);
    }
}

fn push_condition(qb: &mut QueryBuilder<'static, Postgres>, condition: &QueryCondition) {
    let pattern = format!("%{}%", condition.search_term);

    match condition.column {
        // Exact id lookup, falling back to partial match on its text form.
        Some(AuditColumn::Id) => {
            qb.push("(id::text = ")
                .push_bind(condition.search_term.clone())
                .push(" OR id::text LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        // Timestamps and jsonb metadata are matched on their text rendering,
        // like every other column.
        Some(column) => {
            qb.push(column.as_str())
                .push("::text ILIKE ")
                .push_bind(pattern);
        }
        None => {
            qb.push("(");
            for (i, column) in AuditColumn::FREE_TEXT.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(column.as_str())
                    .push("::text ILIKE ")
                    .push_bind(pattern.clone());
            }
            qb.push(")");
        }
    }
}

fn push_date_range(
    qb: &mut QueryBuilder<'static, Postgres>,
    date_range: DateRange,
    has_predicate: bool,
) {
    let keyword = if has_predicate { " AND " } else { " WHERE " };
    match (date_range.from, date_range.to) {
        (Some(from), Some(to)) => {
            qb.push(keyword)
                .push("timestamp BETWEEN ")
                .push_bind(from)
                .push(" AND ")
                .push_bind(to);
        }
        (Some(from), None) => {
            qb.push(keyword).push("timestamp >= ").push_bind(from);
        }
        (None, Some(to)) => {
            qb.push(keyword).push("timestamp <= ").push_bind(to);
        }
        (None, None) => {}
    }
}

fn push_order_by(
    qb: &mut QueryBuilder<'static, Postgres>,
    strategy: &SearchStrategy,
    sort: &SortOrder,
) {
    qb.push(" ORDER BY ");
    match strategy {
        // Unfiltered listings ignore the requested sort.
        SearchStrategy::Unfiltered => {
            qb.push("timestamp DESC");
        }
        SearchStrategy::FullText(_) if sort.by_relevance() => {
            qb.push("rank DESC");
        }
        _ => {
            qb.push(sort.column().as_str()).push(" ").push(sort.direction());
        }
    }
}
