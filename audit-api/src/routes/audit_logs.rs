use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    domain::search::{
        AuditColumn, AuditLogRecord, DateRange, Pagination, SearchPage, SearchParams, SortOrder,
    },
    routes::ApiError,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_audit_logs))
        .route("/search", post(search_audit_logs))
        .route("/_health", get(health))
        .route("/_columns", get(columns))
        .route("/:id", get(get_audit_log))
}

fn default_from() -> i64 {
    1
}

fn default_size() -> i64 {
    10
}

fn default_sort_descending() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// `login AND failed`, `login OR logout`, `user_name:John AND action:LOGIN`, ...
    #[serde(default)]
    query: String,
    /// 1-based page number.
    #[serde(default = "default_from")]
    from: i64,
    #[serde(default = "default_size")]
    size: i64,
    sort: Option<String>,
    #[serde(default = "default_sort_descending")]
    sort_descending: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    from_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    to_date: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_from")]
    from: i64,
    #[serde(default = "default_size")]
    size: i64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    from_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    to_date: Option<OffsetDateTime>,
}

/// Paginated search envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub total: i64,
    pub from: i64,
    pub size: i64,
    pub hits: Vec<AuditLogRecord>,
    /// Milliseconds spent in the store.
    pub took: u64,
    pub has_more: bool,
    pub total_pages: i64,
}

impl SearchResponse {
    fn new(page: SearchPage, pagination: Pagination, took: u64) -> Self {
        let from = pagination.page();
        let size = pagination.page_size();
        let seen = pagination.offset().saturating_add(page.hits.len() as i64);

        Self {
            has_more: seen < page.total,
            total_pages: (page.total + size - 1) / size,
            total: page.total,
            from,
            size,
            hits: page.hits,
            took,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[instrument(name = "POST /search", skip(app_state))]
async fn search_audit_logs(
    State(app_state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let pagination = Pagination::new(request.from, request.size)?;
    let params = SearchParams {
        query: request.query,
        pagination,
        date_range: DateRange::new(request.from_date, request.to_date),
        sort: SortOrder::new(request.sort, request.sort_descending),
    };

    let started = Instant::now();
    let page = app_state.audit_logs.search(&params).await?;
    let took = elapsed_ms(started);

    tracing::info!(
        query = %params.query,
        total = page.total,
        from = pagination.page(),
        size = pagination.page_size(),
        took,
        "search executed"
    );

    Ok(Json(SearchResponse::new(page, pagination, took)))
}

#[instrument(name = "GET /", skip(app_state))]
async fn list_audit_logs(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let pagination = Pagination::new(query.from, query.size)?;
    let date_range = DateRange::new(query.from_date, query.to_date);

    let started = Instant::now();
    let page = app_state.audit_logs.list(pagination, date_range).await?;

    Ok(Json(SearchResponse::new(page, pagination, elapsed_ms(started))))
}

#[instrument(name = "GET /:id", skip(app_state))]
async fn get_audit_log(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AuditLogRecord>, ApiError> {
    app_state
        .audit_logs
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Audit log not found").with_id(id))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: OffsetDateTime::now_utc(),
    })
}

async fn columns() -> Json<Vec<&'static str>> {
    Json(AuditColumn::sorted_names())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use time::macros::datetime;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::search::repository::{MockAuditLogRepository, RecordedCall};

    fn make_record(id: i64, action: &str) -> AuditLogRecord {
        AuditLogRecord {
            id,
            timestamp: datetime!(2024-03-01 12:00 UTC),
            user_id: "user001".to_string(),
            user_name: Some("John Doe".to_string()),
            action: action.to_string(),
            resource_type: "session".to_string(),
            resource_id: None,
            ip_address: Some("10.0.0.1".to_string()),
            status: "SUCCESS".to_string(),
            details: None,
            metadata: Some(json!({ "browser": "firefox" })),
            created_at: datetime!(2024-03-01 12:00 UTC),
            rank: None,
        }
    }

    fn app(repo: &MockAuditLogRepository) -> Router {
        Router::new()
            .nest("/api/auditlogs", router())
            .with_state(AppState::new(repo.clone()))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_search(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/auditlogs/search")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn search_returns_envelope() {
        let repo = MockAuditLogRepository::new().with_records(vec![make_record(1, "LOGIN")]);

        let (status, body) = send(app(&repo), post_search(json!({ "query": "login" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["from"], 1);
        assert_eq!(body["size"], 10);
        assert_eq!(body["hasMore"], false);
        assert_eq!(body["totalPages"], 1);
        assert_eq!(body["hits"][0]["action"], "LOGIN");
        assert_eq!(body["hits"][0]["userName"], "John Doe");
        assert_eq!(body["hits"][0]["timestamp"], "2024-03-01T12:00:00Z");
        assert!(body["took"].is_u64());
    }

    #[tokio::test]
    async fn empty_query_still_searches() {
        let repo = MockAuditLogRepository::new();

        let (status, body) = send(app(&repo), post_search(json!({ "query": "" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
        assert_eq!(repo.last_search().unwrap().query, "");
    }

    #[tokio::test]
    async fn search_passes_dates_unchanged() {
        let repo = MockAuditLogRepository::new();
        let request = post_search(json!({
            "query": "login",
            "fromDate": "2024-01-01T00:00:00Z",
            "toDate": "2024-01-08T06:30:00+02:00",
        }));

        let (status, _) = send(app(&repo), request).await;

        assert_eq!(status, StatusCode::OK);
        let params = repo.last_search().unwrap();
        assert_eq!(params.date_range.from, Some(datetime!(2024-01-01 0:00 UTC)));
        assert_eq!(params.date_range.to, Some(datetime!(2024-01-08 6:30 +2)));
    }

    #[tokio::test]
    async fn search_passes_sort_request() {
        let repo = MockAuditLogRepository::new();
        let request = post_search(json!({
            "query": "login",
            "sort": "timestamp",
            "sortDescending": false,
        }));

        send(app(&repo), request).await;

        let params = repo.last_search().unwrap();
        assert_eq!(params.sort, SortOrder::new(Some("timestamp".into()), false));
        assert_eq!(params.sort.direction(), "ASC");
    }

    #[tokio::test]
    async fn search_sort_defaults_to_descending() {
        let repo = MockAuditLogRepository::new();

        send(app(&repo), post_search(json!({ "query": "login" }))).await;

        assert!(repo.last_search().unwrap().sort.descending);
    }

    #[tokio::test]
    async fn search_second_page_offsets_by_page_size() {
        let records = (1..=25).map(|id| make_record(id, "LOGIN")).collect();
        let repo = MockAuditLogRepository::new().with_records(records);

        let (_, body) = send(
            app(&repo),
            post_search(json!({ "query": "login", "from": 2, "size": 10 })),
        )
        .await;

        let params = repo.last_search().unwrap();
        assert_eq!(params.pagination.offset(), 10);
        assert_eq!(params.pagination.limit(), 10);
        assert_eq!(body["hits"][0]["id"], 11);
        assert_eq!(body["hasMore"], true);
        assert_eq!(body["totalPages"], 3);
    }

    #[tokio::test]
    async fn search_rejects_invalid_pagination_before_store() {
        for body in [
            json!({ "query": "login", "from": 0 }),
            json!({ "query": "login", "size": 2000 }),
            json!({ "query": "login", "size": 0 }),
            json!({ "query": "login", "from": i64::MAX, "size": 10 }),
        ] {
            let repo = MockAuditLogRepository::new();

            let (status, response) = send(app(&repo), post_search(body)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(response["error"].as_str().unwrap().starts_with("Parameter"));
            assert!(repo.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn store_failure_is_generic_500() {
        let repo = MockAuditLogRepository::new().failing();

        let (status, body) = send(app(&repo), post_search(json!({ "query": "login" }))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An error occurred while searching");
    }

    #[tokio::test]
    async fn get_by_id_found() {
        let repo = MockAuditLogRepository::new().with_records(vec![make_record(1, "LOGIN")]);

        let (status, body) = send(app(&repo), get("/api/auditlogs/1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);
        assert_eq!(body["metadata"]["browser"], "firefox");
        assert!(body.get("rank").is_none());
    }

    #[tokio::test]
    async fn get_by_id_not_found() {
        let repo = MockAuditLogRepository::new();

        let (status, body) = send(app(&repo), get("/api/auditlogs/999")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Audit log not found");
        assert_eq!(body["id"], 999);
        assert_eq!(repo.calls(), vec![RecordedCall::GetById(999)]);
    }

    #[tokio::test]
    async fn list_uses_defaults() {
        let repo = MockAuditLogRepository::new()
            .with_records(vec![make_record(1, "LOGIN"), make_record(2, "LOGOUT")]);

        let (status, body) = send(app(&repo), get("/api/auditlogs")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["hits"].as_array().unwrap().len(), 2);
        assert_eq!(
            repo.calls(),
            vec![RecordedCall::List(Pagination::default(), DateRange::default())]
        );
    }

    #[tokio::test]
    async fn list_passes_date_filters() {
        let repo = MockAuditLogRepository::new();

        let (status, _) = send(
            app(&repo),
            get("/api/auditlogs?from=3&size=5&fromDate=2024-02-01T00:00:00Z"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            repo.calls(),
            vec![RecordedCall::List(
                Pagination::new(3, 5).unwrap(),
                DateRange::new(Some(datetime!(2024-02-01 0:00 UTC)), None),
            )]
        );
    }

    #[tokio::test]
    async fn list_rejects_invalid_pagination() {
        for uri in [
            "/api/auditlogs?from=0",
            "/api/auditlogs?size=2000",
            "/api/auditlogs?from=9223372036854775807&size=10",
        ] {
            let repo = MockAuditLogRepository::new();

            let (status, _) = send(app(&repo), get(uri)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(repo.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let repo = MockAuditLogRepository::new();

        let (status, body) = send(app(&repo), get("/api/auditlogs/_health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn columns_lists_allow_list() {
        let repo = MockAuditLogRepository::new();

        let (status, body) = send(app(&repo), get("/api/auditlogs/_columns")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 12);
        assert_eq!(body[0], "action");
    }
}
