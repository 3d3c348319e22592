use std::sync::{Arc, RwLock};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ProjectId, RecommendationId, RecommendationStatus};
use super::policy::{Policy, PolicyRegistry};
use super::repository::{AuditLog, RecommendationRepository, ShortlistQuery};
use super::service::{
    AllocationRequest, AllocationService, AllocationServiceError, ReviewRequest,
};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;
const MAX_OFFSET: i64 = 10_000;

/// Shared state behind the engine endpoints: the service plus the mutable
/// policy registry administrators edit between runs.
pub struct EngineState<R, A> {
    pub service: AllocationService<R, A>,
    pub policies: RwLock<PolicyRegistry>,
}

/// Router builder exposing the allocation engine over HTTP.
pub fn engine_router<R, A>(state: Arc<EngineState<R, A>>) -> Router
where
    R: RecommendationRepository + 'static,
    A: AuditLog + 'static,
{
    Router::new()
        .route(
            "/api/v1/projects/:project_id/recommendations",
            post(recommend_handler::<R, A>),
        )
        .route("/api/v1/recommendations", get(shortlist_handler::<R, A>))
        .route(
            "/api/v1/recommendations/:recommendation_id/review",
            post(review_handler::<R, A>),
        )
        .route(
            "/api/v1/policies",
            get(list_policies_handler::<R, A>).post(create_policy_handler::<R, A>),
        )
        .with_state(state)
}

fn error_response(error: AllocationServiceError) -> Response {
    let status = match error.kind() {
        "not_found" => StatusCode::NOT_FOUND,
        "validation" | "invalid_action" => StatusCode::UNPROCESSABLE_ENTITY,
        "invalid_state" => StatusCode::CONFLICT,
        "upstream_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": {
            "kind": error.kind(),
            "detail": error.to_string(),
        }
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn recommend_handler<R, A>(
    State(state): State<Arc<EngineState<R, A>>>,
    Path(project_id): Path<u32>,
    axum::Json(request): axum::Json<AllocationRequest>,
) -> Response
where
    R: RecommendationRepository + 'static,
    A: AuditLog + 'static,
{
    let registry = state
        .policies
        .read()
        .expect("policy registry lock poisoned")
        .snapshot();

    match state
        .service
        .recommend(ProjectId(project_id), &registry, request)
    {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|r| r.shortlist_view()).collect();
            let payload = json!({
                "project_id": project_id,
                "status": "completed",
                "recommendations": views,
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShortlistParams {
    project_id: u32,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    offset: Option<i64>,
}

fn parse_shortlist_params(params: ShortlistParams) -> Result<ShortlistQuery, AllocationServiceError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AllocationServiceError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let offset = params.offset.unwrap_or(0);
    if !(0..=MAX_OFFSET).contains(&offset) {
        return Err(AllocationServiceError::Validation(format!(
            "offset must be between 0 and {MAX_OFFSET}"
        )));
    }

    let status = match params.status.as_deref() {
        None => None,
        Some(raw) => Some(RecommendationStatus::parse(raw).ok_or_else(|| {
            AllocationServiceError::Validation(format!("unknown status filter '{raw}'"))
        })?),
    };

    Ok(ShortlistQuery {
        project_id: ProjectId(params.project_id),
        status,
        limit: limit as usize,
        offset: offset as usize,
    })
}

pub(crate) async fn shortlist_handler<R, A>(
    State(state): State<Arc<EngineState<R, A>>>,
    Query(params): Query<ShortlistParams>,
) -> Response
where
    R: RecommendationRepository + 'static,
    A: AuditLog + 'static,
{
    let query = match parse_shortlist_params(params) {
        Ok(query) => query,
        Err(error) => return error_response(error),
    };

    match state.service.shortlist(&query) {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|r| r.shortlist_view()).collect();
            let payload = json!({
                "project_id": query.project_id.0,
                "count": views.len(),
                "recommendations": views,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<R, A>(
    State(state): State<Arc<EngineState<R, A>>>,
    Path(recommendation_id): Path<String>,
    axum::Json(request): axum::Json<ReviewRequest>,
) -> Response
where
    R: RecommendationRepository + 'static,
    A: AuditLog + 'static,
{
    let id = RecommendationId(recommendation_id);
    match state.service.review(&id, request) {
        Ok(record) => (StatusCode::OK, axum::Json(record.shortlist_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_policies_handler<R, A>(
    State(state): State<Arc<EngineState<R, A>>>,
) -> Response
where
    R: RecommendationRepository + 'static,
    A: AuditLog + 'static,
{
    let policies = state
        .policies
        .read()
        .expect("policy registry lock poisoned")
        .active_policies();
    (StatusCode::OK, axum::Json(json!({ "policies": policies }))).into_response()
}

pub(crate) async fn create_policy_handler<R, A>(
    State(state): State<Arc<EngineState<R, A>>>,
    axum::Json(policy): axum::Json<Policy>,
) -> Response
where
    R: RecommendationRepository + 'static,
    A: AuditLog + 'static,
{
    let mut registry = state
        .policies
        .write()
        .expect("policy registry lock poisoned");
    match registry.register(policy) {
        Ok(()) => (
            StatusCode::CREATED,
            axum::Json(json!({ "status": "created" })),
        )
            .into_response(),
        Err(error) => error_response(AllocationServiceError::Policy(error)),
    }
}
