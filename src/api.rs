use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use chrono::Utc;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::{
    clients::tenants::TenantDirectory,
    config::Config,
    models::{
        job::{EnqueueRequest, JobStatus, NotificationJob},
        response::{ApiResponse, PaginationMeta},
        tenant::StoreSettings,
    },
    queue::{JobQueue, cutoff_hours},
};

pub struct AppState {
    queue: Arc<JobQueue>,
    tenants: Arc<TenantDirectory>,
}

pub async fn run_api_server(
    config: Config,
    queue: Arc<JobQueue>,
    tenants: Arc<TenantDirectory>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState { queue, tenants });

    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Admin API server started");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/jobs", post(enqueue_job).get(list_jobs))
        .route("/api/v1/jobs/stats", get(job_stats))
        .route("/api/v1/jobs/cleanup", post(cleanup_jobs))
        .route("/api/v1/jobs/{id}", get(get_job))
        .route("/api/v1/jobs/{id}/retry", post(retry_job))
        .route("/api/v1/jobs/{id}/cancel", post(cancel_job))
        .route("/api/v1/jobs/{id}/prioritize", post(prioritize_job))
        .route(
            "/api/v1/stores/{store_id}/settings",
            put(upsert_store_settings),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = state.queue.stats(None).await;

    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "queue": stats,
    }))
}

async fn enqueue_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EnqueueRequest>,
) -> impl IntoResponse {
    match state.queue.enqueue(request).await {
        Ok(id) => (
            StatusCode::ACCEPTED,
            Json(ApiResponse::success(
                id,
                "Notification job enqueued".to_string(),
            )),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                e.to_string(),
                "Invalid enqueue request".to_string(),
            )),
        ),
    }
}

async fn job_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let store = caller_store(&headers);
    let stats = state.queue.stats(store.as_deref()).await;

    Json(ApiResponse::success(stats, "Queue statistics".to_string()))
}

#[derive(Debug, Deserialize)]
struct ListJobsParams {
    status: String,

    #[serde(default)]
    limit: Option<u64>,

    #[serde(default)]
    page: Option<u64>,
}

async fn list_jobs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ListJobsParams>,
) -> impl IntoResponse {
    let Some(status) = JobStatus::parse(&params.status) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                "unknown_status".to_string(),
                format!("Unknown job status '{}'", params.status),
            )),
        );
    };

    let store = caller_store(&headers);
    let jobs = state.queue.jobs_by_status(status, store.as_deref()).await;

    let limit = params.limit.unwrap_or(50).max(1);
    let page = params.page.unwrap_or(1).max(1);
    let total = jobs.len() as u64;
    let offset = ((page - 1) * limit) as usize;

    let page_jobs: Vec<NotificationJob> = jobs
        .into_iter()
        .skip(offset)
        .take(limit as usize)
        .collect();

    (
        StatusCode::OK,
        Json(
            ApiResponse::success(page_jobs, format!("{} jobs with status {}", total, status))
                .with_meta(PaginationMeta::new(total, limit, page)),
        ),
    )
}

async fn get_job(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = caller_store(&headers);
    let Some(job_id) = parse_job_id(&id) else {
        return not_found();
    };

    match state.queue.job(job_id, store.as_deref()).await {
        Some(job) => (
            StatusCode::OK,
            Json(ApiResponse::success(job, "Job found".to_string())),
        ),
        None => not_found(),
    }
}

async fn retry_job(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let Some(store) = caller_store(&headers) else {
        return missing_store();
    };
    let Some(job_id) = parse_job_id(&id) else {
        return not_found();
    };

    if state.queue.retry(job_id, Some(&store)).await {
        (
            StatusCode::OK,
            Json(ApiResponse::success(
                job_id,
                "Job scheduled for retry".to_string(),
            )),
        )
    } else {
        not_found()
    }
}

async fn cancel_job(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let Some(store) = caller_store(&headers) else {
        return missing_store();
    };
    let Some(job_id) = parse_job_id(&id) else {
        return not_found();
    };

    if state.queue.cancel(job_id, Some(&store)).await {
        (
            StatusCode::OK,
            Json(ApiResponse::success(job_id, "Job cancelled".to_string())),
        )
    } else {
        not_found()
    }
}

async fn prioritize_job(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let Some(store) = caller_store(&headers) else {
        return missing_store();
    };
    let Some(job_id) = parse_job_id(&id) else {
        return not_found();
    };

    if state.queue.prioritize(job_id, Some(&store)).await {
        (
            StatusCode::OK,
            Json(ApiResponse::success(job_id, "Job prioritized".to_string())),
        )
    } else {
        not_found()
    }
}

#[derive(Debug, Deserialize)]
struct CleanupRequest {
    older_than_hours: i64,
}

async fn cleanup_jobs(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CleanupRequest>,
) -> impl IntoResponse {
    let removed = state
        .queue
        .cleanup(cutoff_hours(request.older_than_hours))
        .await;

    Json(ApiResponse::success(
        removed,
        format!("{} terminal jobs removed", removed),
    ))
}

async fn upsert_store_settings(
    State(state): State<Arc<AppState>>,
    Path(store_id): Path<String>,
    Json(settings): Json<StoreSettings>,
) -> impl IntoResponse {
    state.tenants.upsert(&store_id, settings).await;

    Json(ApiResponse::success(
        store_id,
        "Store settings updated".to_string(),
    ))
}

fn caller_store(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-store-id")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
        .filter(|value| !value.is_empty())
}

fn parse_job_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// Scope mismatches render exactly like unknown ids: a caller can never
/// learn that a job exists in another store.
fn not_found<T>() -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error(
            "not_found".to_string(),
            "Job not found".to_string(),
        )),
    )
}

fn missing_store<T>() -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(
            "missing_store".to_string(),
            "x-store-id header is required".to_string(),
        )),
    )
}
