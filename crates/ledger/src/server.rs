use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use interface::{BranchConfig, CostSubmission, ExchangeRateTable};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::aggregate::{Dashboard, HistoryMonth};
use crate::record::RecordError;
use crate::service::{DashboardQuery, ReportService, current_year};

type SharedService = Arc<ReportService>;

/// API 에러 → HTTP 응답
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) | ApiError::Record(RecordError::InvalidRecord(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Record(e) => {
                error!("Store error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct DashboardParams {
    year: Option<i32>,
    month: Option<u32>,
    branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YearParams {
    year: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct MonthParams {
    month: Option<u32>,
}

fn check_month(month: Option<u32>) -> Result<(), ApiError> {
    match month {
        Some(m) if !(1..=12).contains(&m) => {
            Err(ApiError::BadRequest(format!("month must be 1..=12, got {}", m)))
        }
        _ => Ok(()),
    }
}

pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/dashboard", get(dashboard))
        .route("/api/branches", get(list_branches).post(save_branch))
        .route("/api/branches/:name/history", get(history))
        .route("/api/submissions", axum::routing::post(submit))
        .route("/api/rates", axum::routing::post(upload_rates))
        .route("/api/rates/:year", get(get_rates))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// API 서버 시작
pub async fn start_server(port: u16, service: SharedService) -> eyre::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("API server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(service)).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn dashboard(
    State(service): State<SharedService>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<Dashboard>, ApiError> {
    check_month(params.month)?;
    let now = Utc::now();
    let query = DashboardQuery {
        year: params.year.unwrap_or_else(|| current_year(now)),
        month: params.month,
        branch: params.branch.filter(|b| !b.is_empty()),
    };
    Ok(Json(service.dashboard(&query, now).await?))
}

async fn history(
    State(service): State<SharedService>,
    Path(name): Path<String>,
    Query(params): Query<YearParams>,
) -> Result<Json<Vec<HistoryMonth>>, ApiError> {
    let year = params.year.unwrap_or_else(|| current_year(Utc::now()));
    Ok(Json(service.history(&name, year).await?))
}

async fn list_branches(
    State(service): State<SharedService>,
) -> Result<Json<Vec<BranchConfig>>, ApiError> {
    Ok(Json(service.branches().await?))
}

async fn save_branch(
    State(service): State<SharedService>,
    Json(branch): Json<BranchConfig>,
) -> Result<Json<BranchConfig>, ApiError> {
    service.save_branch(&branch).await?;
    Ok(Json(branch))
}

async fn submit(
    State(service): State<SharedService>,
    Json(submission): Json<CostSubmission>,
) -> Result<(StatusCode, Json<CostSubmission>), ApiError> {
    let saved = service.submit(submission, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn get_rates(
    State(service): State<SharedService>,
    Path(year): Path<i32>,
    Query(params): Query<MonthParams>,
) -> Result<Json<ExchangeRateTable>, ApiError> {
    check_month(params.month)?;
    service
        .rates(year, params.month)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no exchange rates for {}", year)))
}

async fn upload_rates(
    State(service): State<SharedService>,
    Json(table): Json<ExchangeRateTable>,
) -> Result<(StatusCode, Json<ExchangeRateTable>), ApiError> {
    check_month(table.month)?;
    let saved = service.upload_rates(table, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}
