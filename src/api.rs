use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::config::AnalysisConfig;
use crate::engine;
use crate::session::{Answer, Session};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub analysis: Arc<AnalysisConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/followup/{ticker}", post(followup))
        .route("/analyze/{ticker}", get(analyze))
        .route("/{ticker}", get(ticker_demo))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct FollowupReq {
    query: String,
}

/// `GET /{ticker}` — ingest the ticker and answer the canned demo questions.
async fn ticker_demo(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let answers = state.session.demo(&ticker).await?;
    Ok(Json(answers))
}

/// `POST /followup/{ticker}` — ingest-if-needed, then answer one question
/// scoped to the ticker.
async fn followup(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Json(body): Json<FollowupReq>,
) -> Result<Json<Answer>, ApiError> {
    state.session.load(&ticker).await?;
    let answer = state.session.ask(&body.query, Some(&ticker))?;
    Ok(Json(answer))
}

/// `GET /analyze/{ticker}` — trend + document sentiment over the pre-supplied
/// files, rendered as `key: value` lines.
async fn analyze(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<String, ApiError> {
    let spec = state.analysis.ticker(&ticker).ok_or_else(|| {
        ApiError::not_found(format!("no analysis configuration for ticker {ticker}"))
    })?;
    let report = engine::run_analysis(spec)?;
    Ok(report.to_string())
}

/// Maps internal errors onto HTTP responses.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(status = %self.status, message = %self.message, "request failed");
        (self.status, self.message).into_response()
    }
}
