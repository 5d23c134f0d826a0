use axum::{
    routing::{get, post},
    Router,
    extract::{Json, State},
    response::{Html, IntoResponse},
};
use tower_http::cors::{CorsLayer, Any};
use chrono::Utc;
use std::time::Instant;

use crate::error::{Result, AppError};
use crate::api::models::{ExtractRequest, ExtractResponse, SummarizeRequest, SummarizeResponse};
use crate::api::response;
use crate::agent::summarize_with_agent;
use crate::extractor::fetch_and_clean;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/extract", post(extract_handler))
        .route("/api/summarize", post(summarize_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

async fn extract_handler(Json(req): Json<ExtractRequest>) -> impl IntoResponse {
    match process_extract_request(&req).await {
        Ok(data) => response::success(data),
        Err(err) => {
            tracing::warn!(url = %req.url, error = %err, "extraction failed");
            response::error(&err)
        }
    }
}

async fn process_extract_request(req: &ExtractRequest) -> Result<ExtractResponse> {
    if req.url.trim().is_empty() {
        return Err(AppError::InputError("please enter a valid URL".to_string()));
    }

    tracing::info!(url = %req.url, "fetching page content");
    let started = Instant::now();

    let text = fetch_and_clean(&req.url).await?;
    let chars = text.len();

    tracing::info!(url = %req.url, chars, elapsed = ?started.elapsed(), "content extracted");

    Ok(ExtractResponse {
        url: req.url.clone(),
        text,
        chars,
        fetched_at: Utc::now(),
        status: "success".to_string(),
    })
}

async fn summarize_handler(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> impl IntoResponse {
    match process_summarize_request(&state, &req).await {
        Ok(data) => response::success(data),
        Err(err) => {
            tracing::warn!(error = %err, "summarization failed");
            response::error(&err)
        }
    }
}

async fn process_summarize_request(
    state: &AppState,
    req: &SummarizeRequest,
) -> Result<SummarizeResponse> {
    let started = Instant::now();

    let summary = summarize_with_agent(
        &req.text,
        &state.config.gemini_api_key,
        &state.config.gemini_model,
    )
    .await?;

    tracing::info!(summary_chars = summary.len(), elapsed = ?started.elapsed(), "summary generated");

    Ok(SummarizeResponse {
        summary,
        summarized_at: Utc::now(),
        status: "success".to_string(),
    })
}
