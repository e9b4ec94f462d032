use axum::{
    routing::post,
    Router,
    extract::{Json, State},
    response::IntoResponse,
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::ad::AdRequest;
use crate::api::models::{GenerateRequest, GenerateResponse};
use crate::api::response;
use crate::error::{AppError, Result};
use crate::llm::{GenerationClient, OpenAiClient};
use crate::pipeline::DEFAULT_SESSION;
use crate::AppState;

/// Upper bound on a whole submission, scrape and generation included.
const HANDLER_TIMEOUT: Duration = Duration::from_secs(90);

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn generate_handler(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> impl IntoResponse {
    let start_time = std::time::Instant::now();

    let result = tokio::time::timeout(HANDLER_TIMEOUT, process_generate_request(&state, &req))
        .await
        .unwrap_or(Err(AppError::Timeout));

    info!(elapsed = ?start_time.elapsed(), ok = result.is_ok(), "generate request finished");

    match result {
        Ok(data) => {
            let warnings = data.violations.len();
            response::success(data, warnings)
        }
        Err(err) => {
            warn!(error = %err, "generate request failed");
            response::error(err.status_code(), err.to_string())
        }
    }
}

async fn process_generate_request(state: &AppState, req: &GenerateRequest) -> Result<GenerateResponse> {
    let request = AdRequest::from_form(
        &req.keywords,
        req.landing_page.as_deref(),
        &req.sentiment,
        &req.usps,
        &req.ctas,
        req.temperature,
    )?;

    info!(
        landing_page = request.landing_page().map(|u| u.as_str()).unwrap_or("-"),
        sentiment = %request.sentiment(),
        "processing generate request"
    );

    let generator = select_generator(state, req.api_key.as_deref())?;
    let session = req
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_SESSION);
    let outcome = state.pipeline.run(&request, generator.as_ref(), session).await?;

    Ok(GenerateResponse::new(outcome, request.sentiment().label()))
}

// A key typed into the form takes precedence over the configured one
fn select_generator(state: &AppState, api_key: Option<&str>) -> Result<Arc<dyn GenerationClient>> {
    match api_key.map(str::trim).filter(|key| !key.is_empty()) {
        Some(key) => {
            let client = OpenAiClient::from_config(&state.config)?.with_api_key(key.to_string());
            Ok(Arc::new(client))
        }
        None => Ok(state.generator.clone()),
    }
}
