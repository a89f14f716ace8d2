//! HTTP surface: the generation route, liveness, CORS preflight, and the
//! externally visible response shape.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::environment::Config;
use crate::error::SenryuError;
use crate::generator::generate_batch;
use crate::news::{fetch_recent_facts, FactRecord};
use crate::prompts::{compose_instruction, system_prompt};
use crate::request::{Mode, StyleRequest};
use crate::{LLMClient, LLMParams, TARGET_WEB_REQUEST};

/// Shared per-process state. Requests themselves share no mutable state.
pub struct AppState {
    pub config: Config,
    pub llm_client: LLMClient,
    pub http: reqwest::Client,
}

#[derive(Debug, Serialize)]
pub struct ResultPayload {
    pub result: String,
    #[serde(rename = "usedFacts", skip_serializing_if = "Option::is_none")]
    pub used_facts: Option<Vec<FactRecord>>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(status_check))
        .route(
            "/api/senryu",
            post(generate_senryu)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

/// Bind and run the API server.
pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", state.config.port);
    let app = router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

async fn status_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn preflight() -> impl IntoResponse {
    (StatusCode::OK, cors_headers())
}

/// Any method other than POST/OPTIONS on the generation route is rejected;
/// it is never treated as a generation request.
async fn method_not_allowed() -> SenryuError {
    SenryuError::MethodNotAllowed
}

async fn generate_senryu(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<impl IntoResponse, SenryuError> {
    let value: serde_json::Value = serde_json::from_str(&body)
        .map_err(|_| SenryuError::InvalidInput("Invalid JSON body".to_string()))?;
    let request = StyleRequest::from_value(&value);

    info!(
        target: TARGET_WEB_REQUEST,
        "Generating senryu: mode={} theme={} count={}",
        request.mode.as_str(),
        request.theme,
        request.count
    );

    let facts = match request.mode {
        Mode::Current => fetch_recent_facts(&state.http, &state.config, &request).await,
        Mode::Normal => Vec::new(),
    };

    let today = Utc::now().format("%Y-%m-%d").to_string();
    let instruction = compose_instruction(&request, &facts, &today);

    let params = LLMParams {
        llm_client: state.llm_client.clone(),
        model: state.config.model.clone(),
        temperature: state.config.base_temperature,
    };

    let mut rng = StdRng::from_os_rng();
    let result = generate_batch(
        &params,
        &system_prompt(),
        &instruction,
        request.count,
        state.config.candidates_per_call,
        &mut rng,
    )
    .await?;

    let used_facts = citation_facts(&request, facts);

    Ok((
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        Json(ResultPayload { result, used_facts }),
    ))
}

/// Citations are returned only for current-mode requests that asked for them
/// and actually had grounding facts.
fn citation_facts(request: &StyleRequest, facts: Vec<FactRecord>) -> Option<Vec<FactRecord>> {
    (request.mode == Mode::Current && request.include_citations && !facts.is_empty())
        .then_some(facts)
}

fn cors_headers() -> [(header::HeaderName, &'static str); 3] {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
    ]
}
