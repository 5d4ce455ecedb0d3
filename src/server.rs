use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::adapters::ToolInput;
use crate::config_store::DEFAULT_MODEL;
use crate::conversion::{convert_messages, to_responses_request};
use crate::error::AdapterError;
use crate::models::chat::ChatMessage;
use crate::models::responses::{Reasoning, ReasoningEffort};
use crate::util::{cors_layer_from_env, error_response, AppState};

/// Message shown to end users when the upstream model call fails.
const UPSTREAM_UNAVAILABLE: &str =
    "The AI service could not complete this request. Please try again shortly.";

/// Body of `POST /convert`.
#[derive(Debug, Deserialize)]
pub struct ConvertBody {
    #[serde(default)]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub json_mode: bool,
    #[serde(default)]
    pub reasoning_effort: Option<ReasoningEffort>,
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(default)]
    pub store: Option<bool>,
}

/// Build the Axum router with `/status`, `/convert` and `/tools/:name`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/convert", post(convert))
        .route("/tools/:name", post(run_tool))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer_from_env())
}

/// Service status endpoint listing routes and registered tools.
async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "lexbridge",
        "version": env!("CARGO_PKG_VERSION"),
        "routes": ["/status", "/convert", "/tools/:name"],
        "tools": state.tool_names(),
    }))
}

/// Convert a chat-style message list into Responses request parameters (no upstream call).
async fn convert(Json(body): Json<ConvertBody>) -> Response {
    let mut opts = convert_messages(&body.messages).into_options();
    opts.max_output_tokens = body.max_output_tokens;
    opts.temperature = body.temperature;
    opts.json_mode = body.json_mode;
    opts.stream = body.stream;
    opts.store = body.store;
    opts.reasoning = body.reasoning_effort.map(Reasoning::with_effort);

    let model = body.model.as_deref().unwrap_or(DEFAULT_MODEL);
    match to_responses_request(model, &opts).to_params() {
        Ok(params) => Json(params).into_response(),
        Err(e) => adapter_error_response(&e),
    }
}

/// Run a registered call-site adapter.
async fn run_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    payload: Result<Json<ToolInput>, JsonRejection>,
) -> Response {
    let Some(tool) = state.tool(&name) else {
        return error_response(StatusCode::NOT_FOUND, &format!("unknown tool '{name}'"));
    };
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    match tool.run(&body).await {
        Ok(out) => Json(out).into_response(),
        Err(e) => adapter_error_response(&e),
    }
}

/// Map adapter errors to HTTP. Upstream detail stays in the logs.
pub fn adapter_error_response(e: &AdapterError) -> Response {
    match e {
        AdapterError::MissingConfig(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
        AdapterError::InvalidParameter(_) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        AdapterError::Upstream { .. }
        | AdapterError::NoOutputText
        | AdapterError::MalformedJson(_) => {
            error_response(StatusCode::BAD_GATEWAY, UPSTREAM_UNAVAILABLE)
        }
    }
}
