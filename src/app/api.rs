use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::translator::Translator;
use crate::domain::model::TranslateResponse;
use crate::domain::ports::LanguageModel;
use crate::utils::error::TranslateError;

struct ApiState<M: LanguageModel> {
    translator: Translator<M>,
    debug_raw: bool,
}

pub fn router<M: LanguageModel + 'static>(translator: Translator<M>, debug_raw: bool) -> Router {
    let state = Arc::new(ApiState {
        translator,
        debug_raw,
    });

    Router::new()
        .route("/api/health", get(health))
        .route("/api/translate", post(translate::<M>))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<Value>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
    detail: Option<Value>,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            detail: None,
        }
    }
}

impl From<TranslateError> for ApiError {
    fn from(err: TranslateError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(
                "❌ Translation failed: {} (Category: {:?}, Severity: {:?})",
                err,
                err.category(),
                err.severity()
            );
        }
        Self {
            status,
            message: err.to_string(),
            detail: err.upstream_detail().cloned(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

async fn translate<M: LanguageModel + 'static>(
    State(state): State<Arc<ApiState<M>>>,
    body: Bytes,
) -> Result<Json<TranslateResponse>, ApiError> {
    let body: Value = serde_json::from_slice(&body)
        .map_err(|err| ApiError::bad_request(format!("invalid JSON body: {err}")))?;

    // 缺少 text 與空白 text 一律視為 400
    let text = body
        .get("text")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if text.is_empty() {
        return Err(ApiError::bad_request("text is required"));
    }

    let result = state.translator.translate(text, body.get("history")).await?;
    Ok(Json(TranslateResponse::from_result(result, state.debug_raw)))
}
