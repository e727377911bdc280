//! HTTP handlers for the `/api/ai` surface.

use axum::extract::{Multipart, Query, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use capgate_core::{render, DispatchRequest, OutputFormat};
use serde::Deserialize;
use serde_json::{json, Value};

use super::caller::Caller;
use super::form::FormData;
use super::response::{render_response, ApiError};
use super::AppState;

/// The `outputFormat` query parameter shared by every endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct FormatQuery {
    #[serde(rename = "outputFormat")]
    output_format: Option<String>,
}

impl FormatQuery {
    fn format(&self) -> OutputFormat {
        OutputFormat::parse(self.output_format.as_deref())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ai", post(process))
        .route("/api/ai/describe-image", post(describe_image))
        .route("/api/ai/batch-classify", post(batch_classify))
        .route("/api/ai/ocr", post(ocr))
        .route("/api/ai/ask", post(ask))
        .route("/health", get(health))
}

/// POST /api/ai - dispatch to the capability named by `model`.
async fn process(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<FormatQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let format = query.format();
    let form = FormData::read(multipart).await?;

    let request = DispatchRequest {
        model: form.text("model"),
        file: form.file("file"),
        prompt: form.text("prompt"),
        output_format: format,
    };
    let result = state.orchestrator.dispatch(request, caller.token()).await?;
    Ok(render_response(render(&result, format)))
}

/// POST /api/ai/describe-image - classify, then describe.
async fn describe_image(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<FormatQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let format = query.format();
    let form = FormData::read(multipart).await?;

    let description = state
        .orchestrator
        .describe_image(form.file("file"), caller.token())
        .await?;
    Ok(render_response(render(&description, format)))
}

/// POST /api/ai/batch-classify - classify every uploaded file in order.
async fn batch_classify(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<FormatQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let format = query.format();
    let form = FormData::read(multipart).await?;

    let items = state
        .orchestrator
        .batch_classify(form.files("files"), caller.token())
        .await?;
    Ok(render_response(render(items.as_slice(), format)))
}

/// POST /api/ai/ocr - extract text from an image.
async fn ocr(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<FormatQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let format = query.format();
    let form = FormData::read(multipart).await?;

    let recognized = state
        .orchestrator
        .recognize(form.file("file"), caller.token())
        .await?;
    Ok(render_response(render(&recognized, format)))
}

/// POST /api/ai/ask - free-form question for the agent.
async fn ask(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<FormatQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let format = query.format();
    let form = FormData::read(multipart).await?;

    let answer = state
        .orchestrator
        .ask(form.text("prompt"), caller.token())
        .await?;
    Ok(render_response(render(&answer, format)))
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": capgate_core::VERSION,
    }))
}
