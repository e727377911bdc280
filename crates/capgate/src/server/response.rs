//! Mapping of results and failures onto HTTP responses.

use std::any::Any;

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use capgate_core::{Rendered, ServiceError};
use serde_json::json;

use super::panic;

/// A request failure, rendered as a plain-text body.
#[derive(Debug)]
pub enum ApiError {
    /// Failure reported by the orchestrator
    Service(ServiceError),
    /// The multipart body could not be read
    Form { status: StatusCode, message: String },
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Form {
            status: err.status(),
            message: format!("Invalid multipart body: {}", err.body_text()),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(ServiceError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Service(ServiceError::Backend(_) | ServiceError::BatchItem { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Form { status, .. } => *status,
        }
    }

    fn message(self) -> String {
        match self {
            ApiError::Service(e @ (ServiceError::Backend(_) | ServiceError::BatchItem { .. })) => {
                format!("Internal Server Error: {e}")
            }
            ApiError::Service(e) => e.to_string(),
            ApiError::Form { message, .. } => message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, self.message()).into_response()
    }
}

/// Turn a formatted result into a 200 response.
pub fn render_response(rendered: Rendered) -> Response {
    match rendered {
        Rendered::Json(value) => Json(value).into_response(),
        // String bodies are served as text/plain; charset=utf-8.
        Rendered::Text(text) => text.into_response(),
    }
}

/// Catch-all for panics escaping a handler.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };
    let stack_trace = panic::take_backtrace();

    tracing::error!(stack_trace = ?stack_trace, "Handler panicked: {message}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message, "stackTrace": stack_trace })),
    )
        .into_response()
}
