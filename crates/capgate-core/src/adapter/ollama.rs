//! Ollama generator for local text generation and agent answers.
//!
//! Talks to a local Ollama instance via its HTTP API.
//! No authentication required, just needs Ollama running locally.

use super::Generator;
use crate::error::{AdapterError, AdapterResult};
use crate::types::EMPTY_PLACEHOLDER;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Returned when the backend answers with an empty body.
pub const NO_RESPONSE: &str = "(no response)";

/// Transport-level timeout for one generate call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(100);

/// Ollama-backed generator. One instance per backend model.
pub struct OllamaGenerator {
    name: String,
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaGenerator {
    /// `name` identifies the adapter in logs, e.g. "textgeneration" or "agent".
    pub fn new(name: &str, endpoint: &str, model: &str) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Backend model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, prompt: &str) -> AdapterResult<String> {
        let url = format!("{}/api/generate", self.endpoint);
        let start = Instant::now();

        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| AdapterError::Generation {
                message: format!("Ollama request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AdapterError::Generation {
                message: format!("Ollama HTTP {status}: {}", text.trim()),
                status_code: Some(status.as_u16()),
            });
        }

        let raw = resp.text().await.map_err(|e| AdapterError::Generation {
            message: format!("Failed to read Ollama response: {e}"),
            status_code: None,
        })?;

        tracing::debug!(
            adapter = %self.name,
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            bytes = raw.len(),
            "Ollama responded"
        );

        Ok(parse_generate_body(&raw))
    }
}

/// Ollama /api/generate request body.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Extract the generated text from a raw /api/generate body.
///
/// Lenient by contract: a body without a `response` field is returned as
/// re-serialized JSON, and a body that is not JSON at all is returned as-is.
pub fn parse_generate_body(raw: &str) -> String {
    if raw.trim().is_empty() {
        return NO_RESPONSE.to_string();
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => match map.get("response") {
            Some(Value::String(text)) => text.trim().to_string(),
            Some(Value::Null) => EMPTY_PLACEHOLDER.to_string(),
            Some(other) => other.to_string(),
            None => Value::Object(map).to_string(),
        },
        Ok(other) => other.to_string(),
        Err(_) => raw.to_string(),
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.endpoint);
        match self.client.get(&url).timeout(Duration::from_secs(5)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn generate(&self, prompt: &str, cancel: &CancellationToken) -> AdapterResult<String> {
        // Dropping the request future aborts the HTTP call.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AdapterError::Cancelled),
            result = self.request(prompt) => result,
        }
    }
}
