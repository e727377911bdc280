//! Request orchestration.
//!
//! The [`Orchestrator`] owns the adapter registry and runs each endpoint's
//! workflow: validate input, call one or more adapters under the right
//! cancellation scope, and classify the outcome as success, validation
//! failure, timeout or backend failure. It knows nothing about HTTP.

mod ask;
mod batch;
mod describe;
mod dispatch;
mod ocr;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::adapter::{OllamaGenerator, OnnxClassifier, TesseractRecognizer, TextRecognizer};
use crate::capability::CapabilityName;
use crate::config::Config;
use crate::deadline::CancelScope;
use crate::error::{AdapterResult, Result, ServiceError, ServiceResult};
use crate::registry::CapabilityRegistry;

pub use describe::build_prompt;
pub use dispatch::DispatchRequest;

/// Default ceiling for name-based dispatch.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest prompt prefix written to logs.
const PROMPT_EXCERPT_CHARS: usize = 80;

/// Runs endpoint workflows against the registered adapters.
pub struct Orchestrator {
    registry: CapabilityRegistry,
    recognizer: Option<Arc<dyn TextRecognizer>>,
    dispatch_ceiling: Duration,
}

impl Orchestrator {
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self {
            registry,
            recognizer: None,
            dispatch_ceiling: DEFAULT_DISPATCH_TIMEOUT,
        }
    }

    /// Build every adapter the configuration describes.
    ///
    /// A classifier whose model or label file is missing is left unbound and
    /// reported with a warning; a model that exists but fails to load is an
    /// error.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = CapabilityRegistry::builder();

        let model_path = config.classifier_model_path();
        let labels_path = config.classifier_labels_path();
        if OnnxClassifier::model_exists(&model_path, &labels_path) {
            let classifier = OnnxClassifier::load(&config.classifier, &model_path, &labels_path)?;
            registry = registry.classifier(Arc::new(classifier));
        } else {
            tracing::warn!(
                "Classifier model not found at {:?} (labels {:?}); {} is disabled",
                model_path,
                labels_path,
                CapabilityName::ImageClassifier
            );
        }

        registry = registry
            .text_generation(Arc::new(OllamaGenerator::new(
                CapabilityName::TextGeneration.as_str(),
                &config.generation.endpoint,
                &config.generation.model,
            )))
            .agent(Arc::new(OllamaGenerator::new(
                CapabilityName::Agent.as_str(),
                &config.agent.endpoint,
                &config.agent.model,
            )));

        let recognizer = TesseractRecognizer::new(&config.ocr, config.tessdata_dir());
        let orchestrator = Self::new(registry.build())
            .with_recognizer(Arc::new(recognizer))
            .with_dispatch_ceiling(Duration::from_millis(config.limits.dispatch_timeout_ms));

        tracing::debug!(
            capabilities = ?orchestrator.registry.capabilities(),
            ceiling_ms = config.limits.dispatch_timeout_ms,
            "Orchestrator ready"
        );
        Ok(orchestrator)
    }

    /// Attach the OCR engine used by [`Orchestrator::recognize`].
    pub fn with_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Override the dispatch ceiling.
    pub fn with_dispatch_ceiling(mut self, ceiling: Duration) -> Self {
        self.dispatch_ceiling = ceiling;
        self
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn recognizer(&self) -> Option<&Arc<dyn TextRecognizer>> {
        self.recognizer.as_ref()
    }

    pub fn dispatch_ceiling(&self) -> Duration {
        self.dispatch_ceiling
    }
}

/// Await an adapter call inside `scope`, folding interruption into
/// [`ServiceError::Timeout`].
async fn scoped<T, F>(scope: &CancelScope, fut: F) -> ServiceResult<T>
where
    F: Future<Output = AdapterResult<T>>,
{
    match scope.run(fut).await {
        Ok(result) => result.map_err(ServiceError::from_adapter),
        Err(_) => Err(ServiceError::Timeout),
    }
}

/// Log-safe prefix of a prompt.
fn excerpt(prompt: &str) -> String {
    let mut chars = prompt.chars();
    let head: String = chars.by_ref().take(PROMPT_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Log the failure at the level its kind calls for.
fn log_failure(operation: &str, err: &ServiceError) {
    match err {
        ServiceError::Validation(message) => {
            tracing::debug!(operation, "Rejected request: {message}");
        }
        ServiceError::Timeout => {
            tracing::warn!(operation, "Request timed out");
        }
        ServiceError::Backend(_) | ServiceError::BatchItem { .. } => {
            tracing::error!(operation, "Request failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let long = "é".repeat(100);
        let short = excerpt(&long);
        assert_eq!(short.chars().count(), PROMPT_EXCERPT_CHARS + 3);
        assert!(short.ends_with("..."));
        assert_eq!(excerpt("hello"), "hello");
    }

    #[test]
    fn test_from_config_without_model_skips_classifier() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.classifier.model_path = dir.path().join("missing.onnx");
        config.limits.dispatch_timeout_ms = 1500;

        let orchestrator = Orchestrator::from_config(&config).unwrap();
        assert_eq!(
            orchestrator.registry().capabilities(),
            vec![CapabilityName::TextGeneration, CapabilityName::Agent]
        );
        assert!(orchestrator.recognizer().is_some());
        assert_eq!(orchestrator.dispatch_ceiling(), Duration::from_millis(1500));
    }

    #[test]
    fn test_defaults() {
        let orchestrator = Orchestrator::new(CapabilityRegistry::default());
        assert_eq!(orchestrator.dispatch_ceiling(), DEFAULT_DISPATCH_TIMEOUT);
        assert!(orchestrator.recognizer().is_none());
        assert!(orchestrator.registry().capabilities().is_empty());
    }
}
