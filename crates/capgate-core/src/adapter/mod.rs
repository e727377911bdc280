//! Backend adapter contracts.
//!
//! Classification and generation adapters share the uniform
//! `process(payload) -> ProcessingResult` contract through [`AdapterHandle`],
//! which is what the registry hands out for name-based dispatch. OCR has its
//! own [`TextRecognizer`] contract and is never dispatched by name.
//!
//! Adapter instances are built once at startup and shared across requests
//! via `Arc`, so every implementation must be `Send + Sync`. Engines that
//! need exclusive access serialize it internally.

pub mod classifier;
pub mod ollama;
pub mod tesseract;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::error::{AdapterResult, ServiceError, ServiceResult};
use crate::types::{Classification, Payload, ProcessingResult};

pub use classifier::OnnxClassifier;
pub use ollama::OllamaGenerator;
pub use tesseract::TesseractRecognizer;

/// Image bytes in, top-1 label out.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn Classifier>` for dynamic dispatch).
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Adapter name for logging.
    fn name(&self) -> &str;

    /// Classify an encoded image.
    ///
    /// Implementations should return `AdapterError::Cancelled` promptly once
    /// `cancel` fires; work already running on a blocking thread may be
    /// abandoned rather than interrupted.
    async fn classify(
        &self,
        image: Bytes,
        cancel: &CancellationToken,
    ) -> AdapterResult<Classification>;
}

/// Prompt in, generated text out.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Adapter name for logging.
    fn name(&self) -> &str;

    /// Check whether the backend is reachable.
    async fn is_available(&self) -> bool;

    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str, cancel: &CancellationToken) -> AdapterResult<String>;
}

/// Image bytes in, extracted text out.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Adapter name for logging.
    fn name(&self) -> &str;

    /// Check whether the engine can be invoked.
    async fn is_available(&self) -> bool;

    /// Extract text from an encoded image. The text is returned untrimmed.
    async fn recognize(&self, image: Bytes, cancel: &CancellationToken) -> AdapterResult<String>;
}

/// A dispatchable adapter, one variant per processing contract.
#[derive(Clone)]
pub enum AdapterHandle {
    Classifier(Arc<dyn Classifier>),
    Generator(Arc<dyn Generator>),
}

impl AdapterHandle {
    /// Adapter name for logging.
    pub fn name(&self) -> &str {
        match self {
            AdapterHandle::Classifier(c) => c.name(),
            AdapterHandle::Generator(g) => g.name(),
        }
    }

    /// The payload kind this adapter accepts ("file" or "prompt").
    pub fn expected_payload(&self) -> &'static str {
        match self {
            AdapterHandle::Classifier(_) => "file",
            AdapterHandle::Generator(_) => "prompt",
        }
    }

    /// Run the adapter on `payload`.
    ///
    /// A payload of the wrong kind is a validation error and never reaches
    /// the adapter.
    pub async fn process(
        &self,
        payload: Payload,
        cancel: &CancellationToken,
    ) -> ServiceResult<ProcessingResult> {
        match (self, payload) {
            (AdapterHandle::Classifier(classifier), Payload::Blob(image)) => classifier
                .classify(image, cancel)
                .await
                .map(ProcessingResult::Label)
                .map_err(ServiceError::from_adapter),
            (AdapterHandle::Generator(generator), Payload::Prompt(prompt)) => generator
                .generate(&prompt, cancel)
                .await
                .map(ProcessingResult::Text)
                .map_err(ServiceError::from_adapter),
            (handle, payload) => Err(ServiceError::validation(format!(
                "{} expects a {} but received a {}.",
                handle.name(),
                handle.expected_payload(),
                payload.kind()
            ))),
        }
    }
}

impl fmt::Debug for AdapterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterHandle::Classifier(c) => f.debug_tuple("Classifier").field(&c.name()).finish(),
            AdapterHandle::Generator(g) => f.debug_tuple("Generator").field(&g.name()).finish(),
        }
    }
}
