//! In-memory adapters for tests.
//!
//! Each mock records how often it was called and can be told to succeed,
//! fail, or stall. A stalled or delayed mock still honours its cancellation
//! token, so deadline behaviour can be exercised with paused time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::adapter::{Classifier, Generator, TextRecognizer};
use crate::error::{AdapterError, AdapterResult};
use crate::types::Classification;

/// Sleep for `delay` unless `cancel` fires first.
async fn wait(delay: Option<Duration>, cancel: &CancellationToken) -> AdapterResult<()> {
    let Some(delay) = delay else {
        return Ok(());
    };
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AdapterError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

#[derive(Debug, Clone)]
enum ClassifierBehavior {
    Constant(Classification),
    FailOnCall { ok: Classification, call: usize },
    Fail(String),
}

/// Scripted [`Classifier`].
pub struct MockClassifier {
    behavior: ClassifierBehavior,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockClassifier {
    fn with_behavior(behavior: ClassifierBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always returns `label` with `confidence`.
    pub fn constant(label: &str, confidence: f32) -> Self {
        Self::with_behavior(ClassifierBehavior::Constant(Classification::new(label, confidence)))
    }

    /// Always fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self::with_behavior(ClassifierBehavior::Fail(message.to_string()))
    }

    /// Returns `label` except on the `call`-th invocation (1-based), which fails.
    pub fn fail_on_call(label: &str, call: usize) -> Self {
        Self::with_behavior(ClassifierBehavior::FailOnCall {
            ok: Classification::new(label, 0.5),
            call,
        })
    }

    /// Wait `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `classify` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn name(&self) -> &str {
        "mock-classifier"
    }

    async fn classify(
        &self,
        _image: Bytes,
        cancel: &CancellationToken,
    ) -> AdapterResult<Classification> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        wait(self.delay, cancel).await?;

        match &self.behavior {
            ClassifierBehavior::Constant(c) => Ok(c.clone()),
            ClassifierBehavior::FailOnCall { ok, call: failing } if call != *failing => Ok(ok.clone()),
            ClassifierBehavior::FailOnCall { .. } => Err(AdapterError::Classification {
                message: format!("Cannot decode image on call {call}"),
            }),
            ClassifierBehavior::Fail(message) => Err(AdapterError::Classification {
                message: message.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
enum GeneratorBehavior {
    Constant(String),
    Fail(String),
    Cancelled,
}

/// Scripted [`Generator`] that records every prompt it receives.
pub struct MockGenerator {
    behavior: GeneratorBehavior,
    delay: Option<Duration>,
    available: bool,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    fn with_behavior(behavior: GeneratorBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            available: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always returns `text`.
    pub fn constant(text: &str) -> Self {
        Self::with_behavior(GeneratorBehavior::Constant(text.to_string()))
    }

    /// Always fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self::with_behavior(GeneratorBehavior::Fail(message.to_string()))
    }

    /// Reports cancellation without waiting for the token.
    pub fn cancelled() -> Self {
        Self::with_behavior(GeneratorBehavior::Cancelled)
    }

    /// Wait `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report the backend as unreachable from `is_available`.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Number of `generate` calls so far.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn generate(&self, prompt: &str, cancel: &CancellationToken) -> AdapterResult<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        wait(self.delay, cancel).await?;

        match &self.behavior {
            GeneratorBehavior::Constant(text) => Ok(text.clone()),
            GeneratorBehavior::Fail(message) => Err(AdapterError::Generation {
                message: message.clone(),
                status_code: Some(500),
            }),
            GeneratorBehavior::Cancelled => Err(AdapterError::Cancelled),
        }
    }
}

/// Scripted [`TextRecognizer`].
pub struct MockRecognizer {
    outcome: Result<String, String>,
    calls: AtomicUsize,
}

impl MockRecognizer {
    /// Always returns `text`, untrimmed.
    pub fn constant(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `recognize` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextRecognizer for MockRecognizer {
    fn name(&self) -> &str {
        "mock-recognizer"
    }

    async fn is_available(&self) -> bool {
        self.outcome.is_ok()
    }

    async fn recognize(&self, _image: Bytes, cancel: &CancellationToken) -> AdapterResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if cancel.is_cancelled() {
            return Err(AdapterError::Cancelled);
        }
        self.outcome
            .clone()
            .map_err(|message| AdapterError::Recognition { message })
    }
}
