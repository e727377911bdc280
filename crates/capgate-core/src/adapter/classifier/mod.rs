//! ONNX image classifier.
//!
//! Decodes uploaded bytes, resizes to the model's input resolution, runs an
//! ImageNet-style classification model through ONNX Runtime and returns the
//! top-1 label with its softmax probability.
//!
//! # Usage
//!
//! ```rust,ignore
//! use capgate_core::adapter::{Classifier, OnnxClassifier};
//! use capgate_core::Config;
//!
//! let config = Config::default();
//! let classifier = OnnxClassifier::load(
//!     &config.classifier,
//!     &config.classifier_model_path(),
//!     &config.classifier_labels_path(),
//! )?;
//! let top1 = classifier.classify(bytes, &cancel).await?;
//! ```

pub(crate) mod preprocess;
pub(crate) mod session;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::config::ClassifierConfig;
use crate::error::{AdapterError, AdapterResult};
use crate::math::{argmax, softmax};
use crate::types::Classification;

use self::preprocess::preprocess;
use self::session::ClassifierSession;

use super::Classifier;

/// Image classifier backed by an ONNX Runtime session.
///
/// Cheap to share: the session and label table live behind an `Arc` so each
/// call can move a handle onto a blocking thread.
pub struct OnnxClassifier {
    inner: Arc<Inner>,
}

struct Inner {
    session: ClassifierSession,
    labels: Vec<String>,
    image_size: u32,
}

impl OnnxClassifier {
    /// Load the model and label table.
    pub fn load(
        config: &ClassifierConfig,
        model_path: &Path,
        labels_path: &Path,
    ) -> AdapterResult<Self> {
        if !model_path.exists() {
            return Err(AdapterError::ModelLoad {
                path: model_path.to_path_buf(),
                message: "Model file not found.".to_string(),
            });
        }

        let labels = std::fs::read_to_string(labels_path)
            .map(|content| parse_labels(&content))
            .map_err(|e| AdapterError::ModelLoad {
                path: labels_path.to_path_buf(),
                message: format!("Failed to read label table: {e}"),
            })?;
        if labels.is_empty() {
            return Err(AdapterError::ModelLoad {
                path: labels_path.to_path_buf(),
                message: "Label table is empty.".to_string(),
            });
        }

        tracing::info!("Loading classification model from {:?}", model_path);
        let session = ClassifierSession::load(model_path, &config.input_name)?;
        tracing::info!(labels = labels.len(), "Classification model loaded");

        Ok(Self {
            inner: Arc::new(Inner {
                session,
                labels,
                image_size: config.image_size,
            }),
        })
    }

    /// Check whether both the model and the label table exist on disk.
    pub fn model_exists(model_path: &Path, labels_path: &Path) -> bool {
        model_path.exists() && labels_path.exists()
    }

    /// Number of labels the classifier can emit.
    pub fn label_count(&self) -> usize {
        self.inner.labels.len()
    }
}

impl Inner {
    /// Decode, preprocess and classify (runs in spawn_blocking).
    fn classify_sync(&self, bytes: &[u8]) -> AdapterResult<Classification> {
        let image = image::load_from_memory(bytes).map_err(|e| AdapterError::Classification {
            message: format!("Cannot decode image: {e}"),
        })?;
        let tensor = preprocess(&image, self.image_size);
        let scores = self.session.scores(&tensor)?;
        top1(&scores, &self.labels)
    }
}

#[async_trait]
impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        "onnx-classifier"
    }

    async fn classify(
        &self,
        image: Bytes,
        cancel: &CancellationToken,
    ) -> AdapterResult<Classification> {
        if cancel.is_cancelled() {
            return Err(AdapterError::Cancelled);
        }

        let inner = self.inner.clone();
        let task = tokio::task::spawn_blocking(move || inner.classify_sync(&image));

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AdapterError::Cancelled),
            joined = task => match joined {
                Ok(result) => result,
                Err(e) => Err(AdapterError::Classification {
                    message: format!("Classifier task failed: {e}"),
                }),
            },
        }
    }
}

/// Split a label file into labels, one per line, preserving index order.
///
/// Trailing blank lines are dropped; interior lines are kept so indices stay
/// aligned with the model's output.
fn parse_labels(content: &str) -> Vec<String> {
    let mut labels: Vec<String> = content.lines().map(|l| l.trim().to_string()).collect();
    while labels.last().is_some_and(|l| l.is_empty()) {
        labels.pop();
    }
    labels
}

/// Pick the most probable class from raw model scores.
fn top1(scores: &[f32], labels: &[String]) -> AdapterResult<Classification> {
    if scores.len() != labels.len() {
        return Err(AdapterError::Classification {
            message: format!(
                "Model produced {} scores but the label table has {} entries",
                scores.len(),
                labels.len()
            ),
        });
    }

    let probabilities = softmax(scores);
    let (index, confidence) = argmax(&probabilities).ok_or_else(|| {
        AdapterError::Classification {
            message: "Model produced no usable scores".to_string(),
        }
    })?;

    Ok(Classification::new(labels[index].clone(), confidence))
}
