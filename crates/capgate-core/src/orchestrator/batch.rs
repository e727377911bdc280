//! Batch classification: one classifier call per uploaded file, in order.

use tokio_util::sync::CancellationToken;

use super::{log_failure, Orchestrator};
use crate::capability::CapabilityName;
use crate::deadline::CancelScope;
use crate::error::{AdapterError, ServiceError, ServiceResult};
use crate::types::{BatchItem, UploadedItem, UNKNOWN_LABEL};

impl Orchestrator {
    /// Classify every item sequentially under the caller's cancellation.
    ///
    /// The first failing item aborts the batch; results gathered so far are
    /// discarded.
    pub async fn batch_classify(
        &self,
        items: Vec<UploadedItem>,
        caller: &CancellationToken,
    ) -> ServiceResult<Vec<BatchItem>> {
        let result = self.batch_inner(items, caller).await;
        if let Err(e) = &result {
            log_failure("batch-classify", e);
        }
        result
    }

    async fn batch_inner(
        &self,
        items: Vec<UploadedItem>,
        caller: &CancellationToken,
    ) -> ServiceResult<Vec<BatchItem>> {
        if items.is_empty() {
            return Err(ServiceError::validation("No files provided."));
        }

        let classifier = self.registry.classifier().ok_or_else(|| {
            ServiceError::validation(format!(
                "{} Service not available.",
                CapabilityName::ImageClassifier.service_name()
            ))
        })?;

        tracing::info!(files = items.len(), "Classifying batch");

        let scope = CancelScope::new(caller.clone());
        let mut results = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let UploadedItem { name, bytes } = item;
            if bytes.is_empty() {
                return Err(ServiceError::BatchItem {
                    file: name,
                    source: AdapterError::Classification {
                        message: "Image is empty".to_string(),
                    },
                });
            }
            let outcome = scope
                .run(classifier.classify(bytes, scope.token()))
                .await
                .unwrap_or(Err(AdapterError::Cancelled));

            let classification = match outcome {
                Ok(c) => c,
                Err(AdapterError::Cancelled) => return Err(ServiceError::Timeout),
                Err(source) => {
                    return Err(ServiceError::BatchItem { file: name, source });
                }
            };

            tracing::debug!(index, file = %name, label = %classification.label, "Batch item classified");
            let label = if classification.label.trim().is_empty() {
                UNKNOWN_LABEL.to_string()
            } else {
                classification.label
            };
            results.push(BatchItem { file: name, label });
        }

        tracing::info!(files = results.len(), "Batch classified");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockClassifier;
    use crate::registry::CapabilityRegistry;
    use std::sync::Arc;

    fn orchestrator(classifier: Arc<MockClassifier>) -> Orchestrator {
        Orchestrator::new(CapabilityRegistry::builder().classifier(classifier).build())
    }

    fn uploads(names: &[&str]) -> Vec<UploadedItem> {
        names
            .iter()
            .map(|n| UploadedItem::new(*n, b"jpeg".to_vec()))
            .collect()
    }

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let classifier = Arc::new(MockClassifier::constant("cat", 0.9));
        let o = orchestrator(classifier.clone());
        let results = o
            .batch_classify(uploads(&["c.jpg", "a.jpg", "b.jpg"]), &CancellationToken::new())
            .await
            .unwrap();
        let files: Vec<_> = results.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(files, ["c.jpg", "a.jpg", "b.jpg"]);
        assert!(results.iter().all(|r| r.label == "cat"));
        assert_eq!(classifier.call_count(), 3);
    }

    #[tokio::test]
    async fn test_failing_last_item_aborts_batch() {
        let classifier = Arc::new(MockClassifier::fail_on_call("cat", 3));
        let o = orchestrator(classifier.clone());
        let err = o
            .batch_classify(uploads(&["a.jpg", "b.jpg", "broken.png"]), &CancellationToken::new())
            .await
            .unwrap_err();
        match &err {
            ServiceError::BatchItem { file, .. } => assert_eq!(file, "broken.png"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Failed to classify broken.png"));
    }

    #[tokio::test]
    async fn test_failing_first_item_stops_processing() {
        let classifier = Arc::new(MockClassifier::fail_on_call("cat", 1));
        let o = orchestrator(classifier.clone());
        let err = o
            .batch_classify(uploads(&["a.jpg", "b.jpg"]), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BatchItem { .. }));
        assert_eq!(classifier.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_item_fails_batch_by_name() {
        let classifier = Arc::new(MockClassifier::constant("cat", 0.9));
        let o = orchestrator(classifier.clone());
        let items = vec![
            UploadedItem::new("a.jpg", b"1".to_vec()),
            UploadedItem::new("empty.jpg", Vec::new()),
            UploadedItem::new("c.jpg", b"3".to_vec()),
        ];
        let err = o.batch_classify(items, &CancellationToken::new()).await.unwrap_err();
        match &err {
            ServiceError::BatchItem { file, .. } => assert_eq!(file, "empty.jpg"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "Failed to classify empty.jpg: Image is empty");
        assert_eq!(classifier.call_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_label_renders_unknown() {
        let o = orchestrator(Arc::new(MockClassifier::constant(" ", 0.2)));
        let results = o
            .batch_classify(uploads(&["a.jpg"]), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(results[0].label, UNKNOWN_LABEL);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let o = orchestrator(Arc::new(MockClassifier::constant("cat", 0.9)));
        let err = o.batch_classify(Vec::new(), &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "No files provided.");
    }

    #[tokio::test]
    async fn test_missing_classifier() {
        let o = Orchestrator::new(CapabilityRegistry::default());
        let err = o
            .batch_classify(uploads(&["a.jpg"]), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "ImageClassifier Service not available.");
    }

    #[tokio::test]
    async fn test_cancelled_caller_is_timeout() {
        let classifier = Arc::new(MockClassifier::constant("cat", 0.9));
        let o = orchestrator(classifier);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = o.batch_classify(uploads(&["a.jpg"]), &cancel).await.unwrap_err();
        assert!(matches!(err, ServiceError::Timeout));
    }
}
