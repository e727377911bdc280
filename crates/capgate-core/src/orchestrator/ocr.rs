//! OCR route. Not reachable through name-based dispatch.

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use super::{log_failure, scoped, Orchestrator};
use crate::capability::CapabilityName;
use crate::deadline::CancelScope;
use crate::error::{ServiceError, ServiceResult};
use crate::format::non_blank;
use crate::types::Recognized;

impl Orchestrator {
    /// Extract text from `image`. The result is trimmed; empty extraction
    /// yields the empty placeholder.
    pub async fn recognize(
        &self,
        image: Option<Bytes>,
        caller: &CancellationToken,
    ) -> ServiceResult<Recognized> {
        let result = self.recognize_inner(image, caller).await;
        if let Err(e) = &result {
            log_failure("ocr", e);
        }
        result
    }

    async fn recognize_inner(
        &self,
        image: Option<Bytes>,
        caller: &CancellationToken,
    ) -> ServiceResult<Recognized> {
        let image = image
            .filter(|b| !b.is_empty())
            .ok_or_else(|| ServiceError::validation("File is required."))?;

        let recognizer = self.recognizer.as_ref().ok_or_else(|| {
            ServiceError::validation(format!(
                "{} Service not available.",
                CapabilityName::Ocr.service_name()
            ))
        })?;

        tracing::info!(bytes = image.len(), engine = recognizer.name(), "Recognizing text");

        let scope = CancelScope::new(caller.clone());
        let raw = scoped(&scope, recognizer.recognize(image, scope.token())).await?;
        let text = non_blank(raw.trim().to_string());

        tracing::info!(chars = text.chars().count(), "Text recognized");
        Ok(Recognized { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockRecognizer;
    use crate::registry::CapabilityRegistry;
    use crate::types::EMPTY_PLACEHOLDER;
    use std::sync::Arc;

    fn orchestrator(recognizer: Arc<MockRecognizer>) -> Orchestrator {
        Orchestrator::new(CapabilityRegistry::default()).with_recognizer(recognizer)
    }

    #[tokio::test]
    async fn test_text_is_trimmed() {
        let o = orchestrator(Arc::new(MockRecognizer::constant("\n  Hello OCR \n\n")));
        let recognized = o
            .recognize(Some(Bytes::from_static(b"png")), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(recognized.text, "Hello OCR");
    }

    #[tokio::test]
    async fn test_empty_extraction_is_placeholder() {
        let o = orchestrator(Arc::new(MockRecognizer::constant(" \n")));
        let recognized = o
            .recognize(Some(Bytes::from_static(b"png")), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(recognized.text, EMPTY_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_missing_file_skips_engine() {
        let recognizer = Arc::new(MockRecognizer::constant("text"));
        let o = orchestrator(recognizer.clone());
        let err = o.recognize(None, &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "File is required.");
        assert_eq!(recognizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_engine_failure_is_backend_error() {
        let o = orchestrator(Arc::new(MockRecognizer::failing("tesseract exited with 1")));
        let err = o
            .recognize(Some(Bytes::from_static(b"png")), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Backend(_)));
    }

    #[tokio::test]
    async fn test_no_engine_configured() {
        let o = Orchestrator::new(CapabilityRegistry::default());
        let err = o
            .recognize(Some(Bytes::from_static(b"png")), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Ocr Service not available.");
    }
}
