//! Name-based dispatch: one capability, one adapter call, one deadline.

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use super::{excerpt, log_failure, Orchestrator};
use crate::capability::CapabilityName;
use crate::deadline::CancelScope;
use crate::error::{ServiceError, ServiceResult};
use crate::format::OutputFormat;
use crate::types::{Payload, ProcessingResult};

/// Raw inputs of a dispatch call, as supplied by the client.
#[derive(Debug, Clone, Default)]
pub struct DispatchRequest {
    /// Capability name, e.g. "imageclassifier"
    pub model: Option<String>,
    /// Uploaded file; empty uploads count as absent
    pub file: Option<Bytes>,
    /// Prompt text
    pub prompt: Option<String>,
    /// Requested rendering, logged only
    pub output_format: OutputFormat,
}

impl Orchestrator {
    /// Validate the request, then run the resolved adapter under a scope
    /// ending at the earlier of caller cancellation and the dispatch ceiling.
    pub async fn dispatch(
        &self,
        request: DispatchRequest,
        caller: &CancellationToken,
    ) -> ServiceResult<ProcessingResult> {
        let result = self.dispatch_inner(request, caller).await;
        if let Err(e) = &result {
            log_failure("dispatch", e);
        }
        result
    }

    async fn dispatch_inner(
        &self,
        request: DispatchRequest,
        caller: &CancellationToken,
    ) -> ServiceResult<ProcessingResult> {
        let DispatchRequest {
            model,
            file,
            prompt,
            output_format,
        } = request;

        let model = model.unwrap_or_default();
        let input = match (&prompt, &file) {
            (Some(p), _) if !p.trim().is_empty() => excerpt(p),
            (_, Some(f)) => format!("<{} bytes>", f.len()),
            _ => "-".to_string(),
        };
        tracing::info!(
            model = %model.trim(),
            format = output_format.as_str(),
            input = %input,
            "Dispatching request"
        );

        if model.trim().is_empty() {
            return Err(ServiceError::validation("Model is required."));
        }

        let (capability, handle) = self
            .registry
            .resolve(&model)
            .ok_or_else(|| ServiceError::validation("Unsupported model type."))?;

        let payload = payload_for(capability, file, prompt)?;

        let scope = CancelScope::new(caller.clone()).with_ceiling(self.dispatch_ceiling);
        let result = match scope.run(handle.process(payload, scope.token())).await {
            Ok(result) => result?,
            Err(_) => return Err(ServiceError::Timeout),
        };

        tracing::info!(capability = %capability, "Dispatch succeeded: {}", result.summary());
        Ok(result)
    }
}

/// Pick the payload the capability needs, rejecting missing input.
fn payload_for(
    capability: CapabilityName,
    file: Option<Bytes>,
    prompt: Option<String>,
) -> ServiceResult<Payload> {
    let prompt = prompt.filter(|p| !p.trim().is_empty());
    match capability {
        CapabilityName::ImageClassifier => file
            .filter(|f| !f.is_empty())
            .map(Payload::Blob)
            .ok_or_else(|| ServiceError::validation("File is required for image classification.")),
        CapabilityName::TextGeneration => prompt
            .map(Payload::Prompt)
            .ok_or_else(|| ServiceError::validation("Prompt is required for text generation.")),
        CapabilityName::Agent => prompt
            .map(Payload::Prompt)
            .ok_or_else(|| ServiceError::validation("Prompt is required for agent.")),
        CapabilityName::Ocr => Err(ServiceError::validation("Unsupported model type.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockClassifier, MockGenerator};
    use crate::registry::CapabilityRegistry;
    use crate::types::Classification;
    use std::sync::Arc;
    use std::time::Duration;

    struct Fixture {
        classifier: Arc<MockClassifier>,
        text: Arc<MockGenerator>,
        agent: Arc<MockGenerator>,
        orchestrator: Orchestrator,
    }

    fn fixture(classifier: MockClassifier, text: MockGenerator, agent: MockGenerator) -> Fixture {
        let classifier = Arc::new(classifier);
        let text = Arc::new(text);
        let agent = Arc::new(agent);
        let registry = CapabilityRegistry::builder()
            .classifier(classifier.clone())
            .text_generation(text.clone())
            .agent(agent.clone())
            .build();
        Fixture {
            classifier,
            text,
            agent,
            orchestrator: Orchestrator::new(registry),
        }
    }

    fn default_fixture() -> Fixture {
        fixture(
            MockClassifier::constant("tabby cat", 0.87),
            MockGenerator::constant("Once upon a time"),
            MockGenerator::constant("42"),
        )
    }

    fn request(model: &str) -> DispatchRequest {
        DispatchRequest {
            model: Some(model.to_string()),
            ..DispatchRequest::default()
        }
    }

    fn validation_message(result: ServiceResult<ProcessingResult>) -> String {
        match result {
            Err(ServiceError::Validation(message)) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_classifier_dispatch() {
        let f = default_fixture();
        let result = f
            .orchestrator
            .dispatch(
                DispatchRequest {
                    file: Some(Bytes::from_static(b"jpeg")),
                    ..request("ImageClassifier")
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(result, ProcessingResult::Label(Classification::new("tabby cat", 0.87)));
        assert_eq!(f.classifier.call_count(), 1);
    }

    #[tokio::test]
    async fn test_text_generation_dispatch_forwards_prompt() {
        let f = default_fixture();
        let result = f
            .orchestrator
            .dispatch(
                DispatchRequest {
                    prompt: Some("Tell me a story".to_string()),
                    ..request("textgeneration")
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(result, ProcessingResult::Text("Once upon a time".to_string()));
        assert_eq!(f.text.prompts(), vec!["Tell me a story".to_string()]);
        assert_eq!(f.agent.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_model() {
        let f = default_fixture();
        let cancel = CancellationToken::new();
        let msg = validation_message(f.orchestrator.dispatch(DispatchRequest::default(), &cancel).await);
        assert_eq!(msg, "Model is required.");
        let msg = validation_message(f.orchestrator.dispatch(request("  "), &cancel).await);
        assert_eq!(msg, "Model is required.");
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[tokio::test]
    async fn test_rejected_request_is_still_logged() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let f = default_fixture();
        let req = DispatchRequest {
            prompt: Some("What is the capital of France?".to_string()),
            ..DispatchRequest::default()
        };
        let msg = validation_message(f.orchestrator.dispatch(req, &CancellationToken::new()).await);
        assert_eq!(msg, "Model is required.");

        let output = logs.contents();
        assert!(output.contains("Dispatching request"), "{output}");
        assert!(output.contains("What is the capital of France?"), "{output}");
        assert!(output.contains("format=json"), "{output}");
    }

    #[tokio::test]
    async fn test_unknown_model_invokes_no_adapter() {
        let f = default_fixture();
        let cancel = CancellationToken::new();
        for name in ["sentiment", "ocr"] {
            let req = DispatchRequest {
                file: Some(Bytes::from_static(b"jpeg")),
                prompt: Some("hi".to_string()),
                ..request(name)
            };
            let msg = validation_message(f.orchestrator.dispatch(req, &cancel).await);
            assert_eq!(msg, "Unsupported model type.");
        }
        assert_eq!(f.classifier.call_count(), 0);
        assert_eq!(f.text.call_count(), 0);
        assert_eq!(f.agent.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_payload_messages() {
        let f = default_fixture();
        let cancel = CancellationToken::new();

        let msg = validation_message(f.orchestrator.dispatch(request("imageclassifier"), &cancel).await);
        assert_eq!(msg, "File is required for image classification.");

        let empty_file = DispatchRequest {
            file: Some(Bytes::new()),
            ..request("imageclassifier")
        };
        let msg = validation_message(f.orchestrator.dispatch(empty_file, &cancel).await);
        assert_eq!(msg, "File is required for image classification.");

        let blank = DispatchRequest {
            prompt: Some("   ".to_string()),
            ..request("textgeneration")
        };
        let msg = validation_message(f.orchestrator.dispatch(blank, &cancel).await);
        assert_eq!(msg, "Prompt is required for text generation.");

        let msg = validation_message(f.orchestrator.dispatch(request("agent"), &cancel).await);
        assert_eq!(msg, "Prompt is required for agent.");

        assert_eq!(f.classifier.call_count(), 0);
        assert_eq!(f.text.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ceiling_elapses_to_timeout() {
        let f = fixture(
            MockClassifier::constant("cat", 0.5),
            MockGenerator::constant("late").with_delay(Duration::from_secs(120)),
            MockGenerator::constant("42"),
        );
        let err = f
            .orchestrator
            .dispatch(
                DispatchRequest {
                    prompt: Some("slow".to_string()),
                    ..request("textgeneration")
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_ceiling() {
        let f = fixture(
            MockClassifier::constant("cat", 0.5).with_delay(Duration::from_secs(5)),
            MockGenerator::constant("text"),
            MockGenerator::constant("42"),
        );
        let orchestrator = Orchestrator::new(f.orchestrator.registry().clone())
            .with_dispatch_ceiling(Duration::from_secs(1));
        let err = orchestrator
            .dispatch(
                DispatchRequest {
                    file: Some(Bytes::from_static(b"jpeg")),
                    ..request("imageclassifier")
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Timeout));
    }

    #[tokio::test]
    async fn test_caller_cancellation_is_timeout() {
        let f = default_fixture();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = f
            .orchestrator
            .dispatch(
                DispatchRequest {
                    prompt: Some("hello".to_string()),
                    ..request("agent")
                },
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Timeout));
    }

    #[tokio::test]
    async fn test_backend_failure() {
        let f = fixture(
            MockClassifier::constant("cat", 0.5),
            MockGenerator::failing("Ollama HTTP 500: model not found"),
            MockGenerator::constant("42"),
        );
        let err = f
            .orchestrator
            .dispatch(
                DispatchRequest {
                    prompt: Some("hello".to_string()),
                    ..request("textgeneration")
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Backend(_)));
        assert_eq!(err.to_string(), "Ollama HTTP 500: model not found");
    }
}
