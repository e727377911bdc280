//! Ask route: a free-form question for the agent.

use tokio_util::sync::CancellationToken;

use super::{excerpt, log_failure, scoped, Orchestrator};
use crate::capability::CapabilityName;
use crate::deadline::CancelScope;
use crate::error::{ServiceError, ServiceResult};
use crate::types::Answer;

impl Orchestrator {
    /// Forward `prompt` to the agent under the caller's cancellation.
    pub async fn ask(
        &self,
        prompt: Option<String>,
        caller: &CancellationToken,
    ) -> ServiceResult<Answer> {
        let result = self.ask_inner(prompt, caller).await;
        if let Err(e) = &result {
            log_failure("ask", e);
        }
        result
    }

    async fn ask_inner(
        &self,
        prompt: Option<String>,
        caller: &CancellationToken,
    ) -> ServiceResult<Answer> {
        let prompt = prompt
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ServiceError::validation("Prompt is required."))?;

        let agent = self
            .registry
            .generator(CapabilityName::Agent)
            .ok_or_else(|| {
                ServiceError::validation(format!(
                    "{} Service not available.",
                    CapabilityName::Agent.service_name()
                ))
            })?;

        tracing::info!(prompt = %excerpt(&prompt), "Asking agent");

        let scope = CancelScope::new(caller.clone());
        let answer = scoped(&scope, agent.generate(&prompt, scope.token())).await?;

        tracing::info!(chars = answer.chars().count(), "Agent answered");
        Ok(Answer { answer })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockGenerator;
    use crate::registry::CapabilityRegistry;
    use std::sync::Arc;

    fn orchestrator(agent: Arc<MockGenerator>) -> Orchestrator {
        Orchestrator::new(CapabilityRegistry::builder().agent(agent).build())
    }

    #[tokio::test]
    async fn test_ask_returns_answer() {
        let agent = Arc::new(MockGenerator::constant("Paris"));
        let o = orchestrator(agent.clone());
        let answer = o
            .ask(Some("Capital of France?".to_string()), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(answer.answer, "Paris");
        assert_eq!(agent.prompts(), vec!["Capital of France?".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_prompt() {
        let agent = Arc::new(MockGenerator::constant("Paris"));
        let o = orchestrator(agent.clone());
        for prompt in [None, Some("   ".to_string())] {
            let err = o.ask(prompt, &CancellationToken::new()).await.unwrap_err();
            assert_eq!(err.to_string(), "Prompt is required.");
        }
        assert_eq!(agent.call_count(), 0);
    }

    #[tokio::test]
    async fn test_agent_failure_is_backend_error() {
        let o = orchestrator(Arc::new(MockGenerator::failing("Ollama request failed")));
        let err = o
            .ask(Some("hi".to_string()), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Backend(_)));
    }

    #[tokio::test]
    async fn test_cancelled_caller_is_timeout() {
        let o = orchestrator(Arc::new(MockGenerator::constant("Paris")));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = o.ask(Some("hi".to_string()), &cancel).await.unwrap_err();
        assert!(matches!(err, ServiceError::Timeout));
    }
}
