//! Describe-image composition: classify, then generate prose about the label.

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use super::{log_failure, scoped, Orchestrator};
use crate::capability::CapabilityName;
use crate::deadline::CancelScope;
use crate::error::{ServiceError, ServiceResult};
use crate::format::non_blank;
use crate::types::Description;

/// Label substituted when the classifier returns nothing usable.
const FALLBACK_LABEL: &str = "unknown";

/// Build the generation prompt for a classified image.
pub fn build_prompt(label: &str) -> String {
    let label = label.trim();
    let label = if label.is_empty() { FALLBACK_LABEL } else { label };
    format!("Please write a detailed description of an image of {label}.")
}

impl Orchestrator {
    /// Classify `image`, then ask the text generator to describe the label.
    ///
    /// Both steps run under the caller's cancellation only.
    pub async fn describe_image(
        &self,
        image: Option<Bytes>,
        caller: &CancellationToken,
    ) -> ServiceResult<Description> {
        let result = self.describe_inner(image, caller).await;
        if let Err(e) = &result {
            log_failure("describe-image", e);
        }
        result
    }

    async fn describe_inner(
        &self,
        image: Option<Bytes>,
        caller: &CancellationToken,
    ) -> ServiceResult<Description> {
        let image = image
            .filter(|b| !b.is_empty())
            .ok_or_else(|| ServiceError::validation("File is required."))?;

        let classifier = self.registry.classifier().ok_or_else(|| {
            ServiceError::validation(format!(
                "{} Service not available.",
                CapabilityName::ImageClassifier.service_name()
            ))
        })?;
        let generator = self
            .registry
            .generator(CapabilityName::TextGeneration)
            .ok_or_else(|| {
                ServiceError::validation(format!(
                    "{} Service not available.",
                    CapabilityName::TextGeneration.service_name()
                ))
            })?;

        tracing::info!(bytes = image.len(), "Describing image");

        let scope = CancelScope::new(caller.clone());
        let classification = scoped(&scope, classifier.classify(image, scope.token())).await?;
        tracing::debug!(
            label = %classification.label,
            confidence = classification.confidence,
            "Image classified"
        );

        let prompt = build_prompt(&classification.label);
        let text = scoped(&scope, generator.generate(&prompt, scope.token())).await?;

        tracing::info!(label = %classification.label, "Description generated");
        Ok(Description {
            description: non_blank(text),
        })
    }
}
