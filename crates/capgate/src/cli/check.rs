//! The `capgate check` command: report which backends are usable.

use capgate_core::adapter::{Generator, OllamaGenerator, TesseractRecognizer, TextRecognizer};
use capgate_core::{CapabilityName, Config};

/// One line of the availability report.
#[derive(Debug)]
struct Status {
    capability: CapabilityName,
    available: bool,
    detail: String,
}

/// Probe every configured backend and print the results.
pub async fn execute(config: &Config) -> anyhow::Result<()> {
    let report = probe(config).await;

    for status in &report {
        let mark = if status.available { "ok" } else { "unavailable" };
        println!("{:<16} {:<12} {}", status.capability.as_str(), mark, status.detail);
    }

    let missing = report.iter().filter(|s| !s.available).count();
    if missing > 0 {
        tracing::warn!("{missing} backend(s) unavailable");
    }
    Ok(())
}

async fn probe(config: &Config) -> Vec<Status> {
    let model_path = config.classifier_model_path();
    let labels_path = config.classifier_labels_path();
    let classifier = Status {
        capability: CapabilityName::ImageClassifier,
        available: model_path.exists() && labels_path.exists(),
        detail: format!("model {} / labels {}", model_path.display(), labels_path.display()),
    };

    let generation = OllamaGenerator::new(
        CapabilityName::TextGeneration.as_str(),
        &config.generation.endpoint,
        &config.generation.model,
    );
    let agent = OllamaGenerator::new(
        CapabilityName::Agent.as_str(),
        &config.agent.endpoint,
        &config.agent.model,
    );
    let ocr = TesseractRecognizer::new(&config.ocr, config.tessdata_dir());

    vec![
        classifier,
        Status {
            capability: CapabilityName::TextGeneration,
            available: generation.is_available().await,
            detail: format!("{} at {}", generation.model(), config.generation.endpoint),
        },
        Status {
            capability: CapabilityName::Agent,
            available: agent.is_available().await,
            detail: format!("{} at {}", agent.model(), config.agent.endpoint),
        },
        Status {
            capability: CapabilityName::Ocr,
            available: ocr.is_available().await,
            detail: format!("{} ({})", config.ocr.binary, config.ocr.languages),
        },
    ]
}
