//! Core data types flowing through the orchestration layer.
//!
//! Every value here lives for a single request/response cycle and is never
//! mutated after construction.

use bytes::Bytes;
use serde::Serialize;

/// Rendered in place of empty or absent text content.
pub const EMPTY_PLACEHOLDER: &str = "(empty)";

/// Rendered in place of a missing batch label.
pub const UNKNOWN_LABEL: &str = "(unknown)";

/// Top-1 output of the image classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Label from the classifier's label table
    pub label: String,

    /// Probability of the label, 0.0 to 1.0
    pub confidence: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Output of a dispatched adapter call.
///
/// Serializes as `{label, confidence}` for classifications and as a bare JSON
/// string for text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProcessingResult {
    Label(Classification),
    Text(String),
}

impl ProcessingResult {
    /// Short description for log lines.
    pub fn summary(&self) -> String {
        match self {
            ProcessingResult::Label(c) => format!("label={} confidence={:.4}", c.label, c.confidence),
            ProcessingResult::Text(text) => format!("text ({} chars)", text.chars().count()),
        }
    }
}

/// Input handed to a dispatched adapter.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Raw uploaded bytes (images)
    Blob(Bytes),
    /// Text prompt
    Prompt(String),
}

impl Payload {
    /// Name of the payload kind, used in mismatch messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Blob(_) => "file",
            Payload::Prompt(_) => "prompt",
        }
    }
}

/// A named upload, e.g. one file of a batch.
#[derive(Debug, Clone)]
pub struct UploadedItem {
    /// Client-supplied file name
    pub name: String,
    /// File content
    pub bytes: Bytes,
}

impl UploadedItem {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// One entry of a batch classification result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    /// Source file name
    pub file: String,
    /// Top-1 label, or [`UNKNOWN_LABEL`]
    pub label: String,
}

/// Result of the describe-image composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Description {
    pub description: String,
}

/// Result of an agent question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub answer: String,
}

/// Result of OCR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recognized {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serializes_as_object() {
        let result = ProcessingResult::Label(Classification::new("tabby cat", 0.5));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["label"], "tabby cat");
        assert_eq!(json["confidence"], 0.5);
    }

    #[test]
    fn test_text_serializes_as_string() {
        let result = ProcessingResult::Text("hello".to_string());
        assert_eq!(serde_json::to_string(&result).unwrap(), "\"hello\"");
    }

    #[test]
    fn test_summary() {
        let label = ProcessingResult::Label(Classification::new("cat", 0.25));
        assert_eq!(label.summary(), "label=cat confidence=0.2500");
        let text = ProcessingResult::Text("héllo".to_string());
        assert_eq!(text.summary(), "text (5 chars)");
    }
}
