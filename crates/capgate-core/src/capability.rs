//! The closed set of AI capabilities the gateway knows about.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A supported AI operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityName {
    /// Image bytes in, label + confidence out
    ImageClassifier,
    /// Prompt in, generated text out
    TextGeneration,
    /// Prompt in, agent answer out
    Agent,
    /// Image bytes in, extracted text out (dedicated route only)
    Ocr,
}

impl CapabilityName {
    /// Capabilities reachable through name-based dispatch.
    pub const DISPATCHABLE: [CapabilityName; 3] = [
        CapabilityName::ImageClassifier,
        CapabilityName::TextGeneration,
        CapabilityName::Agent,
    ];

    /// Canonical lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityName::ImageClassifier => "imageclassifier",
            CapabilityName::TextGeneration => "textgeneration",
            CapabilityName::Agent => "agent",
            CapabilityName::Ocr => "ocr",
        }
    }

    /// Whether this capability participates in name-based dispatch.
    pub fn is_dispatchable(&self) -> bool {
        !matches!(self, CapabilityName::Ocr)
    }

    /// Human-readable service name used in "not available" messages.
    pub fn service_name(&self) -> &'static str {
        match self {
            CapabilityName::ImageClassifier => "ImageClassifier",
            CapabilityName::TextGeneration => "TextGeneration",
            CapabilityName::Agent => "Agent",
            CapabilityName::Ocr => "Ocr",
        }
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The input did not name a known capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown capability: {0:?}")]
pub struct UnknownCapability(pub String);

impl FromStr for CapabilityName {
    type Err = UnknownCapability;

    /// Parse a capability name (case-insensitive, surrounding whitespace ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "imageclassifier" => Ok(CapabilityName::ImageClassifier),
            "textgeneration" => Ok(CapabilityName::TextGeneration),
            "agent" => Ok(CapabilityName::Agent),
            "ocr" => Ok(CapabilityName::Ocr),
            _ => Err(UnknownCapability(s.to_string())),
        }
    }
}
