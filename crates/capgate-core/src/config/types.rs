//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allow any origin, method and header (permissive CORS)
    pub enable_cors: bool,

    /// Maximum multipart request body size in megabytes
    pub max_upload_mb: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            enable_cors: true,
            max_upload_mb: 64,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Request limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Ceiling for dispatch-routed adapter calls, in milliseconds
    pub dispatch_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            dispatch_timeout_ms: 60_000,
        }
    }
}

/// Image classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Path to the ONNX classification model
    pub model_path: PathBuf,

    /// Path to the label table, one label per line in output-index order
    pub labels_path: PathBuf,

    /// Square input resolution expected by the model
    pub image_size: u32,

    /// Input tensor name; detected from model metadata when empty
    pub input_name: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("Models/resnet50-v2-7.onnx"),
            labels_path: PathBuf::from("Models/imagenet_labels.txt"),
            image_size: 224,
            input_name: String::new(),
        }
    }
}

/// Text generation backend settings (Ollama-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Backend API endpoint
    pub endpoint: String,

    /// Backend model identifier
    pub model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama2".to_string(),
        }
    }
}

/// Agent backend settings (Ollama-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Backend API endpoint
    pub endpoint: String,

    /// Backend model identifier
    pub model: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "phi3".to_string(),
        }
    }
}

/// OCR engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable (name on PATH or absolute path)
    pub binary: String,

    /// Directory holding the `.traineddata` files
    pub tessdata_dir: PathBuf,

    /// Tesseract languages joined with `+`, e.g. "eng+chi_tra"
    pub languages: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            tessdata_dir: PathBuf::from("./tessdata"),
            languages: "eng+chi_tra".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
