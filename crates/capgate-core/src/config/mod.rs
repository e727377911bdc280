//! Configuration management for capgate.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`, so a missing file or a
//! partial file both produce a runnable gateway.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for capgate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Request limits
    pub limits: LimitsConfig,

    /// Image classifier settings
    pub classifier: ClassifierConfig,

    /// Text generation backend settings
    pub generation: GenerationConfig,

    /// Agent backend settings
    pub agent: AgentConfig,

    /// OCR engine settings
    pub ocr: OcrConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.capgate.capgate/config.toml
    /// - Linux: ~/.config/capgate/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\capgate\config\config.toml
    ///
    /// Falls back to ~/.capgate/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "capgate", "capgate")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".capgate").join("config.toml")
            })
    }

    /// Get the resolved classifier model path (with ~ expansion).
    pub fn classifier_model_path(&self) -> PathBuf {
        expand(&self.classifier.model_path)
    }

    /// Get the resolved classifier labels path (with ~ expansion).
    pub fn classifier_labels_path(&self) -> PathBuf {
        expand(&self.classifier.labels_path)
    }

    /// Get the resolved tessdata directory (with ~ expansion).
    pub fn tessdata_dir(&self) -> PathBuf {
        expand(&self.ocr.tessdata_dir)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.limits.dispatch_timeout_ms, 60_000);
        assert_eq!(config.classifier.image_size, 224);
        assert_eq!(config.generation.model, "llama2");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[limits]"));
        assert!(toml.contains("[agent]"));
    }

    #[test]
    fn test_generation_and_agent_models_are_independent() {
        let config = Config::from_toml("[generation]\nmodel = \"mistral\"\n").unwrap();
        assert_eq!(config.generation.model, "mistral");
        assert_eq!(config.agent.model, "phi3");

        let config = Config::from_toml("[agent]\nendpoint = \"http://gpu-box:11434\"\n").unwrap();
        assert_eq!(config.agent.model, "phi3");
        assert_eq!(config.generation.endpoint, "http://localhost:11434");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::from_toml("[server]\nport = 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.server.enable_cors);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[limits]\ndispatch_timeout_ms = 1500\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.limits.dispatch_timeout_ms, 1500);
    }

    #[test]
    fn test_load_from_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_tilde_expansion() {
        let mut config = Config::default();
        config.classifier.model_path = PathBuf::from("~/models/resnet.onnx");
        let resolved = config.classifier_model_path();
        assert!(!resolved.to_string_lossy().starts_with('~'));
    }
}
