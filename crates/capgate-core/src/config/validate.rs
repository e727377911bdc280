//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be > 0".into(),
            ));
        }
        if self.server.max_upload_mb == 0 {
            return Err(ConfigError::ValidationError(
                "server.max_upload_mb must be > 0".into(),
            ));
        }
        if self.limits.dispatch_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.dispatch_timeout_ms must be > 0".into(),
            ));
        }
        if self.classifier.image_size == 0 {
            return Err(ConfigError::ValidationError(
                "classifier.image_size must be > 0".into(),
            ));
        }
        for (section, endpoint) in [
            ("generation", &self.generation.endpoint),
            ("agent", &self.agent.endpoint),
        ] {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "{section}.endpoint must be an http(s) URL, got {endpoint:?}"
                )));
            }
        }
        if self.ocr.languages.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "ocr.languages must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.dispatch_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dispatch_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_zero_image_size() {
        let mut config = Config::default();
        config.classifier.image_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("classifier.image_size"));
    }

    #[test]
    fn test_validate_rejects_non_http_endpoint() {
        let mut config = Config::default();
        config.agent.endpoint = "localhost:11434".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("agent.endpoint"));
    }

    #[test]
    fn test_validate_rejects_blank_languages() {
        let mut config = Config::default();
        config.ocr.languages = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ocr.languages"));
    }
}
