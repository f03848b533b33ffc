use url::Url;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Subjects are set and distinct
/// - Generation service base URL, model and timeout are usable
/// - Pipeline concurrency is at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.bus.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "bus.url cannot be empty".to_string(),
        ));
    }

    if config.bus.raw_subject.trim().is_empty() || config.bus.enriched_subject.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "bus subjects cannot be empty".to_string(),
        ));
    }

    // Publishing into the subject we consume would loop forever.
    if config.bus.raw_subject == config.bus.enriched_subject {
        return Err(ConfigError::ValidationError(format!(
            "bus.raw_subject and bus.enriched_subject must differ (both are '{}')",
            config.bus.raw_subject
        )));
    }

    let api_base_ok = Url::parse(&config.llm.api_base)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false);
    if !api_base_ok {
        return Err(ConfigError::ValidationError(format!(
            "llm.api_base must be an http(s) URL, got '{}'",
            config.llm.api_base
        )));
    }

    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "llm.model cannot be empty".to_string(),
        ));
    }

    if config.llm.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "llm.timeout_secs must be greater than 0".to_string(),
        ));
    }

    if config.pipeline.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.max_concurrent must be at least 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(config: &Config) {
        let result = validate_config(config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_same_subjects_fails() {
        let mut config = Config::default();
        config.bus.enriched_subject = config.bus.raw_subject.clone();
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_empty_subject_fails() {
        let mut config = Config::default();
        config.bus.raw_subject = "  ".to_string();
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_bad_api_base_fails() {
        let mut config = Config::default();
        config.llm.api_base = "localhost:11434".to_string();
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_api_base_without_host_fails() {
        for api_base in ["http://", "https://:bad", "ftp://gpu-box:11434", "not a url"] {
            let mut config = Config::default();
            config.llm.api_base = api_base.to_string();
            assert_invalid(&config);
        }
    }

    #[test]
    fn test_validate_https_api_base_passes() {
        let mut config = Config::default();
        config.llm.api_base = "https://gpu-box.internal:11434".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let mut config = Config::default();
        config.pipeline.max_concurrent = 0;
        assert_invalid(&config);
    }
}
