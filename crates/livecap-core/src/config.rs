use crate::error::ConfigError;
use crate::types::RecognitionSettings;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub recognition: RecognitionConfig,

    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecognitionConfig {
    #[serde(default = "default_language_codes")]
    pub language_codes: Vec<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_sample_rate")]
    pub sample_rate_hertz: u32,

    #[serde(default = "default_channel_count")]
    pub audio_channel_count: u16,

    #[serde(default = "default_max_alternatives")]
    pub max_alternatives: u32,

    #[serde(default = "default_true")]
    pub interim_results: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language_codes: default_language_codes(),
            model: default_model(),
            sample_rate_hertz: default_sample_rate(),
            audio_channel_count: default_channel_count(),
            max_alternatives: default_max_alternatives(),
            interim_results: default_true(),
        }
    }
}

impl RecognitionConfig {
    pub fn settings(&self) -> RecognitionSettings {
        RecognitionSettings {
            sample_rate_hertz: self.sample_rate_hertz,
            audio_channel_count: self.audio_channel_count,
            model: self.model.clone(),
            language_codes: self.language_codes.clone(),
            max_alternatives: self.max_alternatives,
            interim_results: self.interim_results,
        }
    }
}

/// What the audio pump does when a chunk send fails: keep going (the
/// historical behavior) or abort the session after too many consecutive
/// failures.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SendFailurePolicy {
    Continue,
    Abort,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_chunk_bytes")]
    pub chunk_bytes: usize,

    #[serde(default = "default_send_failure_policy")]
    pub send_failure_policy: SendFailurePolicy,

    #[serde(default = "default_max_consecutive_send_failures")]
    pub max_consecutive_send_failures: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            chunk_bytes: default_chunk_bytes(),
            send_failure_policy: default_send_failure_policy(),
            max_consecutive_send_failures: default_max_consecutive_send_failures(),
        }
    }
}

impl StreamConfig {
    pub fn pump_policy(&self) -> PumpPolicy {
        PumpPolicy {
            chunk_bytes: self.chunk_bytes,
            send_failure: self.send_failure_policy,
            max_consecutive_send_failures: self.max_consecutive_send_failures,
        }
    }
}

/// Runtime policy handed to the audio pump.
#[derive(Debug, Clone, Copy)]
pub struct PumpPolicy {
    pub chunk_bytes: usize,
    pub send_failure: SendFailurePolicy,
    pub max_consecutive_send_failures: u32,
}

impl Default for PumpPolicy {
    fn default() -> Self {
        StreamConfig::default().pump_policy()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// Pre-acquired OAuth bearer token, typically `"${GOOGLE_ACCESS_TOKEN}"`.
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_language_codes() -> Vec<String> {
    vec!["en-US".to_string()]
}

fn default_model() -> String {
    "long".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_channel_count() -> u16 {
    1
}

fn default_max_alternatives() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    "https://speech.googleapis.com".to_string()
}

fn default_chunk_bytes() -> usize {
    1024
}

fn default_send_failure_policy() -> SendFailurePolicy {
    SendFailurePolicy::Continue
}

fn default_max_consecutive_send_failures() -> u32 {
    5
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();
    let mut result = input.to_string();
    let mut errors = Vec::new();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(val) => {
                result = result.replace(&cap[0], &val);
            }
            Err(_) => {
                errors.push(var_name.to_string());
            }
        }
    }

    if let Some(first_missing) = errors.into_iter().next() {
        return Err(ConfigError::EnvVarNotFound(first_missing));
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let interpolated = interpolate_env_vars(&content)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string (for testing).
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parse_valid_toml() {
        let toml_str = r#"
[general]
log_level = "debug"

[recognition]
language_codes = ["en-US", "de-DE"]
model = "short"
sample_rate_hertz = 8000
audio_channel_count = 2
max_alternatives = 3
interim_results = false

[stream]
endpoint = "https://eu-speech.googleapis.com"
chunk_bytes = 4096
send_failure_policy = "abort"
max_consecutive_send_failures = 3
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.recognition.language_codes, vec!["en-US", "de-DE"]);
        assert_eq!(config.recognition.model, "short");
        assert_eq!(config.recognition.sample_rate_hertz, 8000);
        assert_eq!(config.recognition.audio_channel_count, 2);
        assert_eq!(config.recognition.max_alternatives, 3);
        assert!(!config.recognition.interim_results);
        assert_eq!(config.stream.endpoint, "https://eu-speech.googleapis.com");
        assert_eq!(config.stream.chunk_bytes, 4096);
        assert_eq!(config.stream.send_failure_policy, SendFailurePolicy::Abort);
        assert_eq!(config.stream.max_consecutive_send_failures, 3);
    }

    #[test]
    fn test_config_default_values() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.recognition.language_codes, vec!["en-US"]);
        assert_eq!(config.recognition.model, "long");
        assert_eq!(config.recognition.sample_rate_hertz, 16000);
        assert_eq!(config.recognition.audio_channel_count, 1);
        assert_eq!(config.recognition.max_alternatives, 2);
        assert!(config.recognition.interim_results);
        assert_eq!(config.stream.endpoint, "https://speech.googleapis.com");
        assert_eq!(config.stream.chunk_bytes, 1024);
        assert_eq!(
            config.stream.send_failure_policy,
            SendFailurePolicy::Continue,
        );
        assert_eq!(config.stream.max_consecutive_send_failures, 5);
        assert!(config.auth.access_token.is_none());
    }

    #[test]
    fn test_config_default_matches_empty_toml() {
        let parsed = AppConfig::from_toml_str("").unwrap();
        let defaulted = AppConfig::default();
        assert_eq!(parsed.general.log_level, defaulted.general.log_level);
        assert_eq!(parsed.stream.chunk_bytes, defaulted.stream.chunk_bytes);
        assert_eq!(
            parsed.recognition.language_codes,
            defaulted.recognition.language_codes,
        );
    }

    #[test]
    fn test_config_env_var_interpolation() {
        std::env::set_var("LIVECAP_TEST_TOKEN", "secret123");
        let toml_str = r#"
[auth]
access_token = "${LIVECAP_TEST_TOKEN}"
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.auth.access_token.as_deref(), Some("secret123"));
        std::env::remove_var("LIVECAP_TEST_TOKEN");
    }

    #[test]
    fn test_config_missing_env_var_error() {
        let toml_str = r#"
[auth]
access_token = "${DEFINITELY_DOES_NOT_EXIST_12345}"
"#;
        let result = AppConfig::from_toml_str(toml_str);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("DEFINITELY_DOES_NOT_EXIST_12345"));
    }

    #[test]
    fn test_config_invalid_toml_error() {
        let toml_str = "this is not valid toml [[[";
        let result = AppConfig::from_toml_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_invalid_policy_rejected() {
        let toml_str = r#"
[stream]
send_failure_policy = "retry_forever"
"#;
        let result = AppConfig::from_toml_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = std::env::temp_dir().join("livecap_test_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.toml");
        std::fs::write(
            &path,
            r#"
[general]
log_level = "warn"

[recognition]
model = "short"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.recognition.model, "short");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_config_load_from_file_not_found() {
        let result = AppConfig::load_from_file(std::path::Path::new("/nonexistent/path.toml"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("failed to read config file"),
        );
    }

    #[test]
    fn test_config_pump_policy_from_stream_section() {
        let toml_str = r#"
[stream]
chunk_bytes = 2048
send_failure_policy = "abort"
max_consecutive_send_failures = 2
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        let policy = config.stream.pump_policy();
        assert_eq!(policy.chunk_bytes, 2048);
        assert_eq!(policy.send_failure, SendFailurePolicy::Abort);
        assert_eq!(policy.max_consecutive_send_failures, 2);
    }

    #[test]
    fn test_config_recognition_settings_conversion() {
        let config = AppConfig::from_toml_str("").unwrap();
        let settings = config.recognition.settings();
        assert_eq!(settings.sample_rate_hertz, 16000);
        assert_eq!(settings.model, "long");
        assert!(settings.interim_results);
    }
}
