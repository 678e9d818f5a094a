//! HAVEN configuration, loaded from TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HavenConfig {
    pub model: ModelConfig,
    pub conversation: ConversationConfig,
    pub fallback: FallbackConfig,
    pub sessions: SessionsConfig,
}

/// Settings passed to the completion backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Number of past exchanges replayed to the model.
    pub history_window: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self { history_window: 10 }
    }
}

/// In-character lines used when classification fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// The reply parsed but carried no response text.
    pub missing_response: String,
    /// The reply was not valid JSON.
    pub parse_error: String,
    /// The backend could not be reached or returned an error.
    pub backend_error: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            missing_response: "I... cannot process that request.".to_string(),
            parse_error: "I am experiencing a processing error. Please rephrase.".to_string(),
            backend_error: "Systems nominal. Please repeat your query, Resident.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionsConfig {
    /// Upper bound on live sessions; unbounded when absent.
    pub max_sessions: Option<usize>,
}

impl HavenConfig {
    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: HavenConfig = toml::from_str(content)?;
        validate_config(&config)?;
        Ok(config)
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<HavenConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    HavenConfig::from_toml_str(&content)
}

fn validate_config(config: &HavenConfig) -> Result<(), ConfigError> {
    if config.model.name.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "model.name must not be empty".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&config.model.temperature) {
        return Err(ConfigError::Invalid(format!(
            "model.temperature must be within 0.0..=2.0, got {}",
            config.model.temperature
        )));
    }

    if config.model.max_tokens == 0 {
        return Err(ConfigError::Invalid(
            "model.max_tokens must be > 0".to_string(),
        ));
    }

    if config.conversation.history_window == 0 {
        return Err(ConfigError::Invalid(
            "conversation.history_window must be > 0".to_string(),
        ));
    }

    let fallbacks = [
        ("fallback.missing_response", &config.fallback.missing_response),
        ("fallback.parse_error", &config.fallback.parse_error),
        ("fallback.backend_error", &config.fallback.backend_error),
    ];
    for (key, line) in fallbacks {
        if line.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{key} must not be empty")));
        }
    }

    if config.sessions.max_sessions == Some(0) {
        return Err(ConfigError::Invalid(
            "sessions.max_sessions must be > 0 when set".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = HavenConfig::from_toml_str("").unwrap();
        assert_eq!(config, HavenConfig::default());
        assert_eq!(config.model.name, "gpt-4o-mini");
        assert_eq!(config.model.max_tokens, 500);
        assert_eq!(config.conversation.history_window, 10);
        assert!(config.sessions.max_sessions.is_none());
    }

    #[test]
    fn test_partial_override() {
        let config = HavenConfig::from_toml_str(
            r#"
            [model]
            temperature = 0.2

            [sessions]
            max_sessions = 64
            "#,
        )
        .unwrap();

        assert_eq!(config.model.temperature, 0.2);
        assert_eq!(config.model.name, "gpt-4o-mini");
        assert_eq!(config.sessions.max_sessions, Some(64));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            "[model]\nname = \"  \"",
            "[model]\ntemperature = 3.5",
            "[model]\nmax_tokens = 0",
            "[conversation]\nhistory_window = 0",
            "[fallback]\nparse_error = \"\"",
            "[sessions]\nmax_sessions = 0",
        ];

        for case in cases {
            let result = HavenConfig::from_toml_str(case);
            assert!(
                matches!(result, Err(ConfigError::Invalid(_))),
                "expected rejection for {case:?}"
            );
        }
    }

    #[test]
    fn test_malformed_toml() {
        let result = HavenConfig::from_toml_str("[model\nname = 1");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_bundled_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("haven.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config, HavenConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Path::new("/definitely/not/here/haven.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
