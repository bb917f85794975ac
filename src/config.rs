use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the summarizer server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Generative backend used to produce summaries.
    pub summarization_provider: SummarizationProvider,
    /// Model identifier passed to the provider.
    pub summarization_model: String,
    /// API key for hosted providers; Ollama runs without one.
    pub summarization_api_key: Option<String>,
    /// Base URL of the provider API.
    pub summarization_base_url: String,
    /// Timeout applied to each provider request, in seconds.
    pub summarization_timeout_secs: u64,
    /// Directory where uploads are staged while a request is processed.
    pub upload_dir: PathBuf,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported summarization backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizationProvider {
    /// Google Gemini `generateContent` API.
    Gemini,
    /// OpenAI-compatible chat completions API.
    OpenAI,
    /// Local Ollama runtime.
    Ollama,
}

impl SummarizationProvider {
    /// Model used when `SUMMARIZATION_MODEL` is not set.
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-flash",
            Self::OpenAI => "gpt-4o-mini",
            Self::Ollama => "llama3.2",
        }
    }

    /// Base URL used when no override is configured.
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::OpenAI => "https://api.openai.com",
            Self::Ollama => "http://127.0.0.1:11434",
        }
    }

    /// Environment variable holding the provider API key, if the provider needs one.
    pub const fn api_key_variable(self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Ollama => None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let summarization_provider = optional("SUMMARIZATION_PROVIDER")
            .map(|value| {
                value
                    .parse()
                    .map_err(|()| ConfigError::InvalidValue("SUMMARIZATION_PROVIDER".into()))
            })
            .transpose()?
            .unwrap_or(SummarizationProvider::Gemini);

        let summarization_api_key = match summarization_provider.api_key_variable() {
            Some(key) => {
                Some(optional(key).ok_or_else(|| ConfigError::MissingVariable(key.into()))?)
            }
            None => None,
        };

        let summarization_base_url = optional("SUMMARIZATION_BASE_URL")
            .or_else(|| {
                (summarization_provider == SummarizationProvider::Ollama)
                    .then(|| optional("OLLAMA_URL"))
                    .flatten()
            })
            .unwrap_or_else(|| summarization_provider.default_base_url().to_string());

        Ok(Self {
            summarization_provider,
            summarization_model: optional("SUMMARIZATION_MODEL")
                .unwrap_or_else(|| summarization_provider.default_model().to_string()),
            summarization_api_key,
            summarization_base_url,
            summarization_timeout_secs: parse_optional(
                optional("SUMMARIZATION_TIMEOUT_SECS"),
                "SUMMARIZATION_TIMEOUT_SECS",
            )?
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
            upload_dir: optional("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            max_upload_bytes: parse_optional(optional("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            server_port: parse_optional(optional("SERVER_PORT"), "SERVER_PORT")?,
        })
    }
}

fn parse_optional<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for SummarizationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        provider = ?config.summarization_provider,
        model = %config.summarization_model,
        base_url = %config.summarization_base_url,
        upload_dir = %config.upload_dir.display(),
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn defaults_to_gemini_with_required_key() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "secret")])).expect("config");

        assert_eq!(config.summarization_provider, SummarizationProvider::Gemini);
        assert_eq!(config.summarization_model, "gemini-1.5-flash");
        assert_eq!(config.summarization_api_key.as_deref(), Some("secret"));
        assert_eq!(
            config.summarization_base_url,
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.summarization_timeout_secs, 60);
        assert_eq!(config.server_port, None);
    }

    #[test]
    fn missing_api_key_is_reported() {
        let error = Config::from_lookup(lookup(&[("SUMMARIZATION_PROVIDER", "openai")]))
            .expect_err("missing key");
        assert_eq!(error, ConfigError::MissingVariable("OPENAI_API_KEY".into()));
    }

    #[test]
    fn ollama_needs_no_key_and_honors_ollama_url() {
        let config = Config::from_lookup(lookup(&[
            ("SUMMARIZATION_PROVIDER", "Ollama"),
            ("OLLAMA_URL", "http://ollama.internal:11434"),
            ("SUMMARIZATION_MODEL", "mistral"),
        ]))
        .expect("config");

        assert_eq!(config.summarization_provider, SummarizationProvider::Ollama);
        assert_eq!(config.summarization_api_key, None);
        assert_eq!(config.summarization_base_url, "http://ollama.internal:11434");
        assert_eq!(config.summarization_model, "mistral");
    }

    #[test]
    fn explicit_base_url_wins_over_ollama_url() {
        let config = Config::from_lookup(lookup(&[
            ("SUMMARIZATION_PROVIDER", "ollama"),
            ("OLLAMA_URL", "http://ignored:11434"),
            ("SUMMARIZATION_BASE_URL", "http://proxy:8080"),
        ]))
        .expect("config");
        assert_eq!(config.summarization_base_url, "http://proxy:8080");
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let error = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "secret"),
            ("SERVER_PORT", "eighty"),
        ]))
        .expect_err("invalid port");
        assert_eq!(error, ConfigError::InvalidValue("SERVER_PORT".into()));

        let error = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "secret"),
            ("MAX_UPLOAD_BYTES", "-1"),
        ]))
        .expect_err("invalid limit");
        assert_eq!(error, ConfigError::InvalidValue("MAX_UPLOAD_BYTES".into()));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let error = Config::from_lookup(lookup(&[("SUMMARIZATION_PROVIDER", "claude")]))
            .expect_err("unknown provider");
        assert_eq!(
            error,
            ConfigError::InvalidValue("SUMMARIZATION_PROVIDER".into())
        );
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "secret"),
            ("UPLOAD_DIR", "   "),
            ("SERVER_PORT", ""),
        ]))
        .expect("config");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.server_port, None);
    }
}
