//! Configuration management for the career mentor
//!
//! Tunables live in a TOML file; service credentials come from the
//! environment (a `.env` file is honoured) and are validated up front.

use crate::error::{CareerMentorError, Result};
use crate::processing::role_matcher::RoleCatalog;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const AZURE_OPENAI_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const AZURE_OPENAI_KEY: &str = "AZURE_OPENAI_KEY";
pub const AZURE_OPENAI_VERSION: &str = "AZURE_OPENAI_VERSION";
pub const AZURE_OPENAI_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";
pub const FORM_RECOGNIZER_ENDPOINT: &str = "FORM_RECOGNIZER_ENDPOINT";
pub const FORM_RECOGNIZER_KEY: &str = "FORM_RECOGNIZER_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub catalog: RoleCatalog,
    pub llm: LlmSettings,
    pub extraction: ExtractionSettings,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    pub extraction_temperature: f64,
    pub extraction_max_tokens: u32,
    pub recommendation_temperature: f64,
    pub request_timeout_secs: u64,
    /// Resume characters sent to the model; longer text is cut.
    pub max_resume_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSettings {
    pub model_id: String,
    pub api_version: String,
    pub poll_interval_ms: u64,
    pub max_polls: u32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
    Pdf,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Console => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            extraction_temperature: 0.3,
            extraction_max_tokens: 500,
            recommendation_temperature: 0.3,
            request_timeout_secs: 120,
            max_resume_chars: 12_000,
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            model_id: "prebuilt-document".to_string(),
            api_version: "2023-07-31".to_string(),
            poll_interval_ms: 1000,
            max_polls: 120,
            request_timeout_secs: 60,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: RoleCatalog::default(),
            llm: LlmSettings::default(),
            extraction: ExtractionSettings::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
                output_dir: None,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| CareerMentorError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CareerMentorError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("career-mentor")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.catalog.is_empty() {
            return Err(CareerMentorError::Configuration("role catalog is empty".to_string()));
        }
        if let Some(role) = self.catalog.iter().find(|r| r.name.trim().is_empty()) {
            return Err(CareerMentorError::Configuration(format!(
                "role with skills {:?} has no name",
                role.skills
            )));
        }
        if self.extraction.max_polls == 0 {
            return Err(CareerMentorError::Configuration("extraction.max_polls must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AzureOpenAiCredentials {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub deployment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentServiceCredentials {
    pub endpoint: String,
    pub api_key: String,
}

/// Credentials for the external services, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCredentials {
    pub openai: AzureOpenAiCredentials,
    /// Absent when documents are read locally.
    pub document: Option<DocumentServiceCredentials>,
}

impl ServiceCredentials {
    /// Read credentials from the process environment after loading `.env`.
    pub fn from_env(require_document_service: bool) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(require_document_service, |key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`; blank values count as missing.
    pub fn from_lookup<F>(require_document_service: bool, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| CareerMentorError::ConfigurationMissing(key.to_string()))
        };

        let openai = AzureOpenAiCredentials {
            endpoint: require(AZURE_OPENAI_ENDPOINT)?,
            api_key: require(AZURE_OPENAI_KEY)?,
            api_version: require(AZURE_OPENAI_VERSION)?,
            deployment: require(AZURE_OPENAI_DEPLOYMENT)?,
        };

        let document = if require_document_service {
            Some(DocumentServiceCredentials {
                endpoint: require(FORM_RECOGNIZER_ENDPOINT)?,
                api_key: require(FORM_RECOGNIZER_KEY)?,
            })
        } else {
            None
        };

        Ok(Self { openai, document })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (AZURE_OPENAI_ENDPOINT, "https://mentor.openai.azure.com"),
            (AZURE_OPENAI_KEY, "secret"),
            (AZURE_OPENAI_VERSION, "2024-02-01"),
            (AZURE_OPENAI_DEPLOYMENT, "gpt-4o"),
            (FORM_RECOGNIZER_ENDPOINT, "https://mentor.cognitiveservices.azure.com"),
            (FORM_RECOGNIZER_KEY, "doc-secret"),
        ])
    }

    #[test]
    fn test_credentials_from_complete_environment() {
        let env = full_env();
        let creds = ServiceCredentials::from_lookup(true, |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(creds.openai.deployment, "gpt-4o");
        assert_eq!(creds.document.map(|d| d.api_key).as_deref(), Some("doc-secret"));
    }

    #[test]
    fn test_missing_key_is_named() {
        let mut env = full_env();
        env.remove(AZURE_OPENAI_VERSION);

        let err = ServiceCredentials::from_lookup(true, |k| env.get(k).map(|v| v.to_string())).unwrap_err();

        match err {
            CareerMentorError::ConfigurationMissing(key) => assert_eq!(key, AZURE_OPENAI_VERSION),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut env = full_env();
        env.insert(FORM_RECOGNIZER_KEY, "   ");

        let err = ServiceCredentials::from_lookup(true, |k| env.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, CareerMentorError::ConfigurationMissing(ref k) if k == FORM_RECOGNIZER_KEY));
    }

    #[test]
    fn test_document_service_optional_for_local_extraction() {
        let mut env = full_env();
        env.remove(FORM_RECOGNIZER_ENDPOINT);
        env.remove(FORM_RECOGNIZER_KEY);

        let creds = ServiceCredentials::from_lookup(false, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert!(creds.document.is_none());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::default();
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_custom_catalog_from_toml() {
        let mut content = toml::to_string_pretty(&Config::default()).unwrap();
        content = content.replace("Data Analyst", "Business Analyst");

        let config = Config::from_toml(&content).unwrap();
        assert!(config.catalog.get("Business Analyst").is_some());
        assert!(config.catalog.get("Data Analyst").is_none());
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let err = Config::from_toml("catalog = 3").unwrap_err();
        assert!(matches!(err, CareerMentorError::Configuration(_)));
    }
}
