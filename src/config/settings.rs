//! Configuration settings for Notewise.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub openai: OpenAiSettings,
    pub transcription: TranscriptionSettings,
    pub analysis: AnalysisSettings,
    pub drive: DriveSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for scratch copies of downloaded files.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/notewise".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// OpenAI API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    /// API key. `OPENAI_API_KEY` takes precedence when set.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout_seconds: 300,
        }
    }
}

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Transcription model.
    pub model: String,
    /// Optional ISO-639-1 language hint.
    pub language: Option<String>,
    /// Largest file the API accepts in one upload.
    pub max_upload_bytes: u64,
    /// Segment length used when a file exceeds `max_upload_bytes`.
    pub segment_seconds: u32,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            language: None,
            max_upload_bytes: 25 * 1024 * 1024,
            segment_seconds: 300,
        }
    }
}

/// Summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Chat model used for the summary.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on completion tokens.
    pub max_tokens: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Google Drive settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveSettings {
    /// Path to the service-account JSON key.
    /// `NOTEWISE_SERVICE_ACCOUNT_FILE` takes precedence when set.
    pub service_account_file: String,
    /// OAuth scopes requested for the service account.
    pub scopes: Vec<String>,
    /// Drive request timeout in seconds.
    pub timeout_seconds: u64,
    /// Suffix appended to the file stem of uploaded transcript records.
    pub transcript_suffix: String,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            service_account_file: "service-account.json".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/drive".to_string()],
            timeout_seconds: 120,
            transcript_suffix: "_TRANSCRIPT".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else if path.is_some() {
            Err(crate::error::NotewiseError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )))
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notewise")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded scratch directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded service-account key path from the config file.
    pub fn service_account_file(&self) -> PathBuf {
        Self::expand_path(&self.drive.service_account_file)
    }
}
