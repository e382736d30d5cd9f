//! Configuration module for Notewise.
//!
//! Handles loading application settings, prompt templates and credentials.

mod credentials;
mod prompts;
mod settings;

pub use credentials::{
    service_account_path, Credentials, OPENAI_API_KEY_ENV, SERVICE_ACCOUNT_FILE_ENV,
};
pub use prompts::{AnalysisPrompts, Prompts};
pub use settings::{
    AnalysisSettings, DriveSettings, GeneralSettings, OpenAiSettings, PromptSettings, Settings,
    TranscriptionSettings,
};
