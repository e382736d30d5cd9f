//! Startup credential resolution.
//!
//! Both credentials are required before any pipeline work begins. A missing
//! or unreadable credential is a configuration error, never a runtime one.

use super::Settings;
use crate::drive::ServiceAccountKey;
use crate::error::{NotewiseError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the service-account key path.
pub const SERVICE_ACCOUNT_FILE_ENV: &str = "NOTEWISE_SERVICE_ACCOUNT_FILE";

/// Credentials for the three external services.
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub service_account: ServiceAccountKey,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("service_account", &self.service_account.client_email)
            .finish()
    }
}

impl Credentials {
    /// Resolve credentials from the process environment and settings.
    pub fn resolve(settings: &Settings) -> Result<Self> {
        let env_key = std::env::var(OPENAI_API_KEY_ENV).ok();
        let key_path = service_account_path(settings);

        Self::resolve_from(env_key, settings.openai.api_key.clone(), &key_path)
    }

    /// Resolve credentials from explicit sources. The environment key wins
    /// over the configured one.
    pub fn resolve_from(
        env_key: Option<String>,
        configured_key: Option<String>,
        service_account_path: &Path,
    ) -> Result<Self> {
        let openai_api_key = env_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| configured_key.filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                NotewiseError::Config(format!(
                    "{} not set. Set it with: export {}='sk-...'",
                    OPENAI_API_KEY_ENV, OPENAI_API_KEY_ENV
                ))
            })?;

        let service_account = load_service_account(service_account_path)?;
        debug!(
            "Using service account {} from {}",
            service_account.client_email,
            service_account_path.display()
        );

        Ok(Self {
            openai_api_key,
            service_account,
        })
    }
}

fn load_service_account(path: &Path) -> Result<ServiceAccountKey> {
    if !path.exists() {
        return Err(NotewiseError::Config(format!(
            "Service account key not found at {}. Set {} or drive.service_account_file.",
            path.display(),
            SERVICE_ACCOUNT_FILE_ENV
        )));
    }

    let content = std::fs::read_to_string(path)?;
    ServiceAccountKey::from_json(&content).map_err(|e| {
        NotewiseError::Config(format!(
            "Invalid service account key {}: {}",
            path.display(),
            e
        ))
    })
}

/// Path of the service-account key that `resolve` would read.
pub fn service_account_path(settings: &Settings) -> PathBuf {
    std::env::var(SERVICE_ACCOUNT_FILE_ENV)
        .ok()
        .filter(|p| !p.is_empty())
        .map(|p| Settings::expand_path(&p))
        .unwrap_or_else(|| settings.service_account_file())
}
