//! Pre-flight checks before any remote call is made.
//!
//! Both credentials are resolved up front, and the scratch directory must be
//! writable, so a misconfigured run fails before it downloads or uploads anything.

use crate::config::{Credentials, Settings};
use crate::error::{NotewiseError, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Run pre-flight checks and return the resolved credentials.
pub fn check(settings: &Settings) -> Result<Credentials> {
    let credentials = Credentials::resolve(settings)?;
    check_scratch_dir(&settings.temp_dir())?;

    if !tool_available("ffmpeg") {
        debug!("ffmpeg not found; audio over the upload limit cannot be split");
    }

    Ok(credentials)
}

/// Check that the scratch directory exists (creating it if needed) and is writable.
fn check_scratch_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        NotewiseError::Config(format!(
            "Cannot create temp directory {}: {}",
            dir.display(),
            e
        ))
    })?;

    tempfile::tempfile_in(dir).map_err(|e| {
        NotewiseError::Config(format!(
            "Temp directory {} is not writable: {}",
            dir.display(),
            e
        ))
    })?;

    Ok(())
}

/// Whether an external tool can be run.
fn tool_available(name: &str) -> bool {
    matches!(
        Command::new(name).arg("-version").output(),
        Ok(output) if output.status.success()
    )
}
