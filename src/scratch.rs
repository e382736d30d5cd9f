//! Scratch copies of remote files.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A file on local scratch storage owned by a single pipeline run.
///
/// The file is removed when the guard is dropped, so it cannot outlive the
/// run that created it on any exit path.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Take ownership of `path`. Nothing is created on disk.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Cleaned up scratch file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove scratch file {}: {}", self.path.display(), e),
        }
    }
}
