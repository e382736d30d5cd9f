//! Input resolution.
//!
//! Decides whether the target is a local path or a remote identifier and
//! classifies files as text or audio by extension.

use crate::error::{NotewiseError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Recognized text file extensions.
pub const TEXT_EXTENSIONS: &[&str] = &["txt"];

/// Recognized audio file extensions.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a"];

/// Kind of content a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Text,
    Audio,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Text => write!(f, "text"),
            FileKind::Audio => write!(f, "audio"),
        }
    }
}

/// Where the input lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// A path on the local filesystem.
    Local(PathBuf),
    /// A Drive file ID or share link.
    Remote(String),
    /// A Drive folder ID or link, processed file by file.
    RemoteFolder(String),
}

impl SourceRef {
    /// Build a source reference from the mutually exclusive CLI inputs.
    ///
    /// Returns `Ok(None)` when no input was given.
    pub fn from_inputs(
        file: Option<&str>,
        drive_file: Option<&str>,
        drive_folder: Option<&str>,
    ) -> Result<Option<Self>> {
        let given = [file.is_some(), drive_file.is_some(), drive_folder.is_some()]
            .iter()
            .filter(|g| **g)
            .count();

        if given > 1 {
            return Err(NotewiseError::Config(
                "--file, --drive-file and --drive-folder are mutually exclusive".to_string(),
            ));
        }

        Ok(match (file, drive_file, drive_folder) {
            (Some(path), _, _) => Some(SourceRef::Local(PathBuf::from(path))),
            (_, Some(id), _) => Some(SourceRef::Remote(id.to_string())),
            (_, _, Some(id)) => Some(SourceRef::RemoteFolder(id.to_string())),
            _ => None,
        })
    }
}

impl std::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceRef::Local(path) => write!(f, "{}", path.display()),
            SourceRef::Remote(id) => write!(f, "drive file {}", id),
            SourceRef::RemoteFolder(id) => write!(f, "drive folder {}", id),
        }
    }
}

/// Classify a file by the extension of its path or name.
pub fn classify(name: impl AsRef<Path>) -> Result<FileKind> {
    let name = name.as_ref();
    let ext = name
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match ext.as_deref() {
        Some(ext) if TEXT_EXTENSIONS.contains(&ext) => Ok(FileKind::Text),
        Some(ext) if AUDIO_EXTENSIONS.contains(&ext) => Ok(FileKind::Audio),
        _ => Err(NotewiseError::UnsupportedFileType(
            name.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| name.display().to_string()),
        )),
    }
}

/// Whether a name carries a recognized audio extension.
pub fn is_audio(name: impl AsRef<Path>) -> bool {
    matches!(classify(name), Ok(FileKind::Audio))
}
