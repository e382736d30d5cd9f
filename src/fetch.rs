//! Fetching remote files into scratch storage.

use crate::drive::{extract_file_id, DriveClient, DriveFile};
use crate::error::{NotewiseError, Result};
use crate::scratch::ScratchFile;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Downloads Drive files into a scratch directory.
pub struct Fetcher {
    drive: Arc<dyn DriveClient>,
    scratch_dir: PathBuf,
}

impl Fetcher {
    pub fn new(drive: Arc<dyn DriveClient>, scratch_dir: PathBuf) -> Self {
        Self { drive, scratch_dir }
    }

    /// Parse a remote identifier and look up the file's metadata.
    #[instrument(skip(self))]
    pub async fn lookup(&self, input: &str) -> Result<DriveFile> {
        let file_id = extract_file_id(input).ok_or_else(|| {
            NotewiseError::Download(format!("Could not extract a Drive file ID from: {}", input))
        })?;

        self.drive.file_metadata(&file_id).await.map_err(as_download)
    }

    /// Download `file` to `<scratch_dir>/<id><ext>`.
    ///
    /// The returned guard owns the file. If the download fails, any partial
    /// file is removed before the error is returned.
    #[instrument(skip(self, file), fields(file_id = %file.id, name = %file.name))]
    pub async fn fetch(&self, file: &DriveFile) -> Result<ScratchFile> {
        tokio::fs::create_dir_all(&self.scratch_dir).await.map_err(|e| {
            NotewiseError::Download(format!(
                "Cannot create scratch directory {}: {}",
                self.scratch_dir.display(),
                e
            ))
        })?;

        let scratch = ScratchFile::new(self.scratch_path(file));

        self.drive
            .download_to(&file.id, scratch.path())
            .await
            .map_err(as_download)?;

        info!("Downloaded file to: {}", scratch.path().display());
        Ok(scratch)
    }

    fn scratch_path(&self, file: &DriveFile) -> PathBuf {
        let ext = Path::new(&file.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        self.scratch_dir.join(format!("{}{}", file.id, ext))
    }
}

/// Everything that goes wrong while fetching surfaces as a download failure.
fn as_download(err: NotewiseError) -> NotewiseError {
    match err {
        NotewiseError::Download(_) => err,
        other => NotewiseError::Download(other.to_string()),
    }
}
