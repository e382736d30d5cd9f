//! In-process fakes for the external services, shared by unit tests.

use crate::analysis::Analyzer;
use crate::drive::{DriveClient, DriveFile, FOLDER_MIME_TYPE};
use crate::error::{NotewiseError, Result};
use crate::transcription::Transcriber;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A file created through `DriveClient::upload`.
#[derive(Debug, Clone)]
pub struct Uploaded {
    pub parent_id: String,
    pub name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

/// Ordered log of every external call made by the fakes.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
    uploads: Arc<Mutex<Vec<Uploaded>>>,
}

impl Recorder {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn uploads(&self) -> Vec<Uploaded> {
        self.uploads.lock().unwrap().clone()
    }
}

/// Drive fake backed by a map of file ID to metadata and content.
pub struct FakeDrive {
    recorder: Recorder,
    files: HashMap<String, (DriveFile, Vec<u8>)>,
    fail_downloads: bool,
    unlistable: Vec<String>,
}

impl FakeDrive {
    pub fn new(recorder: Recorder) -> Self {
        Self {
            recorder,
            files: HashMap::new(),
            fail_downloads: false,
            unlistable: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: DriveFile, content: &[u8]) -> Self {
        self.files.insert(file.id.clone(), (file, content.to_vec()));
        self
    }

    pub fn with_folder(self, id: &str, name: &str, parent: Option<&str>) -> Self {
        let folder = DriveFile {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: FOLDER_MIME_TYPE.to_string(),
            parents: parent.map(|p| vec![p.to_string()]).unwrap_or_default(),
        };
        self.with_file(folder, b"")
    }

    /// Downloads write part of the content, then fail.
    pub fn failing_downloads(mut self) -> Self {
        self.fail_downloads = true;
        self
    }

    /// Listing `folder_id` fails with an access error.
    pub fn failing_list(mut self, folder_id: &str) -> Self {
        self.unlistable.push(folder_id.to_string());
        self
    }

    fn content(&self, file_id: &str) -> Result<&[u8]> {
        self.files
            .get(file_id)
            .map(|(_, content)| content.as_slice())
            .ok_or_else(|| NotewiseError::Download(format!("no such file: {}", file_id)))
    }
}

/// Build a `DriveFile` with a MIME type guessed from the name.
pub fn drive_file(id: &str, name: &str, parent: &str) -> DriveFile {
    let mime_type = if name.ends_with(".json") {
        "application/json"
    } else if name.ends_with(".txt") {
        "text/plain"
    } else {
        "audio/mpeg"
    };

    DriveFile {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: mime_type.to_string(),
        parents: vec![parent.to_string()],
    }
}

#[async_trait]
impl DriveClient for FakeDrive {
    async fn file_metadata(&self, file_id: &str) -> Result<DriveFile> {
        self.recorder.record(format!("drive.metadata:{}", file_id));
        self.files
            .get(file_id)
            .map(|(file, _)| file.clone())
            .ok_or_else(|| NotewiseError::Download(format!("no such file: {}", file_id)))
    }

    async fn download_to(&self, file_id: &str, dest: &Path) -> Result<u64> {
        self.recorder.record(format!("drive.download:{}", file_id));
        let content = self.content(file_id)?;

        if self.fail_downloads {
            std::fs::write(dest, &content[..content.len() / 2])?;
            return Err(NotewiseError::Download("connection reset".to_string()));
        }

        std::fs::write(dest, content)?;
        Ok(content.len() as u64)
    }

    async fn download_bytes(&self, file_id: &str) -> Result<Vec<u8>> {
        self.recorder.record(format!("drive.download_bytes:{}", file_id));
        self.content(file_id).map(<[u8]>::to_vec)
    }

    async fn list_folder(&self, folder_id: &str) -> Result<Vec<DriveFile>> {
        self.recorder.record(format!("drive.list:{}", folder_id));
        if self.unlistable.iter().any(|id| id == folder_id) {
            return Err(NotewiseError::Download("403 access denied".to_string()));
        }
        let mut children: Vec<DriveFile> = self
            .files
            .values()
            .filter(|(f, _)| f.parents.iter().any(|p| p == folder_id))
            .map(|(f, _)| f.clone())
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn upload(
        &self,
        parent_id: &str,
        name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> Result<String> {
        self.recorder.record(format!("drive.upload:{}", name));
        let mut uploads = self.recorder.uploads.lock().unwrap();
        uploads.push(Uploaded {
            parent_id: parent_id.to_string(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            content,
        });
        Ok(format!("uploaded-{}", uploads.len()))
    }
}

/// Transcriber fake returning a fixed transcript.
pub struct FakeTranscriber {
    recorder: Recorder,
    transcript: Option<String>,
}

impl FakeTranscriber {
    pub fn new(recorder: Recorder, transcript: &str) -> Self {
        Self {
            recorder,
            transcript: Some(transcript.to_string()),
        }
    }

    pub fn failing(recorder: Recorder) -> Self {
        Self {
            recorder,
            transcript: None,
        }
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.recorder.record(format!("transcribe:{}", name));

        if !audio_path.exists() {
            return Err(NotewiseError::Transcription(format!("{} missing", name)));
        }

        self.transcript
            .clone()
            .ok_or_else(|| NotewiseError::Transcription("quota exceeded".to_string()))
    }
}

/// Analyzer fake echoing its input.
pub struct FakeAnalyzer {
    recorder: Recorder,
    fail: bool,
}

impl FakeAnalyzer {
    pub fn new(recorder: Recorder) -> Self {
        Self {
            recorder,
            fail: false,
        }
    }

    pub fn failing(recorder: Recorder) -> Self {
        Self {
            recorder,
            fail: true,
        }
    }
}

#[async_trait]
impl Analyzer for FakeAnalyzer {
    async fn analyze(&self, content: &str) -> Result<String> {
        self.recorder.record(format!("analyze:{}", content));

        if self.fail {
            return Err(NotewiseError::Analysis("model overloaded".to_string()));
        }

        Ok(format!("Summary of: {}", content))
    }
}
