//! Pipeline orchestrator for Notewise.
//!
//! Runs one input through resolve, fetch and analyze, strictly in that order.

use crate::analysis::{Analyzer, ChatAnalyzer};
use crate::config::{Credentials, Prompts, Settings};
use crate::drive::{DriveClient, DriveFile, GoogleDrive};
use crate::error::{NotewiseError, Result};
use crate::fetch::Fetcher;
use crate::openai::create_client;
use crate::source::{classify, FileKind, SourceRef};
use crate::transcription::{Transcriber, WhisperTranscriber};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Outcome of analyzing one file.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Name of the analyzed file.
    pub file_name: String,
    /// Whether the file was read as text or transcribed.
    pub kind: FileKind,
    /// Transcript text, for audio inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    /// Summary returned by the language model.
    pub analysis: String,
}

/// The main orchestrator for the Notewise pipeline.
pub struct Orchestrator {
    drive: Arc<dyn DriveClient>,
    fetcher: Fetcher,
    transcriber: Arc<dyn Transcriber>,
    analyzer: Arc<dyn Analyzer>,
}

impl Orchestrator {
    /// Create an orchestrator backed by Google Drive and OpenAI.
    pub fn new(settings: &Settings, credentials: &Credentials) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let client = create_client(
            &credentials.openai_api_key,
            Duration::from_secs(settings.openai.timeout_seconds),
        )?;

        let scratch_dir = settings.temp_dir();

        let transcriber = Arc::new(WhisperTranscriber::with_config(
            client.clone(),
            &settings.transcription,
            scratch_dir.clone(),
        ));
        let analyzer =
            Arc::new(ChatAnalyzer::with_config(client, &settings.analysis).with_prompts(prompts));
        let drive = Arc::new(GoogleDrive::new(
            credentials.service_account.clone(),
            &settings.drive,
        )?);

        Ok(Self::with_components(drive, transcriber, analyzer, scratch_dir))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        drive: Arc<dyn DriveClient>,
        transcriber: Arc<dyn Transcriber>,
        analyzer: Arc<dyn Analyzer>,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            fetcher: Fetcher::new(drive.clone(), scratch_dir),
            drive,
            transcriber,
            analyzer,
        }
    }

    /// Get a handle to the storage client.
    pub fn drive(&self) -> Arc<dyn DriveClient> {
        self.drive.clone()
    }

    /// Process a single local or remote file.
    pub async fn process(&self, source: &SourceRef) -> Result<AnalysisReport> {
        match source {
            SourceRef::Local(path) => self.process_local(path).await,
            SourceRef::Remote(input) => self.process_remote(input).await,
            SourceRef::RemoteFolder(_) => Err(NotewiseError::Config(
                "Folders are processed with FolderProcessor".to_string(),
            )),
        }
    }

    /// Analyze a file on the local filesystem. No storage calls are made.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn process_local(&self, path: &Path) -> Result<AnalysisReport> {
        if !path.is_file() {
            return Err(NotewiseError::FileNotFound(path.display().to_string()));
        }

        let kind = classify(path)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        self.analyze(path, kind, &file_name).await
    }

    /// Analyze a Drive file given its ID or share link.
    #[instrument(skip(self))]
    pub async fn process_remote(&self, input: &str) -> Result<AnalysisReport> {
        let file = self.fetcher.lookup(input).await?;
        info!("Resolved {} to {} ({})", input, file.name, file.id);
        self.process_drive_file(&file).await
    }

    /// Download and analyze a Drive file whose metadata is already known.
    ///
    /// The scratch copy is removed before this returns, whatever the outcome.
    #[instrument(skip(self, file), fields(file_id = %file.id, name = %file.name))]
    pub async fn process_drive_file(&self, file: &DriveFile) -> Result<AnalysisReport> {
        let kind = classify(&file.name)?;

        info!("Downloading {}", file.name);
        let scratch = self.fetcher.fetch(file).await?;

        self.analyze(scratch.path(), kind, &file.name).await
    }

    async fn analyze(
        &self,
        path: &Path,
        kind: FileKind,
        file_name: &str,
    ) -> Result<AnalysisReport> {
        let (content, transcript) = match kind {
            FileKind::Text => (tokio::fs::read_to_string(path).await?, None),
            FileKind::Audio => {
                info!("Transcribing audio file: {}", file_name);
                let text = self
                    .transcriber
                    .transcribe(path)
                    .await
                    .map_err(as_transcription)?;
                debug!("Transcript has {} characters", text.len());
                (text.clone(), Some(text))
            }
        };

        info!("Analyzing content from: {}", file_name);
        let analysis = self.analyzer.analyze(&content).await.map_err(as_analysis)?;

        Ok(AnalysisReport {
            file_name: file_name.to_string(),
            kind,
            transcript,
            analysis,
        })
    }
}

fn as_transcription(err: NotewiseError) -> NotewiseError {
    match err {
        NotewiseError::Transcription(_) | NotewiseError::ToolNotFound(_) => err,
        other => NotewiseError::Transcription(other.to_string()),
    }
}

fn as_analysis(err: NotewiseError) -> NotewiseError {
    match err {
        NotewiseError::Analysis(_) => err,
        other => NotewiseError::Analysis(other.to_string()),
    }
}
