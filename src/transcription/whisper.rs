//! OpenAI Whisper transcription implementation.

use super::Transcriber;
use crate::audio::split_audio;
use crate::config::TranscriptionSettings;
use crate::error::{NotewiseError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{AudioInput, CreateTranscriptionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
    language: Option<String>,
    max_upload_bytes: u64,
    segment_seconds: u32,
    scratch_dir: PathBuf,
}

impl WhisperTranscriber {
    /// Create a transcriber from settings. Oversized files are segmented
    /// inside `scratch_dir`.
    pub fn with_config(
        client: Client<OpenAIConfig>,
        settings: &TranscriptionSettings,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            client,
            model: settings.model.clone(),
            language: settings.language.clone(),
            max_upload_bytes: settings.max_upload_bytes,
            segment_seconds: settings.segment_seconds,
            scratch_dir,
        }
    }

    /// Send one file to the API.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, audio_path: &Path) -> Result<String> {
        let file_bytes = tokio::fs::read(audio_path).await?;
        debug!("Uploading {} bytes", file_bytes.len());

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| NotewiseError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| NotewiseError::Transcription(format!("Whisper API error: {}", e)))?;

        Ok(response.text.trim().to_string())
    }

    /// Split an oversized file and transcribe the segments in order.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_segmented(&self, audio_path: &Path) -> Result<String> {
        std::fs::create_dir_all(&self.scratch_dir)?;
        let segment_dir = tempfile::Builder::new()
            .prefix("segments_")
            .tempdir_in(&self.scratch_dir)?;

        let segments = split_audio(audio_path, segment_dir.path(), self.segment_seconds).await?;
        info!("Transcribing {} segments with {}", segments.len(), self.model);

        let mut parts = Vec::with_capacity(segments.len());
        for (idx, segment) in segments.iter().enumerate() {
            let text = self.transcribe_single(segment).await.map_err(|e| {
                NotewiseError::Transcription(format!("Segment {} failed: {}", idx, e))
            })?;
            parts.push(text);
        }

        Ok(join_segments(&parts))
    }
}

/// How a file of a given size is sent to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UploadPlan {
    /// One request with the whole file.
    Whole,
    /// Split with ffmpeg, one request per segment.
    Segmented,
}

fn upload_plan(size: u64, max_upload_bytes: u64) -> UploadPlan {
    if size > max_upload_bytes {
        UploadPlan::Segmented
    } else {
        UploadPlan::Whole
    }
}

fn require_text(text: String) -> Result<String> {
    if text.trim().is_empty() {
        return Err(NotewiseError::Transcription(
            "Transcription returned an empty result".to_string(),
        ));
    }
    Ok(text)
}

fn join_segments(parts: &[String]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let size = tokio::fs::metadata(audio_path).await?.len();
        info!(
            "Processing audio file: {} ({:.2}MB)",
            audio_path.display(),
            size as f64 / 1024.0 / 1024.0
        );

        let text = match upload_plan(size, self.max_upload_bytes) {
            UploadPlan::Whole => self.transcribe_single(audio_path).await?,
            UploadPlan::Segmented => self.transcribe_segmented(audio_path).await?,
        };

        require_text(text)
    }
}
