//! Batch processing of audio files in a Drive folder tree.
//!
//! Every audio file without an existing transcript record is transcribed,
//! summarized, and a `<stem><suffix>.json` record is uploaded next to it.

use crate::drive::{DriveClient, DriveFile, JSON_MIME_TYPE};
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use crate::source::is_audio;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// JSON document uploaded for each processed audio file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub original_file: String,
    pub transcription: String,
    pub analysis: String,
}

/// Counts reported at the end of a folder run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FolderSummary {
    /// Files transcribed, analyzed and uploaded.
    pub processed: usize,
    /// Files that already had a transcript record.
    pub skipped: usize,
    /// Files whose processing or upload failed.
    pub failed: usize,
}

/// Walks a Drive folder tree and runs the pipeline on each new audio file.
pub struct FolderProcessor<'a> {
    orchestrator: &'a Orchestrator,
    drive: Arc<dyn DriveClient>,
    transcript_suffix: String,
}

impl<'a> FolderProcessor<'a> {
    pub fn new(orchestrator: &'a Orchestrator, transcript_suffix: &str) -> Self {
        Self {
            drive: orchestrator.drive(),
            orchestrator,
            transcript_suffix: transcript_suffix.to_string(),
        }
    }

    /// Process `folder_id` and all of its subfolders.
    #[instrument(skip(self))]
    pub async fn process(&self, folder_id: &str) -> Result<FolderSummary> {
        let mut summary = FolderSummary::default();
        self.process_folder(folder_id.to_string(), 0, &mut summary).await?;
        info!(
            "Folder run complete: {} processed, {} skipped, {} failed",
            summary.processed, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    fn process_folder<'b>(
        &'b self,
        folder_id: String,
        depth: usize,
        summary: &'b mut FolderSummary,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + 'b>> {
        Box::pin(async move {
            let indent = "  ".repeat(depth);
            let folder_name = match self.drive.file_metadata(&folder_id).await {
                Ok(meta) => meta.name,
                Err(e) => {
                    warn!("Could not read folder name for {}: {}", folder_id, e);
                    format!("Folder {}", folder_id)
                }
            };

            let children = match self.drive.list_folder(&folder_id).await {
                Ok(children) => children,
                Err(e) if depth > 0 => {
                    warn!("Could not list folder {}: {}", folder_id, e);
                    println!(
                        "{}[FOLDER] {} (ID: {}) could not be listed: {}",
                        indent, folder_name, folder_id, e
                    );
                    return Ok(());
                }
                Err(e) => return Err(e),
            };
            println!("{}[FOLDER] {} (ID: {})", indent, folder_name, folder_id);

            let (subfolders, files): (Vec<DriveFile>, Vec<DriveFile>) =
                children.into_iter().partition(DriveFile::is_folder);
            let audio_files: Vec<&DriveFile> = files.iter().filter(|f| is_audio(&f.name)).collect();

            for file in &audio_files {
                println!("{}  [AUDIO] {} (ID: {})", indent, file.name, file.id);
            }

            for subfolder in subfolders {
                let result = self
                    .process_folder(subfolder.id.clone(), depth + 1, summary)
                    .await;
                if let Err(e) = result {
                    warn!("Skipping folder {}: {}", subfolder.name, e);
                }
            }

            if audio_files.is_empty() {
                println!("{}  No audio files found in folder: {}", indent, folder_name);
                return Ok(());
            }

            let processed = self.processed_originals(&files).await;
            println!(
                "{}  Processing {} audio files in folder: {}",
                indent,
                audio_files.len(),
                folder_name
            );

            for file in audio_files {
                if processed.contains(&file.name) {
                    println!("{}  Found existing transcription for {}", indent, file.name);
                    summary.skipped += 1;
                    continue;
                }

                println!("{}  Processing file: {}", indent, file.name);
                match self.process_file(file, &folder_id).await {
                    Ok(name) => {
                        println!("{}  Completed processing: {} -> {}", indent, file.name, name);
                        summary.processed += 1;
                    }
                    Err(e) => {
                        warn!("Failed to process {}: {}", file.name, e);
                        println!("{}  Failed to process file: {} ({})", indent, file.name, e);
                        summary.failed += 1;
                    }
                }
            }

            Ok(())
        })
    }

    /// Names of originals that already have a transcript record among `files`.
    async fn processed_originals(&self, files: &[DriveFile]) -> HashSet<String> {
        let mut originals = HashSet::new();

        for file in files.iter().filter(|f| f.is_json()) {
            let bytes = match self.drive.download_bytes(&file.id).await {
                Ok(b) => b,
                Err(e) => {
                    warn!("Error reading JSON file {}: {}", file.name, e);
                    continue;
                }
            };

            match serde_json::from_slice::<serde_json::Value>(&bytes) {
                Ok(value) => {
                    if let Some(original) = value["original_file"].as_str() {
                        debug!("{} already transcribed in {}", original, file.name);
                        originals.insert(original.to_string());
                    }
                }
                Err(e) => warn!("Error reading JSON file {}: {}", file.name, e),
            }
        }

        originals
    }

    async fn process_file(&self, file: &DriveFile, folder_id: &str) -> Result<String> {
        let report = self.orchestrator.process_drive_file(file).await?;

        let record = TranscriptRecord {
            original_file: file.name.clone(),
            transcription: report.transcript.unwrap_or_default(),
            analysis: report.analysis,
        };
        let name = record_name(&file.name, &self.transcript_suffix);
        let parent = file.parent().unwrap_or(folder_id);

        self.drive
            .upload(parent, &name, JSON_MIME_TYPE, serde_json::to_vec_pretty(&record)?)
            .await?;

        Ok(name)
    }
}

/// `Team Call.mp3` with suffix `_TRANSCRIPT` becomes `Team Call_TRANSCRIPT.json`.
pub fn record_name(original: &str, suffix: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| original.to_string());
    format!("{}{}.json", stem, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotewiseError;
    use crate::testing::{drive_file, FakeAnalyzer, FakeDrive, FakeTranscriber, Recorder};

    fn orchestrator(drive: FakeDrive, recorder: &Recorder, scratch: &Path) -> Orchestrator {
        Orchestrator::with_components(
            Arc::new(drive),
            Arc::new(FakeTranscriber::new(recorder.clone(), "transcript text")),
            Arc::new(FakeAnalyzer::new(recorder.clone())),
            scratch.to_path_buf(),
        )
    }

    #[test]
    fn test_record_name() {
        assert_eq!(record_name("Team Call.mp3", "_TRANSCRIPT"), "Team Call_TRANSCRIPT.json");
        assert_eq!(record_name("a.b.wav", "_T"), "a.b_T.json");
    }

    #[tokio::test]
    async fn test_processes_new_audio_and_uploads_record() {
        let recorder = Recorder::default();
        let scratch = tempfile::tempdir().unwrap();
        let drive = FakeDrive::new(recorder.clone())
            .with_folder("root", "Calls", None)
            .with_file(drive_file("a1", "monday.mp3", "root"), b"audio")
            .with_file(drive_file("n1", "notes.txt", "root"), b"ignored");
        let orch = orchestrator(drive, &recorder, scratch.path());

        let summary = FolderProcessor::new(&orch, "_TRANSCRIPT").process("root").await.unwrap();

        assert_eq!(summary, FolderSummary { processed: 1, skipped: 0, failed: 0 });

        let uploads = recorder.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].parent_id, "root");
        assert_eq!(uploads[0].name, "monday_TRANSCRIPT.json");
        assert_eq!(uploads[0].mime_type, "application/json");

        let record: TranscriptRecord = serde_json::from_slice(&uploads[0].content).unwrap();
        assert_eq!(record.original_file, "monday.mp3");
        assert_eq!(record.transcription, "transcript text");
        assert_eq!(record.analysis, "Summary of: transcript text");

        assert!(recorder.calls_with_prefix("drive.download:n1").is_empty());
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_skips_already_processed() {
        let recorder = Recorder::default();
        let scratch = tempfile::tempdir().unwrap();
        let record = serde_json::to_vec(&TranscriptRecord {
            original_file: "monday.mp3".to_string(),
            transcription: "t".to_string(),
            analysis: "a".to_string(),
        })
        .unwrap();
        let drive = FakeDrive::new(recorder.clone())
            .with_folder("root", "Calls", None)
            .with_file(drive_file("a1", "monday.mp3", "root"), b"audio")
            .with_file(drive_file("a2", "tuesday.wav", "root"), b"audio")
            .with_file(drive_file("j1", "monday_TRANSCRIPT.json", "root"), &record)
            .with_file(drive_file("j2", "broken.json", "root"), b"{not json");
        let orch = orchestrator(drive, &recorder, scratch.path());

        let summary = FolderProcessor::new(&orch, "_TRANSCRIPT").process("root").await.unwrap();

        assert_eq!(summary, FolderSummary { processed: 1, skipped: 1, failed: 0 });
        assert!(recorder.calls_with_prefix("drive.download:a1").is_empty());
        let uploads = recorder.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].name, "tuesday_TRANSCRIPT.json");
    }

    #[tokio::test]
    async fn test_recurses_into_subfolders_first() {
        let recorder = Recorder::default();
        let scratch = tempfile::tempdir().unwrap();
        let drive = FakeDrive::new(recorder.clone())
            .with_folder("root", "Calls", None)
            .with_folder("sub", "March", Some("root"))
            .with_file(drive_file("a1", "top.mp3", "root"), b"audio")
            .with_file(drive_file("a2", "nested.m4a", "sub"), b"audio");
        let orch = orchestrator(drive, &recorder, scratch.path());

        let summary = FolderProcessor::new(&orch, "_TRANSCRIPT").process("root").await.unwrap();

        assert_eq!(summary.processed, 2);
        let names: Vec<String> = recorder
            .uploads()
            .into_iter()
            .map(|u| u.parent_id + "/" + &u.name)
            .collect();
        assert_eq!(names, vec!["sub/nested_TRANSCRIPT.json", "root/top_TRANSCRIPT.json"]);
    }

    #[tokio::test]
    async fn test_failed_file_does_not_stop_run() {
        let recorder = Recorder::default();
        let scratch = tempfile::tempdir().unwrap();
        let drive = FakeDrive::new(recorder.clone())
            .with_folder("root", "Calls", None)
            .with_file(drive_file("a1", "one.mp3", "root"), b"audio")
            .with_file(drive_file("a2", "two.mp3", "root"), b"audio")
            .failing_downloads();
        let orch = orchestrator(drive, &recorder, scratch.path());

        let summary = FolderProcessor::new(&orch, "_TRANSCRIPT").process("root").await.unwrap();

        assert_eq!(summary, FolderSummary { processed: 0, skipped: 0, failed: 2 });
        assert!(recorder.uploads().is_empty());
        assert!(recorder.calls_with_prefix("analyze:").is_empty());
    }

    #[tokio::test]
    async fn test_unlistable_subfolder_does_not_stop_run() {
        let recorder = Recorder::default();
        let scratch = tempfile::tempdir().unwrap();
        let drive = FakeDrive::new(recorder.clone())
            .with_folder("root", "Calls", None)
            .with_folder("locked", "A-Private", Some("root"))
            .with_folder("open", "B-Open", Some("root"))
            .with_file(drive_file("a1", "top.mp3", "root"), b"audio")
            .with_file(drive_file("a2", "nested.mp3", "open"), b"audio")
            .failing_list("locked");
        let orch = orchestrator(drive, &recorder, scratch.path());

        let summary = FolderProcessor::new(&orch, "_TRANSCRIPT")
            .process("root")
            .await
            .unwrap();

        assert_eq!(summary, FolderSummary { processed: 2, skipped: 0, failed: 0 });
        let names: Vec<String> = recorder.uploads().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["nested_TRANSCRIPT.json", "top_TRANSCRIPT.json"]);
    }

    #[tokio::test]
    async fn test_unlistable_root_fails() {
        let recorder = Recorder::default();
        let scratch = tempfile::tempdir().unwrap();
        let drive = FakeDrive::new(recorder.clone())
            .with_folder("root", "Calls", None)
            .failing_list("root");
        let orch = orchestrator(drive, &recorder, scratch.path());

        let result = FolderProcessor::new(&orch, "_TRANSCRIPT").process("root").await;
        assert!(matches!(result, Err(NotewiseError::Download(_))));
    }

    #[tokio::test]
    async fn test_empty_folder() {
        let recorder = Recorder::default();
        let scratch = tempfile::tempdir().unwrap();
        let orch = orchestrator(FakeDrive::new(recorder.clone()), &recorder, scratch.path());

        let summary = FolderProcessor::new(&orch, "_TRANSCRIPT").process("nowhere").await.unwrap();
        assert_eq!(summary, FolderSummary::default());
    }
}
