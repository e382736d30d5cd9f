//! Folder command implementation.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::drive::extract_folder_id;
use crate::folder::FolderProcessor;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Transcribe and summarize every new audio file under a Drive folder.
pub async fn run_folder(input: &str, settings: Settings) -> Result<()> {
    let credentials = match preflight::check(&settings) {
        Ok(c) => c,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    let Some(folder_id) = extract_folder_id(input) else {
        Output::error(&format!("Invalid Google Drive folder link or ID: {}", input));
        return Err(anyhow::anyhow!("Invalid Google Drive folder link or ID: {}", input));
    };

    let orchestrator = Orchestrator::new(&settings, &credentials)?;
    let processor = FolderProcessor::new(&orchestrator, &settings.drive.transcript_suffix);

    Output::info(&format!("Processing folder {}", folder_id));
    let summary = match processor.process(&folder_id).await {
        Ok(s) => s,
        Err(e) => {
            Output::error(&format!("Folder processing failed: {}", e));
            return Err(e.into());
        }
    };

    Output::header("Summary");
    Output::kv("Processed", &summary.processed.to_string());
    Output::kv("Skipped", &summary.skipped.to_string());
    Output::kv("Failed", &summary.failed.to_string());

    if summary.failed > 0 {
        Output::warning("Some files could not be processed. Run with -v for details.");
        anyhow::bail!("{} file(s) failed", summary.failed);
    }

    Output::success("Folder processed");
    Ok(())
}
