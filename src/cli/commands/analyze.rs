//! Analyze command implementation.

use crate::cli::{preflight, Output, OutputFormat};
use crate::config::Settings;
use crate::orchestrator::{AnalysisReport, Orchestrator};
use crate::source::SourceRef;
use anyhow::Result;

/// Run the pipeline on a single local or Drive file and print the analysis.
pub async fn run_analyze(
    source: &SourceRef,
    format: OutputFormat,
    settings: Settings,
) -> Result<()> {
    let credentials = match preflight::check(&settings) {
        Ok(c) => c,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    let orchestrator = Orchestrator::new(&settings, &credentials)?;

    let spinner = Output::spinner(&format!("Analyzing {}...", source));

    match orchestrator.process(source).await {
        Ok(report) => {
            spinner.finish_and_clear();
            Output::success(&format!("Analyzed {} ({})", report.file_name, report.kind));
            println!("{}", render_report(&report, format)?);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

/// Format a report for stdout.
pub fn render_report(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format!("\nAnalysis for {}:\n{}", report.file_name, report.analysis),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileKind;

    fn report(transcript: Option<&str>) -> AnalysisReport {
        AnalysisReport {
            file_name: "standup.mp3".to_string(),
            kind: FileKind::Audio,
            transcript: transcript.map(str::to_string),
            analysis: "Topics: budget".to_string(),
        }
    }

    #[test]
    fn test_render_text() {
        let text = render_report(&report(Some("raw words")), OutputFormat::Text).unwrap();
        assert_eq!(text, "\nAnalysis for standup.mp3:\nTopics: budget");
    }

    #[test]
    fn test_render_json() {
        let json = render_report(&report(Some("raw words")), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["file_name"], "standup.mp3");
        assert_eq!(value["kind"], "audio");
        assert_eq!(value["transcript"], "raw words");
        assert_eq!(value["analysis"], "Topics: budget");
    }

    #[test]
    fn test_render_json_omits_missing_transcript() {
        let json = render_report(&report(None), OutputFormat::Json).unwrap();
        assert!(!json.contains("transcript"));
    }
}
