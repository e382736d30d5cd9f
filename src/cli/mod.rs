//! CLI module for Notewise.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::error::Result;
use crate::source::SourceRef;
use clap::{Parser, ValueEnum};

/// Notewise - Transcribe and summarize notes
///
/// Reads a text file or transcribes an audio recording, from the local disk or
/// Google Drive, and prints a summary of its topics, key points, patterns and tone.
#[derive(Parser, Debug)]
#[command(name = "notewise")]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Local file to analyze (.txt, .mp3, .wav, .m4a)
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file: Option<String>,

    /// Google Drive file ID or share link to analyze
    #[arg(short = 'd', long = "drive-file", value_name = "ID_OR_URL")]
    pub drive_file: Option<String>,

    /// Google Drive folder ID or link; transcribes every new audio file in it
    #[arg(long = "drive-folder", value_name = "ID_OR_URL")]
    pub drive_folder: Option<String>,

    /// Output format for the analysis
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Cli {
    /// The input selected on the command line, if any.
    pub fn source(&self) -> Result<Option<SourceRef>> {
        SourceRef::from_inputs(
            self.file.as_deref(),
            self.drive_file.as_deref(),
            self.drive_folder.as_deref(),
        )
    }
}

/// How the analysis is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// The full report as pretty-printed JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotewiseError;
    use std::path::PathBuf;
    use tokio_test::assert_err;

    #[test]
    fn test_parse_local_file() {
        let cli = Cli::try_parse_from(["notewise", "-f", "notes.txt"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(
            cli.source().unwrap(),
            Some(SourceRef::Local(PathBuf::from("notes.txt")))
        );
    }

    #[test]
    fn test_parse_drive_file_with_json() {
        let cli = Cli::try_parse_from([
            "notewise",
            "--drive-file",
            "https://drive.google.com/file/d/abc123/view",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(
            cli.source().unwrap(),
            Some(SourceRef::Remote("https://drive.google.com/file/d/abc123/view".to_string()))
        );
    }

    #[test]
    fn test_both_inputs_is_config_error() {
        let cli = Cli::try_parse_from(["notewise", "-f", "a.txt", "-d", "abc"]).unwrap();
        let err = assert_err!(cli.source());
        assert!(matches!(err, NotewiseError::Config(_)));
    }

    #[test]
    fn test_flags_without_input() {
        let cli = Cli::try_parse_from(["notewise", "-v"]).unwrap();
        assert_eq!(cli.source().unwrap(), None);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["notewise", "-f", "a.txt", "--format", "xml"]).is_err());
    }
}
