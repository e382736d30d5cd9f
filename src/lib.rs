//! Notewise - Transcribe and summarize notes
//!
//! A CLI tool that reads a text file or transcribes an audio recording, from the
//! local disk or Google Drive, and summarizes it with an OpenAI chat model.
//!
//! # Architecture
//!
//! - `config` - Settings, prompt templates and credential resolution
//! - `source` - Input selection and file classification
//! - `drive` - Google Drive client (service-account auth, download, upload)
//! - `fetch` - Downloads of remote files into scratch space
//! - `audio` - Splitting of oversized recordings with ffmpeg
//! - `transcription` - Speech-to-text
//! - `analysis` - Summarization
//! - `orchestrator` - The single-file pipeline
//! - `folder` - Batch processing of Drive folders
//!
//! # Example
//!
//! ```rust,no_run
//! use notewise::config::{Credentials, Settings};
//! use notewise::orchestrator::Orchestrator;
//! use notewise::source::SourceRef;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let credentials = Credentials::resolve(&settings)?;
//!     let orchestrator = Orchestrator::new(&settings, &credentials)?;
//!
//!     let report = orchestrator.process(&SourceRef::Local("notes.txt".into())).await?;
//!     println!("{}", report.analysis);
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod audio;
pub mod cli;
pub mod config;
pub mod drive;
pub mod error;
pub mod fetch;
pub mod folder;
pub mod openai;
pub mod orchestrator;
pub mod scratch;
pub mod source;
pub mod transcription;

#[cfg(test)]
mod testing;

pub use error::{NotewiseError, Result};
