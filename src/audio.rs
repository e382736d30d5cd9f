//! Cutting recordings that exceed the speech-to-text upload limit.
//!
//! `ffprobe` reports the duration, `ffmpeg` writes each piece.

use crate::error::{NotewiseError, Result};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// A window of the source recording, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    start: f64,
    length: f64,
}

/// Windows of at most `segment_seconds` covering `[0, total)`. The last one may be shorter.
fn plan_spans(total: f64, segment_seconds: u32) -> Vec<Span> {
    let step = f64::from(segment_seconds.max(1));
    let mut spans = Vec::new();
    let mut start = 0.0;

    while start < total {
        spans.push(Span {
            start,
            length: step.min(total - start),
        });
        start += step;
    }

    spans
}

/// Split `source` into MP3 pieces inside `output_dir`, returned in playback order.
#[instrument(skip_all, fields(source = %source.display()))]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    segment_seconds: u32,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let total = probe_duration(source).await?;
    let spans = plan_spans(total, segment_seconds);
    info!("Splitting {:.1}s of audio into {} pieces", total, spans.len());

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");

    let mut pieces = Vec::with_capacity(spans.len());
    for (idx, span) in spans.into_iter().enumerate() {
        let dest = output_dir.join(format!("{}_{:04}.mp3", stem, idx));
        cut_span(source, &dest, span).await?;
        debug!("Wrote {} ({:.1}s from {:.1}s)", dest.display(), span.length, span.start);
        pieces.push(dest);
    }

    Ok(pieces)
}

/// Write one span to `dest`. MP3 input is copied as is; anything else is re-encoded.
async fn cut_span(source: &Path, dest: &Path, span: Span) -> Result<()> {
    let codec: &[&str] = if is_mp3(source) {
        &["-c", "copy"]
    } else {
        &["-vn", "-codec:a", "libmp3lame", "-qscale:a", "4"]
    };

    let output = Command::new("ffmpeg")
        .args(["-loglevel", "error", "-y"])
        .arg("-ss")
        .arg(format!("{:.3}", span.start))
        .arg("-i")
        .arg(source)
        .arg("-t")
        .arg(format!("{:.3}", span.length))
        .args(codec)
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = tool_output("ffmpeg", output)?;
    if !output.status.success() {
        return Err(NotewiseError::Transcription(format!(
            "ffmpeg could not cut {}: {}",
            source.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(())
}

fn is_mp3(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mp3"))
}

async fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .await;

    let output = tool_output("ffprobe", output)?;
    if !output.status.success() {
        return Err(NotewiseError::Transcription(format!(
            "ffprobe could not read {}",
            path.display()
        )));
    }

    parse_duration(&String::from_utf8_lossy(&output.stdout))
}

/// A missing binary becomes `ToolNotFound`; other spawn failures are transcription errors.
fn tool_output(tool: &str, result: std::io::Result<Output>) -> Result<Output> {
    result.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => NotewiseError::ToolNotFound(tool.to_string()),
        _ => NotewiseError::Transcription(format!("{} failed to start: {}", tool, e)),
    })
}

fn parse_duration(ffprobe_json: &str) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_str(ffprobe_json)
        .map_err(|_| NotewiseError::Transcription("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| *d > 0.0)
        .ok_or_else(|| NotewiseError::Transcription("Could not determine audio duration".into()))
}
