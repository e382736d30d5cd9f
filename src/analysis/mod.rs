//! Summarization of text content through a language model.

mod chat;

pub use chat::ChatAnalyzer;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for summarization services.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Produce a summary (topics, key points, patterns, tone) of `content`.
    async fn analyze(&self, content: &str) -> Result<String>;
}
