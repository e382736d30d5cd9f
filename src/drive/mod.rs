//! Google Drive storage access.
//!
//! Provides a trait-based interface over the Drive v3 API so the pipeline can
//! be driven by the real service or by an in-process fake.

mod auth;
mod client;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use client::GoogleDrive;

use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

/// MIME type Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// MIME type of uploaded transcript records.
pub const JSON_MIME_TYPE: &str = "application/json";

static FILE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://drive\.google\.com/file/d/([a-zA-Z0-9_-]+)").expect("valid regex")
});

static OPEN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://drive\.google\.com/open\?id=([a-zA-Z0-9_-]+)").expect("valid regex")
});

static FOLDER_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://drive\.google\.com/drive/(?:u/\d+/)?folders/([a-zA-Z0-9_-]+)")
        .expect("valid regex")
});

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid regex"));

/// Metadata for a file or folder stored in Drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl DriveFile {
    /// Whether this entry is a folder.
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Whether this entry looks like a JSON document.
    pub fn is_json(&self) -> bool {
        self.mime_type == JSON_MIME_TYPE || self.name.to_lowercase().ends_with(".json")
    }

    /// First parent folder, if Drive reported one.
    pub fn parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }
}

/// Operations the pipeline needs from a file-storage service.
#[async_trait]
pub trait DriveClient: Send + Sync {
    /// Fetch name, MIME type and parents for a file.
    async fn file_metadata(&self, file_id: &str) -> Result<DriveFile>;

    /// Stream a file's content into `dest`, returning the number of bytes written.
    async fn download_to(&self, file_id: &str, dest: &Path) -> Result<u64>;

    /// Download a file's content into memory.
    async fn download_bytes(&self, file_id: &str) -> Result<Vec<u8>>;

    /// List the non-trashed children of a folder.
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<DriveFile>>;

    /// Create a file under `parent_id`, returning the new file's ID.
    async fn upload(
        &self,
        parent_id: &str,
        name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> Result<String>;
}

/// Extract a file ID from a Drive share link or a bare ID.
pub fn extract_file_id(input: &str) -> Option<String> {
    let input = input.trim();

    for pattern in [&*FILE_URL, &*OPEN_URL] {
        if let Some(caps) = pattern.captures(input) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
    }

    bare_id(input)
}

/// Extract a folder ID from a Drive folder link or a bare ID.
pub fn extract_folder_id(input: &str) -> Option<String> {
    let input = input.trim();

    if let Some(caps) = FOLDER_URL.captures(input) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    bare_id(input)
}

fn bare_id(input: &str) -> Option<String> {
    BARE_ID.is_match(input).then(|| input.to_string())
}
