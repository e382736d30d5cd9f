//! Drive v3 REST client.

use super::{DriveClient, DriveFile, ServiceAccountKey, TokenProvider};
use crate::config::DriveSettings;
use crate::error::{NotewiseError, Result};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};
use url::Url;

const FILES_ENDPOINT: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_ENDPOINT: &str = "https://www.googleapis.com/upload/drive/v3/files";
const FILE_FIELDS: &str = "id,name,mimeType,parents";
const LIST_FIELDS: &str = "nextPageToken,files(id,name,mimeType,parents)";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

/// Google Drive client authenticated as a service account.
pub struct GoogleDrive {
    http: reqwest::Client,
    auth: TokenProvider,
}

impl GoogleDrive {
    /// Create a client for the given service account.
    pub fn new(key: ServiceAccountKey, settings: &DriveSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        let auth = TokenProvider::new(key, settings.scopes.clone(), http.clone());

        Ok(Self { http, auth })
    }

    fn file_url(file_id: &str, params: &[(&str, &str)]) -> Result<Url> {
        Url::parse_with_params(&format!("{}/{}", FILES_ENDPOINT, file_id), params)
            .map_err(|e| NotewiseError::Download(format!("Invalid file id {}: {}", file_id, e)))
    }

    fn list_url(folder_id: &str, page_token: Option<&str>) -> Result<Url> {
        let query = format!("'{}' in parents and trashed = false", folder_id);
        let mut params = vec![
            ("q", query.as_str()),
            ("spaces", "drive"),
            ("fields", LIST_FIELDS),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        Url::parse_with_params(FILES_ENDPOINT, &params)
            .map_err(|e| NotewiseError::Download(format!("Invalid list query: {}", e)))
    }

    /// Issue an authenticated GET, mapping transport and status failures to download errors.
    async fn get(&self, url: Url) -> Result<Response> {
        let token = self.auth.token().await?;

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| NotewiseError::Download(format!("Drive request failed: {}", e)))?;

        ensure_success(response, NotewiseError::Download).await
    }

    async fn get_media(&self, file_id: &str) -> Result<Response> {
        let url = Self::file_url(file_id, &[("alt", "media"), ("supportsAllDrives", "true")])?;
        self.get(url).await
    }

    async fn list_page(&self, folder_id: &str, page_token: Option<String>) -> Result<FileList> {
        let url = Self::list_url(folder_id, page_token.as_deref())?;

        self.get(url)
            .await?
            .json()
            .await
            .map_err(|e| NotewiseError::Download(format!("Invalid list response: {}", e)))
    }
}

async fn ensure_success(
    response: Response,
    to_error: fn(String) -> NotewiseError,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body, to_error))
}

fn status_error(
    status: StatusCode,
    body: &str,
    to_error: fn(String) -> NotewiseError,
) -> NotewiseError {
    let message = match status {
        StatusCode::NOT_FOUND => {
            format!("file not found or not shared with the service account: {}", body)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            format!("access denied ({}): {}", status, body)
        }
        _ => format!("Drive returned {}: {}", status, body),
    };
    to_error(message)
}

/// Fetch pages until one comes back without a `nextPageToken`.
async fn collect_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<DriveFile>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<FileList>>,
{
    let mut files = Vec::new();
    let mut page_token = None;

    loop {
        let page = fetch_page(page_token.take()).await?;
        files.extend(page.files);

        match page.next_page_token {
            Some(next) => page_token = Some(next),
            None => return Ok(files),
        }
    }
}

/// Build a `multipart/related` body carrying JSON metadata followed by file content.
fn multipart_related_body(
    boundary: &str,
    metadata: &str,
    mime_type: &str,
    content: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + metadata.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.as_bytes());
    body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

#[async_trait]
impl DriveClient for GoogleDrive {
    #[instrument(skip(self))]
    async fn file_metadata(&self, file_id: &str) -> Result<DriveFile> {
        let url =
            Self::file_url(file_id, &[("fields", FILE_FIELDS), ("supportsAllDrives", "true")])?;
        let response = self.get(url).await?;

        response
            .json()
            .await
            .map_err(|e| NotewiseError::Download(format!("Invalid metadata response: {}", e)))
    }

    #[instrument(skip(self), fields(dest = %dest.display()))]
    async fn download_to(&self, file_id: &str, dest: &Path) -> Result<u64> {
        let mut response = self.get_media(file_id).await?;
        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| NotewiseError::Download(format!("Download interrupted: {}", e)))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        info!("Downloaded {} bytes", written);
        Ok(written)
    }

    #[instrument(skip(self))]
    async fn download_bytes(&self, file_id: &str) -> Result<Vec<u8>> {
        let response = self.get_media(file_id).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| NotewiseError::Download(format!("Download interrupted: {}", e)))?;
        Ok(bytes.to_vec())
    }

    #[instrument(skip(self))]
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<DriveFile>> {
        let files = collect_pages(|token| self.list_page(folder_id, token)).await?;

        debug!("Listed {} entries", files.len());
        Ok(files)
    }

    #[instrument(skip(self, content), fields(bytes = content.len()))]
    async fn upload(
        &self,
        parent_id: &str,
        name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> Result<String> {
        let token = self.auth.token().await?;

        let metadata = serde_json::json!({ "name": name, "parents": [parent_id] }).to_string();
        let boundary = format!("notewise-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_related_body(&boundary, &metadata, mime_type, &content);

        let url = Url::parse_with_params(
            UPLOAD_ENDPOINT,
            &[("uploadType", "multipart"), ("supportsAllDrives", "true"), ("fields", "id")],
        )
        .map_err(|e| NotewiseError::Upload(e.to_string()))?;

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| NotewiseError::Upload(format!("Drive request failed: {}", e)))?;

        let created: CreatedFile = ensure_success(response, NotewiseError::Upload)
            .await?
            .json()
            .await
            .map_err(|e| NotewiseError::Upload(format!("Invalid upload response: {}", e)))?;

        info!("Uploaded {} as {}", name, created.id);
        Ok(created.id)
    }
}
