//! reqwest-backed implementation of the gallery HTTP contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::{ApiError, FileApi};
use crate::models::{MediaItem, MediaKind, TagEntry};

/// Listing record as the server sends it.
#[derive(Debug, Deserialize)]
struct FileRecord {
    id: String,
    filename: String,
    #[serde(default)]
    content_type: String,
    #[serde(default)]
    size: i64,
    #[serde(default)]
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    url: String,
}

impl From<FileRecord> for MediaItem {
    fn from(record: FileRecord) -> Self {
        let kind = MediaKind::from_content_type(&record.content_type);
        Self {
            id: record.id,
            filename: record.filename,
            kind,
            content_type: record.content_type,
            size: record.size,
            created_at: record.created_at,
            url: record.url,
            tags: record.tags,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PreviewResponse {
    url: String,
}

/// Stateless HTTP client for the listing server.
pub struct HttpFileApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpFileApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ApiError::Status {
                status: response.status().as_u16(),
                url: response.url().to_string(),
            })
        }
    }
}

#[async_trait]
impl FileApi for HttpFileApi {
    async fn fetch_page(
        &self,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<MediaItem>, ApiError> {
        debug!(query, page, limit, "Fetching listing page");
        let response = self
            .client
            .get(self.url("/files"))
            .query(&[("q", query)])
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await?;
        let records: Vec<FileRecord> = Self::check_status(response)?.json().await?;
        Ok(records.into_iter().map(MediaItem::from).collect())
    }

    async fn preview_url(&self, id: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/files/{}/download", id)))
            .query(&[("preview", "true")])
            .send()
            .await?;
        // Older servers stream the file bytes here instead of a JSON body;
        // the decode error then drives the caller's base-URL fallback.
        let preview: PreviewResponse = Self::check_status(response)?.json().await?;
        Ok(preview.url)
    }

    async fn update_tags(&self, id: &str, tags: &[String]) -> Result<(), ApiError> {
        debug!(id, count = tags.len(), "Updating tags");
        let response = self
            .client
            .put(self.url(&format!("/files/{}", id)))
            .json(&serde_json::json!({ "tags": tags }))
            .send()
            .await?;
        Self::check_status(response)?;
        Ok(())
    }

    async fn delete_file(&self, id: &str) -> Result<(), ApiError> {
        debug!(id, "Deleting file");
        let response = self
            .client
            .delete(self.url(&format!("/files/{}", id)))
            .send()
            .await?;
        Self::check_status(response)?;
        Ok(())
    }

    async fn fetch_tags(&self) -> Result<Vec<TagEntry>, ApiError> {
        let response = self.client.get(self.url("/tags")).send().await?;
        let tags: Vec<TagEntry> = Self::check_status(response)?.json().await?;
        Ok(tags)
    }
}
