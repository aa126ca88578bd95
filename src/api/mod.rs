//! Client side of the gallery HTTP contract.
//!
//! The controller talks to the server through the [`FileApi`] trait so the
//! coordination logic can run against a scripted in-process backend in
//! tests. [`HttpFileApi`] is the real implementation.

use async_trait::async_trait;

use crate::models::{MediaItem, TagEntry};

pub mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpFileApi;

/// Errors surfaced by the gallery API.
///
/// Nothing in here retries; retry policy belongs to the caller, and the
/// current design has none. A failed page load leaves the local view
/// untouched.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status} for {url}")]
    Status { status: u16, url: String },
}

/// The remote file collection, seen through the HTTP contract.
#[async_trait]
pub trait FileApi: Send + Sync {
    /// Fetches one page of the listing for `query`. Pages are 1-based.
    async fn fetch_page(
        &self,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<MediaItem>, ApiError>;

    /// Resolves a short-lived display URL for an item's preview.
    async fn preview_url(&self, id: &str) -> Result<String, ApiError>;

    /// Replaces an item's tag list on the server.
    async fn update_tags(&self, id: &str, tags: &[String]) -> Result<(), ApiError>;

    /// Deletes an item from the server.
    async fn delete_file(&self, id: &str) -> Result<(), ApiError>;

    /// Loads the full tag list.
    async fn fetch_tags(&self) -> Result<Vec<TagEntry>, ApiError>;
}
