//! Scripted in-process backend for the concurrency tests.
//!
//! Pages are served from a queue in script order. A gated mock parks every
//! `fetch_page` on a semaphore until the test releases it, which lets tests
//! hold a fetch "in flight" while they poke at the controller.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::{ApiError, FileApi};
use crate::models::{MediaItem, MediaKind, TagEntry};

/// Builds a plain image item for scripts.
pub fn item(id: &str) -> MediaItem {
    MediaItem {
        id: id.to_string(),
        filename: format!("{}.png", id),
        kind: MediaKind::Image,
        content_type: "image/png".to_string(),
        size: 1024,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        url: format!("/api/files/{}/download?preview=true", id),
        tags: Vec::new(),
    }
}

pub fn items(ids: &[&str]) -> Vec<MediaItem> {
    ids.iter().map(|id| item(id)).collect()
}

/// One scripted listing response.
pub enum PageScript {
    Items(Vec<MediaItem>),
    Fail,
}

pub struct MockApi {
    pages: Mutex<VecDeque<PageScript>>,
    gate: Option<Arc<Semaphore>>,
    /// (query, page) per fetch_page call, in arrival order.
    pub calls: Mutex<Vec<(String, u32)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    preview_urls: Mutex<HashMap<String, String>>,
    tags: Mutex<Vec<TagEntry>>,
    pub updated: Mutex<Vec<(String, Vec<String>)>>,
    pub deleted: Mutex<Vec<String>>,
}

impl MockApi {
    fn build(pages: Vec<PageScript>, gate: Option<Arc<Semaphore>>) -> Arc<Self> {
        Arc::new(Self {
            pages: Mutex::new(pages.into()),
            gate,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            preview_urls: Mutex::new(HashMap::new()),
            tags: Mutex::new(Vec::new()),
            updated: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        })
    }

    pub fn new(pages: Vec<PageScript>) -> Arc<Self> {
        Self::build(pages, None)
    }

    /// A mock whose fetches block until the returned semaphore is released.
    pub fn gated(pages: Vec<PageScript>) -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (Self::build(pages, Some(Arc::clone(&gate))), gate)
    }

    pub fn with_preview(self: Arc<Self>, id: &str, url: &str) -> Arc<Self> {
        self.preview_urls
            .lock()
            .insert(id.to_string(), url.to_string());
        self
    }

    pub fn with_tags(self: Arc<Self>, tags: Vec<TagEntry>) -> Arc<Self> {
        *self.tags.lock() = tags;
        self
    }

    /// Highest number of concurrently outstanding fetches observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileApi for MockApi {
    async fn fetch_page(
        &self,
        query: &str,
        page: u32,
        _limit: u32,
    ) -> Result<Vec<MediaItem>, ApiError> {
        self.calls.lock().push((query.to_string(), page));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match self.pages.lock().pop_front() {
            Some(PageScript::Items(items)) => Ok(items),
            Some(PageScript::Fail) | None => Err(ApiError::Status {
                status: 500,
                url: "/api/files".to_string(),
            }),
        }
    }

    async fn preview_url(&self, id: &str) -> Result<String, ApiError> {
        match self.preview_urls.lock().get(id) {
            Some(url) => Ok(url.clone()),
            None => Err(ApiError::Status {
                status: 404,
                url: format!("/api/files/{}/download", id),
            }),
        }
    }

    async fn update_tags(&self, id: &str, tags: &[String]) -> Result<(), ApiError> {
        self.updated.lock().push((id.to_string(), tags.to_vec()));
        Ok(())
    }

    async fn delete_file(&self, id: &str) -> Result<(), ApiError> {
        self.deleted.lock().push(id.to_string());
        Ok(())
    }

    async fn fetch_tags(&self) -> Result<Vec<TagEntry>, ApiError> {
        Ok(self.tags.lock().clone())
    }
}
