//! Append-only local view of the paged server collection.
//!
//! One query session owns the view at a time: a reset clears it, rewinds
//! the page cursor and bumps the session generation. A single fetch guard
//! serializes page requests across all triggers (manual "load more", the
//! scroll sentinel, preview read-ahead), and responses that arrive after
//! their session was superseded are discarded by generation check.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::api::{ApiError, FileApi};
use crate::events::{EventBus, GalleryEvent};
use crate::models::MediaItem;

/// Result of a [`CollectionStore::load_next`] call.
///
/// Callers must not assume a call produced a request; several variants
/// report that it did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived and `count` new items were appended.
    Appended { count: usize },
    /// The server returned an empty page; the session is exhausted now.
    /// `first_page` marks the empty first page of a fresh session.
    EmptyPage { first_page: bool },
    /// Another fetch was already in flight; nothing was requested.
    Dropped,
    /// The session had already been exhausted; nothing was requested.
    Exhausted,
    /// The response belonged to a superseded session and was discarded.
    Stale,
}

struct CollectionState {
    items: Vec<MediaItem>,
    ids: HashSet<String>,
    query: String,
    page_cursor: u32,
    exhausted: bool,
    fetching: bool,
    session: u64,
}

impl CollectionState {
    fn begin_session(&mut self, query: &str) {
        self.items.clear();
        self.ids.clear();
        self.query = query.to_string();
        self.page_cursor = 1;
        self.exhausted = false;
        self.session = self.session.wrapping_add(1);
    }
}

pub struct CollectionStore {
    state: Mutex<CollectionState>,
    /// Signalled every time the fetch guard transitions back to false.
    settled: Notify,
    api: Arc<dyn FileApi>,
    events: EventBus,
    page_size: u32,
}

impl CollectionStore {
    pub fn new(api: Arc<dyn FileApi>, events: EventBus, page_size: u32) -> Self {
        Self {
            state: Mutex::new(CollectionState {
                items: Vec::new(),
                ids: HashSet::new(),
                query: String::new(),
                page_cursor: 1,
                exhausted: false,
                fetching: false,
                session: 0,
            }),
            settled: Notify::new(),
            api,
            events,
            page_size,
        }
    }

    /// Loads the next page of the current session, optionally starting a
    /// fresh session for `query` first. Without `reset` the session's own
    /// query is used, whatever the caller passed.
    ///
    /// The reset applies before the guard check, so a reset issued while a
    /// page is in flight still supersedes the old session; the in-flight
    /// response is then discarded on arrival. The superseded call does not
    /// start a second request, which keeps at most one request outstanding
    /// at any instant.
    pub async fn load_next(&self, query: &str, reset: bool) -> Result<LoadOutcome, ApiError> {
        let (session, page, query) = {
            let mut state = self.state.lock();
            if reset {
                state.begin_session(query);
                self.events.emit(GalleryEvent::SessionReset {
                    query: query.to_string(),
                });
            }
            if state.fetching {
                debug!("Fetch already in flight, dropping load request");
                return Ok(LoadOutcome::Dropped);
            }
            if state.exhausted {
                return Ok(LoadOutcome::Exhausted);
            }
            state.fetching = true;
            (state.session, state.page_cursor, state.query.clone())
        };

        let result = self.api.fetch_page(&query, page, self.page_size).await;
        self.settle(session, page, result)
    }

    /// Applies a settled page response and releases the fetch guard.
    fn settle(
        &self,
        session: u64,
        page: u32,
        result: Result<Vec<MediaItem>, ApiError>,
    ) -> Result<LoadOutcome, ApiError> {
        let mut state = self.state.lock();
        state.fetching = false;
        self.settled.notify_waiters();

        if state.session != session {
            debug!(session, page, "Discarding response from superseded session");
            return Ok(LoadOutcome::Stale);
        }

        match result {
            Ok(items) if items.is_empty() => {
                state.exhausted = true;
                let first_page = page == 1;
                if first_page {
                    self.events.emit(GalleryEvent::NoResults {
                        query: state.query.clone(),
                    });
                }
                debug!(page, "Session exhausted");
                Ok(LoadOutcome::EmptyPage { first_page })
            }
            Ok(items) => {
                let mut count = 0;
                for item in items {
                    // Dedup by id, keeping the earliest occurrence.
                    if state.ids.insert(item.id.clone()) {
                        state.items.push(item);
                        count += 1;
                    }
                }
                state.page_cursor += 1;
                debug!(page, count, total = state.items.len(), "Appended page");
                self.events.emit(GalleryEvent::ItemsAppended {
                    count,
                    total: state.items.len(),
                });
                Ok(LoadOutcome::Appended { count })
            }
            Err(err) => {
                // Cursor and exhausted are untouched; the same page can be
                // retried by the next trigger.
                warn!(page, error = %err, "Page load failed");
                self.events.emit(GalleryEvent::LoadFailed {
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Waits until no fetch is in flight.
    ///
    /// The notification is armed before the guard is checked so a settle
    /// happening between the two cannot be missed.
    pub async fn wait_idle(&self) {
        loop {
            let settled = self.settled.notified();
            if !self.state.lock().fetching {
                return;
            }
            settled.await;
        }
    }

    /// Removes the item with `id` from the view, returning its former
    /// index. The caller is responsible for keeping any preview cursor
    /// consistent.
    pub fn remove(&self, id: &str) -> Option<usize> {
        let mut state = self.state.lock();
        let index = state.items.iter().position(|item| item.id == id)?;
        state.items.remove(index);
        state.ids.remove(id);
        self.events.emit(GalleryEvent::ItemRemoved { id: id.to_string() });
        Some(index)
    }

    /// Replaces the tags of the item with `id` in place. No-op when the id
    /// is not loaded.
    pub fn replace_tags(&self, id: &str, tags: Vec<String>) -> bool {
        let mut state = self.state.lock();
        match state.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.tags = tags;
                self.events.emit(GalleryEvent::TagsReplaced { id: id.to_string() });
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn is_fetching(&self) -> bool {
        self.state.lock().fetching
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.lock().exhausted
    }

    pub fn query(&self) -> String {
        self.state.lock().query.clone()
    }

    /// Snapshot of the loaded view for rendering.
    pub fn items(&self) -> Vec<MediaItem> {
        self.state.lock().items.clone()
    }

    pub fn item_at(&self, index: usize) -> Option<MediaItem> {
        self.state.lock().items.get(index).cloned()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.state.lock().items.iter().position(|item| item.id == id)
    }
}
