//! One-at-a-time preview browsing over the loaded collection.
//!
//! The navigator owns the overlay cursor. Stepping forward near the loaded
//! boundary starts a background page load; stepping off the last loaded
//! item waits for the in-flight page instead of overrunning the view. The
//! wait has no timeout and is cancelled by `close()` through an epoch
//! counter, so a stale waiter can never move a cursor that has since been
//! reopened elsewhere.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::api::FileApi;
use crate::collection::store::{CollectionStore, LoadOutcome};
use crate::events::{EventBus, GalleryEvent};
use crate::models::MediaItem;

/// Outcome of a single navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The cursor moved to this position.
    Moved { index: usize },
    /// Already at the last loaded item with nothing further to load.
    EndOfCollection,
    /// Already at the first item.
    AtStart,
    /// The overlay is closed; the step did nothing.
    Closed,
    /// The overlay was closed or reopened while waiting for data.
    Cancelled,
}

/// Snapshot of the overlay position for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationInfo {
    pub current_index: Option<usize>,
    pub total_loaded: usize,
    pub at_start: bool,
    pub at_loaded_end: bool,
}

struct NavState {
    current: Option<usize>,
    /// Bumped by open/close; parked waits and in-flight resolutions check
    /// it before touching anything.
    epoch: u64,
}

pub struct PreviewNavigator {
    store: Arc<CollectionStore>,
    api: Arc<dyn FileApi>,
    events: EventBus,
    state: Arc<Mutex<NavState>>,
    resolved: Arc<Mutex<LruCache<String, String>>>,
    read_ahead: usize,
}

impl PreviewNavigator {
    pub fn new(
        store: Arc<CollectionStore>,
        api: Arc<dyn FileApi>,
        events: EventBus,
        read_ahead: usize,
        cache_capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            store,
            api,
            events,
            state: Arc::new(Mutex::new(NavState {
                current: None,
                epoch: 0,
            })),
            resolved: Arc::new(Mutex::new(LruCache::new(capacity))),
            read_ahead,
        }
    }

    /// Opens the overlay at the item with `id`. Stays closed when the id is
    /// not in the loaded view.
    pub fn open(&self, id: &str) -> Option<usize> {
        let index = self.store.index_of(id)?;
        {
            let mut state = self.state.lock();
            state.current = Some(index);
            state.epoch = state.epoch.wrapping_add(1);
        }
        debug!(id, index, "Preview opened");
        self.spawn_resolve(index);
        Some(index)
    }

    /// Closes the overlay and cancels any parked boundary wait and pending
    /// content resolution.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.current = None;
        state.epoch = state.epoch.wrapping_add(1);
        debug!("Preview closed");
    }

    pub fn current(&self) -> Option<usize> {
        self.state.lock().current
    }

    pub fn info(&self) -> NavigationInfo {
        let current = self.current();
        let total = self.store.len();
        NavigationInfo {
            current_index: current,
            total_loaded: total,
            at_start: current == Some(0),
            at_loaded_end: current.is_some() && current == total.checked_sub(1),
        }
    }

    /// Steps forward one item, extending the loaded view when the cursor
    /// runs ahead of it.
    pub async fn next(&self) -> StepOutcome {
        let (index, epoch) = {
            let state = self.state.lock();
            match state.current {
                Some(index) => (index, state.epoch),
                None => return StepOutcome::Closed,
            }
        };

        let len = self.store.len();
        let at_boundary = index + 1 >= len;

        // Read-ahead: within the margin of the loaded end, start the next
        // page in the background so stepping rarely has to stop.
        if !at_boundary
            && index + self.read_ahead >= len
            && !self.store.is_fetching()
            && !self.store.is_exhausted()
        {
            trace!(index, len, "Read-ahead page load");
            let store = Arc::clone(&self.store);
            tokio::spawn(async move {
                let query = store.query();
                if let Err(err) = store.load_next(&query, false).await {
                    warn!(error = %err, "Read-ahead page load failed");
                }
            });
        }

        if at_boundary {
            // At the last loaded item: make sure any obtainable page has
            // settled before deciding there is nothing further.
            if self.store.is_fetching() {
                self.store.wait_idle().await;
            } else if !self.store.is_exhausted() {
                let query = self.store.query();
                match self.store.load_next(&query, false).await {
                    // Lost the race to another trigger; wait for its page.
                    Ok(LoadOutcome::Dropped) => self.store.wait_idle().await,
                    _ => {}
                }
            }
            if self.state.lock().epoch != epoch {
                trace!("Boundary wait cancelled");
                return StepOutcome::Cancelled;
            }
        }

        let next_index = index + 1;
        if next_index < self.store.len() {
            {
                let mut state = self.state.lock();
                if state.epoch != epoch {
                    return StepOutcome::Cancelled;
                }
                state.current = Some(next_index);
            }
            self.spawn_resolve(next_index);
            StepOutcome::Moved { index: next_index }
        } else {
            self.events.emit(GalleryEvent::EndOfCollection);
            StepOutcome::EndOfCollection
        }
    }

    /// Steps back one item. Backward browsing never loads.
    pub fn prev(&self) -> StepOutcome {
        let index = {
            let mut state = self.state.lock();
            match state.current {
                None => return StepOutcome::Closed,
                Some(0) => return StepOutcome::AtStart,
                Some(index) => {
                    state.current = Some(index - 1);
                    index - 1
                }
            }
        };
        self.spawn_resolve(index);
        StepOutcome::Moved { index }
    }

    /// Keeps the cursor pointing at the same item when an earlier item is
    /// removed; clamps to the new end, closing when the view empties.
    pub fn on_item_removed(&self, removed_index: usize) {
        let mut state = self.state.lock();
        let Some(current) = state.current else {
            return;
        };
        let len = self.store.len();
        if len == 0 {
            state.current = None;
            state.epoch = state.epoch.wrapping_add(1);
            return;
        }
        let shifted = if removed_index < current {
            current - 1
        } else {
            current
        };
        state.current = Some(shifted.min(len - 1));
    }

    /// Resolves display content for the item at `index` in the background.
    ///
    /// Best-effort: a failed resolution falls back to the item's base URL,
    /// and a result for a position the overlay has left is dropped. The
    /// cursor transition never waits for this.
    fn spawn_resolve(&self, index: usize) {
        let Some(item) = self.store.item_at(index) else {
            return;
        };
        let epoch = self.state.lock().epoch;
        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        let resolved = Arc::clone(&self.resolved);
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        tokio::spawn(async move {
            let url = resolve_url(&api, &resolved, &item).await;
            {
                let state = state.lock();
                if state.epoch != epoch || state.current != Some(index) {
                    trace!(id = %item.id, "Dropping stale preview resolution");
                    return;
                }
            }
            events.emit(GalleryEvent::PreviewReady {
                id: item.id,
                url,
                position: index,
                total: store.len(),
            });
        });
    }
}

async fn resolve_url(
    api: &Arc<dyn FileApi>,
    resolved: &Mutex<LruCache<String, String>>,
    item: &MediaItem,
) -> String {
    if let Some(url) = resolved.lock().get(&item.id).cloned() {
        return url;
    }
    match api.preview_url(&item.id).await {
        Ok(url) => {
            resolved.lock().put(item.id.clone(), url.clone());
            url
        }
        Err(err) => {
            debug!(id = %item.id, error = %err, "Preview resolution failed, using base url");
            item.url.clone()
        }
    }
}
