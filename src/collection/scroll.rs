//! Sentinel-visibility trigger for forward paging.

use std::sync::Arc;

use tracing::trace;

use crate::collection::store::CollectionStore;

/// Converts "the scroll sentinel entered the viewport" into a guarded page
/// load.
///
/// The trigger may fire spuriously; the store's single-flight guard is the
/// authoritative protection, the checks here just avoid pointless spawns.
pub struct ScrollTrigger {
    store: Arc<CollectionStore>,
}

impl ScrollTrigger {
    pub fn new(store: Arc<CollectionStore>) -> Self {
        Self { store }
    }

    /// Called by the UI layer whenever the sentinel becomes visible.
    pub fn sentinel_visible(&self) {
        if self.store.is_empty() {
            trace!("Sentinel visible before any items loaded, ignoring");
            return;
        }
        if self.store.is_fetching() || self.store.is_exhausted() {
            return;
        }
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let query = store.query();
            let _ = store.load_next(&query, false).await;
        });
    }
}
