//! Keystroke debounce in front of the store's reset loads.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::collection::store::CollectionStore;

/// Collapses rapid query edits into one reset load after a quiet period.
///
/// Each `set_query` schedules a flush; only the newest one survives the
/// delay, checked by generation the same way the store guards sessions.
pub struct SearchDebouncer {
    store: Arc<CollectionStore>,
    delay: Duration,
    inner: Arc<Mutex<DebounceState>>,
}

struct DebounceState {
    generation: u64,
    query: String,
}

impl SearchDebouncer {
    pub fn new(store: Arc<CollectionStore>, delay: Duration) -> Self {
        Self {
            store,
            delay,
            inner: Arc::new(Mutex::new(DebounceState {
                generation: 0,
                query: String::new(),
            })),
        }
    }

    /// Records the latest query text and schedules a flush.
    pub fn set_query(&self, query: &str) {
        let generation = {
            let mut state = self.inner.lock();
            state.generation = state.generation.wrapping_add(1);
            state.query = query.to_string();
            state.generation
        };

        let store = Arc::clone(&self.store);
        let inner = Arc::clone(&self.inner);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let query = {
                let state = inner.lock();
                if state.generation != generation {
                    return;
                }
                state.query.clone()
            };
            debug!(query, "Search debounce elapsed, starting new session");
            let _ = store.load_next(&query, true).await;
        });
    }
}
