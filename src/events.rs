//! Events emitted by the core for the UI layer.
//!
//! The core mutates plain data and reports what changed; rendering is a
//! consumer of this stream plus the store/navigator accessors.

/// Something the UI layer should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryEvent {
    /// A new query session started; the view was cleared.
    SessionReset { query: String },
    /// A page arrived and `count` new items were appended.
    ItemsAppended { count: usize, total: usize },
    /// The first page of a fresh session came back empty.
    NoResults { query: String },
    /// A page load failed; local state is unchanged.
    LoadFailed { error: String },
    /// An item left the local view.
    ItemRemoved { id: String },
    /// An item's tags were replaced in place.
    TagsReplaced { id: String },
    /// The tag list was (re)loaded.
    TagsLoaded { count: usize },
    /// Display content for the previewed item resolved.
    PreviewReady {
        id: String,
        url: String,
        position: usize,
        total: usize,
    },
    /// The preview overlay stepped past the last loaded item.
    EndOfCollection,
    /// Transient user-facing notice.
    Notice(String),
}

/// Unbounded fan-in of core events, drained by the UI layer.
#[derive(Clone)]
pub struct EventBus {
    tx: flume::Sender<GalleryEvent>,
    rx: flume::Receiver<GalleryEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }

    pub fn emit(&self, event: GalleryEvent) {
        // The bus always holds a receiver, so the send cannot fail.
        let _ = self.tx.send(event);
    }

    /// Drains all pending events without blocking.
    pub fn poll(&self) -> Vec<GalleryEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_drains_in_order() {
        let bus = EventBus::new();
        bus.emit(GalleryEvent::EndOfCollection);
        bus.emit(GalleryEvent::Notice("hi".to_string()));

        let events = bus.poll();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], GalleryEvent::EndOfCollection);
        assert!(bus.poll().is_empty());
    }
}
