//! Gallery facade: wires the collection store, preview navigator, scroll
//! trigger and tag panel over one API client and event bus.

use std::sync::Arc;

use tracing::warn;

use crate::api::{ApiError, FileApi};
use crate::collection::{CollectionStore, ScrollTrigger, SearchDebouncer};
use crate::config::Config;
use crate::events::{EventBus, GalleryEvent};
use crate::preview::PreviewNavigator;
use crate::tags::{FieldTarget, InsertOutcome, TagPanel};

pub struct Gallery {
    pub store: Arc<CollectionStore>,
    pub navigator: Arc<PreviewNavigator>,
    pub tag_panel: Arc<TagPanel>,
    pub scroll: ScrollTrigger,
    pub search: SearchDebouncer,
    api: Arc<dyn FileApi>,
    events: EventBus,
}

impl Gallery {
    pub fn new(api: Arc<dyn FileApi>, config: &Config) -> Self {
        let events = EventBus::new();
        let store = Arc::new(CollectionStore::new(
            Arc::clone(&api),
            events.clone(),
            config.page_size,
        ));
        let navigator = Arc::new(PreviewNavigator::new(
            Arc::clone(&store),
            Arc::clone(&api),
            events.clone(),
            config.read_ahead,
            config.preview_cache,
        ));
        let scroll = ScrollTrigger::new(Arc::clone(&store));
        let search = SearchDebouncer::new(Arc::clone(&store), config.search_debounce);
        Self {
            store,
            navigator,
            tag_panel: Arc::new(TagPanel::new()),
            scroll,
            search,
            api,
            events,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Initial load: first page of the unfiltered collection plus the tag
    /// list.
    pub async fn start(&self) {
        if let Err(err) = self.store.load_next("", true).await {
            warn!(error = %err, "Initial collection load failed");
        }
        self.reload_tags().await;
    }

    pub async fn reload_tags(&self) {
        match self.api.fetch_tags().await {
            Ok(tags) => {
                let count = tags.len();
                self.tag_panel.set_entries(tags);
                self.events.emit(GalleryEvent::TagsLoaded { count });
            }
            Err(err) => {
                warn!(error = %err, "Tag list load failed");
                self.events
                    .emit(GalleryEvent::Notice("Failed to load tags".to_string()));
            }
        }
    }

    /// Deletes a file on the server, then removes it from the local view
    /// and keeps the preview cursor consistent.
    pub async fn delete_file(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete_file(id).await?;
        if let Some(index) = self.store.remove(id) {
            self.navigator.on_item_removed(index);
        }
        Ok(())
    }

    /// Replaces a file's tags on the server, mirrors the change in place
    /// and refreshes the tag list (the edit may have minted new tags).
    pub async fn save_tags(&self, id: &str, tags: Vec<String>) -> Result<(), ApiError> {
        self.api.update_tags(id, &tags).await?;
        self.store.replace_tags(id, tags);
        self.reload_tags().await;
        Ok(())
    }

    /// Inserts a tag into the last-focused field, surfacing the no-focus
    /// case as a user notice.
    pub fn insert_tag(&self, tag: &str, current_text: &str) -> Option<(FieldTarget, String)> {
        match self.tag_panel.insert(tag, current_text) {
            InsertOutcome::Updated { field, text } => Some((field, text)),
            InsertOutcome::NoFocusedField => {
                self.events.emit(GalleryEvent::Notice(
                    "Select an input field first".to_string(),
                ));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{items, MockApi, PageScript};
    use crate::models::TagEntry;

    fn make_gallery(api: Arc<MockApi>) -> Gallery {
        Gallery::new(api as Arc<dyn FileApi>, &Config::default())
    }

    #[tokio::test]
    async fn test_start_loads_collection_and_tags() {
        let api = MockApi::new(vec![PageScript::Items(items(&["a", "b"]))]).with_tags(vec![
            TagEntry {
                name: "cats".to_string(),
                count: 2,
            },
        ]);
        let gallery = make_gallery(api);

        gallery.start().await;
        assert_eq!(gallery.store.len(), 2);
        assert_eq!(gallery.tag_panel.visible().len(), 1);
        assert!(gallery
            .events()
            .poll()
            .contains(&GalleryEvent::TagsLoaded { count: 1 }));
    }

    #[tokio::test]
    async fn test_delete_shifts_open_preview() {
        let api = MockApi::new(vec![PageScript::Items(items(&["a", "b", "c"]))]);
        let gallery = make_gallery(Arc::clone(&api));
        gallery.start().await;

        gallery.navigator.open("c");
        gallery.delete_file("b").await.unwrap();

        assert_eq!(api.deleted.lock().as_slice(), ["b".to_string()]);
        assert_eq!(gallery.store.len(), 2);
        // Still pointing at "c", now one slot earlier.
        assert_eq!(gallery.navigator.current(), Some(1));
        assert_eq!(gallery.store.item_at(1).unwrap().id, "c");
    }

    #[tokio::test]
    async fn test_save_tags_updates_in_place_and_reloads_tags() {
        let api = MockApi::new(vec![PageScript::Items(items(&["a"]))]);
        let gallery = make_gallery(Arc::clone(&api));
        gallery.start().await;

        gallery
            .save_tags("a", vec!["cat".to_string(), "pet".to_string()])
            .await
            .unwrap();

        assert_eq!(
            api.updated.lock().as_slice(),
            [("a".to_string(), vec!["cat".to_string(), "pet".to_string()])]
        );
        assert_eq!(gallery.store.item_at(0).unwrap().tags, vec!["cat", "pet"]);
        assert!(gallery
            .events()
            .poll()
            .iter()
            .any(|e| matches!(e, GalleryEvent::TagsReplaced { id } if id == "a")));
    }

    #[tokio::test]
    async fn test_insert_tag_without_focus_notices() {
        let api = MockApi::new(vec![]);
        let gallery = make_gallery(api);

        assert!(gallery.insert_tag("cat", "").is_none());
        assert!(gallery
            .events()
            .poll()
            .iter()
            .any(|e| matches!(e, GalleryEvent::Notice(_))));

        gallery.tag_panel.focus_field(FieldTarget::new("uploadTags"));
        let (field, text) = gallery.insert_tag("cat", "dog").unwrap();
        assert_eq!(field.name, "uploadTags");
        assert_eq!(text, "dog, cat");
    }
}
