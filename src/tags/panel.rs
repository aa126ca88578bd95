//! Tag side panel: filter/sort over the loaded tag list and insertion of a
//! chosen tag into the last-focused input field.
//!
//! Focus is tracked through an explicit callback from the UI layer rather
//! than ambient global state; the panel only ever knows the field it was
//! told about last.

use parking_lot::Mutex;
use tracing::debug;

use crate::models::TagEntry;

/// Sort order for the panel's derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagSort {
    #[default]
    Alphabetical,
    Frequency,
}

/// A text field the UI layer reported focus for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTarget {
    pub name: String,
}

impl FieldTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Tag-list fields get comma separation, recognized by naming
    /// convention.
    fn is_tag_list(&self) -> bool {
        self.name.to_ascii_lowercase().contains("tag")
    }
}

/// Outcome of a tag insertion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// New text for the focused field.
    Updated { field: FieldTarget, text: String },
    /// No field has held focus yet; the UI should show a notice.
    NoFocusedField,
}

#[derive(Default)]
struct PanelState {
    entries: Vec<TagEntry>,
    filter: String,
    sort: TagSort,
    focus: Option<FieldTarget>,
}

#[derive(Default)]
pub struct TagPanel {
    state: Mutex<PanelState>,
}

impl TagPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the loaded tag list (the server sends it wholesale).
    pub fn set_entries(&self, entries: Vec<TagEntry>) {
        self.state.lock().entries = entries;
    }

    pub fn set_filter(&self, filter: &str) {
        self.state.lock().filter = filter.to_string();
    }

    pub fn set_sort(&self, sort: TagSort) {
        self.state.lock().sort = sort;
    }

    /// The filtered, sorted view the sidebar renders.
    pub fn visible(&self) -> Vec<TagEntry> {
        let state = self.state.lock();
        let needle = state.filter.to_lowercase();
        let mut tags: Vec<TagEntry> = state
            .entries
            .iter()
            .filter(|tag| tag.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        match state.sort {
            TagSort::Alphabetical => tags.sort_by(|a, b| a.name.cmp(&b.name)),
            TagSort::Frequency => {
                // Count desc, name asc tiebreak.
                tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)))
            }
        }
        tags
    }

    /// Records the field that last held input focus.
    pub fn focus_field(&self, field: FieldTarget) {
        debug!(field = %field.name, "Focus moved");
        self.state.lock().focus = Some(field);
    }

    /// Appends `tag` to the focused field's text, returning the new text.
    ///
    /// Tag-list fields are kept comma-separated; anything else gets a plain
    /// space. Trailing whitespace is trimmed first and a trailing comma is
    /// not doubled.
    pub fn insert(&self, tag: &str, current_text: &str) -> InsertOutcome {
        let field = match self.state.lock().focus.clone() {
            Some(field) => field,
            None => return InsertOutcome::NoFocusedField,
        };

        let mut text = current_text.trim_end().to_string();
        if !text.is_empty() {
            if field.is_tag_list() && !text.ends_with(',') {
                text.push(',');
            }
            text.push(' ');
        }
        text.push_str(tag);
        InsertOutcome::Updated { field, text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, count: u64) -> TagEntry {
        TagEntry {
            name: name.to_string(),
            count,
        }
    }

    fn names(tags: &[TagEntry]) -> Vec<&str> {
        tags.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_frequency_sort_breaks_ties_by_name() {
        let panel = TagPanel::new();
        panel.set_entries(vec![entry("z", 1), entry("y", 5), entry("x", 5)]);
        panel.set_sort(TagSort::Frequency);
        assert_eq!(names(&panel.visible()), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_alphabetical_sort_ignores_count() {
        let panel = TagPanel::new();
        panel.set_entries(vec![entry("pets", 9), entry("art", 1), entry("cars", 4)]);
        panel.set_sort(TagSort::Alphabetical);
        assert_eq!(names(&panel.visible()), vec!["art", "cars", "pets"]);
    }

    #[test]
    fn test_filter_is_case_insensitive_containment() {
        let panel = TagPanel::new();
        panel.set_entries(vec![
            entry("Landscape", 3),
            entry("cityscape", 2),
            entry("portrait", 8),
        ]);
        panel.set_filter("SCAPE");
        assert_eq!(names(&panel.visible()), vec!["Landscape", "cityscape"]);
    }

    #[test]
    fn test_insert_without_focus_history() {
        let panel = TagPanel::new();
        assert_eq!(panel.insert("cat", ""), InsertOutcome::NoFocusedField);
    }

    #[test]
    fn test_insert_into_tag_field_uses_commas() {
        let panel = TagPanel::new();
        panel.focus_field(FieldTarget::new("editTags"));

        assert_eq!(
            panel.insert("cat", ""),
            InsertOutcome::Updated {
                field: FieldTarget::new("editTags"),
                text: "cat".to_string()
            }
        );
        let InsertOutcome::Updated { text, .. } = panel.insert("dog", "cat") else {
            panic!("expected update");
        };
        assert_eq!(text, "cat, dog");

        // A trailing comma is not doubled; trailing spaces are trimmed.
        let InsertOutcome::Updated { text, .. } = panel.insert("dog", "cat,  ") else {
            panic!("expected update");
        };
        assert_eq!(text, "cat, dog");
    }

    #[test]
    fn test_insert_into_plain_field_uses_spaces() {
        let panel = TagPanel::new();
        panel.focus_field(FieldTarget::new("searchInput"));

        let InsertOutcome::Updated { text, .. } = panel.insert("dog", "big cat") else {
            panic!("expected update");
        };
        assert_eq!(text, "big cat dog");
    }

    #[test]
    fn test_insert_targets_latest_focus() {
        let panel = TagPanel::new();
        panel.focus_field(FieldTarget::new("searchInput"));
        panel.focus_field(FieldTarget::new("uploadTags"));

        let InsertOutcome::Updated { field, text } = panel.insert("dog", "cat") else {
            panic!("expected update");
        };
        assert_eq!(field.name, "uploadTags");
        assert_eq!(text, "cat, dog");
    }
}
