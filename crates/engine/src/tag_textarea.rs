//! Tag textarea: a template editor where `[value]` placeholders are picked
//! from a fixed tag catalog.
//!
//! Tags are triggered with `[`, filtered by name, and tracked with the same
//! machinery as mentions. When no tag has been picked interactively, the
//! selection falls back to the bracketed tokens found in the written value.

use indexmap::IndexMap;
use mentions_types::{Choice, ChoiceWithIndices, MentionEvent, TemplateTag};
use mentions_util::{ConfigError, MentionConfig};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::input::{Key, MentionsInput};

/// Trigger character opening the tag menu.
pub const TAG_TRIGGER: char = '[';

/// Search terms may span words and end with the closing bracket while editing.
pub const TAG_SEARCH_PATTERN: &str = r"^[^\[\]\n]*\]?$";

static TAG_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\[\]\n]*)\]").unwrap());

/// Configuration used by the tag textarea.
pub fn tag_config() -> MentionConfig {
    MentionConfig {
        trigger_character: TAG_TRIGGER,
        search_pattern: TAG_SEARCH_PATTERN.to_string(),
        close_menu_on_blur: false,
    }
}

#[derive(Clone, Debug)]
pub struct TagTextarea {
    /// Optional caption shown by the host
    label: Option<String>,
    /// Known tags keyed by value, in catalog order
    catalog: IndexMap<String, TemplateTag>,
    input: MentionsInput<TemplateTag>,
    filtered_tags: Vec<TemplateTag>,
    selected_tags: Vec<ChoiceWithIndices<TemplateTag>>,
    default_selected_tags: Vec<TemplateTag>,
    disabled: bool,
}

impl TagTextarea {
    pub fn new(tags: impl IntoIterator<Item = TemplateTag>) -> Result<Self, ConfigError> {
        Self::with_config(tags, tag_config())
    }

    pub fn with_config(tags: impl IntoIterator<Item = TemplateTag>, config: MentionConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            label: None,
            catalog: tags.into_iter().map(|tag| (tag.value.clone(), tag)).collect(),
            input: MentionsInput::new(config)?,
            filtered_tags: Vec::new(),
            selected_tags: Vec::new(),
            default_selected_tags: Vec::new(),
            disabled: false,
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    // ===== SELECTORS =====

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn value(&self) -> &str {
        self.input.text()
    }

    pub fn input(&self) -> &MentionsInput<TemplateTag> {
        &self.input
    }

    pub fn tags(&self) -> impl Iterator<Item = &TemplateTag> {
        self.catalog.values()
    }

    pub fn filtered_tags(&self) -> &[TemplateTag] {
        &self.filtered_tags
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Text rendering of a tag inside the template.
    pub fn tag_label(tag: &TemplateTag) -> String {
        tag.label()
    }

    /// Interactively tracked tags, or the tags parsed from the written value.
    pub fn selected_tags(&self) -> Vec<TemplateTag> {
        if self.selected_tags.is_empty() {
            self.default_selected_tags.clone()
        } else {
            self.selected_tags.iter().map(|cwi| cwi.choice.clone()).collect()
        }
    }

    // ===== REDUCERS =====

    /// Case-insensitive name filter; a trailing `]` left over from editing a
    /// tag is ignored.
    pub fn filter_tags(&mut self, search_term: &str) -> &[TemplateTag] {
        let needle = search_term.strip_suffix(']').unwrap_or(search_term).to_lowercase();
        self.filtered_tags = self.catalog.values().filter(|tag| tag.name.to_lowercase().contains(&needle)).cloned().collect();
        &self.filtered_tags
    }

    pub fn on_selected_tags_change(&mut self, choices: Vec<ChoiceWithIndices<TemplateTag>>) {
        self.selected_tags = choices;
    }

    pub fn on_menu_hide(&mut self) {
        self.filtered_tags.clear();
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Replace the value from outside (e.g. a form model) and anchor the tags
    /// it already contains.
    pub fn write_value(&mut self, value: impl Into<String>) -> Vec<MentionEvent<TemplateTag>> {
        self.input.set_text(value);
        self.calculate_selected_tags();
        let events = self.input.set_selected_choices(self.default_selected_tags.clone());
        self.absorb(events)
    }

    /// Known tags referenced as `[value]` in the current text, in text order.
    fn calculate_selected_tags(&mut self) {
        self.default_selected_tags = TAG_TOKEN
            .captures_iter(self.input.text())
            .filter_map(|captures| self.catalog.get(&captures[1]).cloned())
            .collect();
    }

    pub fn handle_keydown(&mut self, key: Key) -> Vec<MentionEvent<TemplateTag>> {
        if self.disabled {
            return Vec::new();
        }
        let events = self.input.handle_keydown(key);
        self.absorb(events)
    }

    pub fn handle_input(&mut self, value: impl Into<String>, caret: usize) -> Vec<MentionEvent<TemplateTag>> {
        if self.disabled {
            return Vec::new();
        }
        let events = self.input.handle_input(value, caret);
        self.absorb(events)
    }

    pub fn handle_click(&mut self, caret: usize) -> Vec<MentionEvent<TemplateTag>> {
        if self.disabled {
            return Vec::new();
        }
        let events = self.input.handle_click(caret);
        self.absorb(events)
    }

    pub fn handle_blur(&mut self) -> Vec<MentionEvent<TemplateTag>> {
        let events = self.input.handle_blur();
        self.absorb(events)
    }

    pub fn select_tag(&mut self, tag: TemplateTag) -> Vec<MentionEvent<TemplateTag>> {
        if self.disabled {
            return Vec::new();
        }
        let events = self.input.select_choice(tag);
        self.absorb(events)
    }

    fn absorb(&mut self, events: Vec<MentionEvent<TemplateTag>>) -> Vec<MentionEvent<TemplateTag>> {
        for event in &events {
            match event {
                MentionEvent::SelectedChoicesChanged(choices) => self.on_selected_tags_change(choices.clone()),
                MentionEvent::MenuHidden => self.on_menu_hide(),
                MentionEvent::Search(term) => {
                    self.filter_tags(term);
                }
                _ => {}
            }
        }
        events
    }
}
