//! Headless mention input.
//!
//! `MentionsInput` mirrors a host text control and reproduces the behavior of
//! a mentions autocomplete without any rendering: the host forwards key,
//! input, click and blur notifications, and every call returns the
//! [`MentionEvent`]s the host should act on (show the menu, run a search,
//! persist the selected choices).
//!
//! Key behaviors:
//! - Typing the trigger character after a boundary (start of text, space,
//!   newline, `(`) opens the menu.
//! - While the menu is open, each input emits the search term between the
//!   trigger and the caret, or closes the menu once the term no longer
//!   matches the configured pattern.
//! - Backspace/Delete with the caret at the end of a selected label turns the
//!   label back into a search so the user can pick another choice.
//! - Every input re-anchors the selected choices, dumping the ones whose label
//!   vanished and restoring dumped ones that reappear.

use mentions_types::{Choice, ChoiceWithIndices, Indices, MentionEvent};
use mentions_util::{ConfigError, DEFAULT_SEARCH_PATTERN, MentionConfig, TextInputState, char_at, char_len};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::locator::preceding_char_valid;
use crate::menu::MenuState;
use crate::tracker::ChoiceTracker;

static DEFAULT_SEARCH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_SEARCH_PATTERN).unwrap());

/// Key pressed in the text control, reported before the text changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Char(char),
    Backspace,
    Delete,
    Other,
}

#[derive(Clone, Debug)]
pub struct MentionsInput<C> {
    config: MentionConfig,
    search_regex: Regex,
    text: TextInputState,
    tracker: ChoiceTracker<C>,
    menu: Option<MenuState>,
}

impl<C: Choice> Default for MentionsInput<C> {
    fn default() -> Self {
        Self {
            config: MentionConfig::default(),
            search_regex: DEFAULT_SEARCH_REGEX.clone(),
            text: TextInputState::new(),
            tracker: ChoiceTracker::new(),
            menu: None,
        }
    }
}

impl<C: Choice> MentionsInput<C> {
    pub fn new(config: MentionConfig) -> Result<Self, ConfigError> {
        let search_regex = config.search_regex()?;
        Ok(Self {
            config,
            search_regex,
            ..Self::default()
        })
    }

    // ===== SELECTORS =====

    pub fn config(&self) -> &MentionConfig {
        &self.config
    }

    pub fn text(&self) -> &str {
        self.text.input()
    }

    pub fn caret(&self) -> usize {
        self.text.cursor()
    }

    pub fn selected_choices(&self) -> &[ChoiceWithIndices<C>] {
        self.tracker.selected()
    }

    pub fn dumped_choices(&self) -> &[ChoiceWithIndices<C>] {
        self.tracker.dumped()
    }

    pub fn tracker(&self) -> &ChoiceTracker<C> {
        &self.tracker
    }

    pub fn menu(&self) -> Option<&MenuState> {
        self.menu.as_ref()
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu.is_some()
    }

    /// Search term currently typed after the trigger, when the menu is open.
    pub fn search_term(&self) -> Option<&str> {
        let menu = self.menu.as_ref()?;
        Some(self.text.slice(menu.search_range(self.text.cursor())))
    }

    // ===== REDUCERS =====

    /// Set the text without treating it as user input (no resync, no events).
    pub fn set_text(&mut self, value: impl Into<String>) {
        self.text.set_input(value);
    }

    /// Anchor preset choices (e.g. when editing existing text) in the current text.
    pub fn set_selected_choices(&mut self, choices: Vec<C>) -> Vec<MentionEvent<C>> {
        self.tracker.set_presets(self.text.input(), choices)
    }

    pub fn handle_keydown(&mut self, key: Key) -> Vec<MentionEvent<C>> {
        let caret = self.text.cursor();
        match key {
            Key::Char(c) if c == self.config.trigger_character && preceding_char_valid(self.text.preceding_char()) => {
                self.show_menu().into_iter().collect()
            }
            Key::Backspace | Key::Delete => match self.tracker.choice_ending_at(self.text.input(), caret).cloned() {
                Some(cwi) => self.edit_choice(cwi),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// The text control's value changed; `caret` is the caret after the change.
    pub fn handle_input(&mut self, value: impl Into<String>, caret: usize) -> Vec<MentionEvent<C>> {
        self.text.set_input(value);
        self.text.set_cursor(caret);
        self.forget_blur_caret();

        let mut events = self.tracker.resync(self.text.input());

        let Some(menu) = self.menu else {
            return events;
        };
        let caret = self.text.cursor();
        if char_at(self.text.input(), menu.trigger_position) != Some(self.config.trigger_character) || caret < menu.trigger_position
        {
            events.extend(self.hide_menu());
            return events;
        }

        let search = self.text.slice(menu.search_range(caret));
        if !self.search_regex.is_match(search) {
            events.extend(self.hide_menu());
            return events;
        }

        events.push(MentionEvent::Search(search.to_string()));
        events
    }

    pub fn handle_click(&mut self, caret: usize) -> Vec<MentionEvent<C>> {
        self.text.set_cursor(caret);
        self.forget_blur_caret();
        let Some(menu) = self.menu else {
            return Vec::new();
        };

        let caret = self.text.cursor();
        if caret <= menu.trigger_position || !self.search_regex.is_match(self.text.slice(menu.search_range(caret))) {
            return self.hide_menu();
        }
        Vec::new()
    }

    pub fn handle_blur(&mut self) -> Vec<MentionEvent<C>> {
        let caret = self.text.cursor();
        let Some(menu) = self.menu.as_mut() else {
            return Vec::new();
        };
        menu.last_caret = Some(caret);

        if self.config.close_menu_on_blur {
            return self.hide_menu();
        }
        Vec::new()
    }

    /// Type `text` at the caret one char at a time, as a keydown followed by
    /// an input notification per char.
    pub fn type_text(&mut self, text: &str) -> Vec<MentionEvent<C>> {
        let mut events = Vec::new();
        for c in text.chars() {
            events.extend(self.handle_keydown(Key::Char(c)));
            let mut next = self.text.clone();
            next.insert_char(c);
            events.extend(self.handle_input(next.input().to_string(), next.cursor()));
        }
        events
    }

    /// Insert `choice` in place of the trigger and search term.
    ///
    /// Does nothing when the menu is closed.
    pub fn select_choice(&mut self, choice: C) -> Vec<MentionEvent<C>> {
        let Some(menu) = self.menu else {
            return Vec::new();
        };

        let label = choice.label();
        let start = menu.trigger_position;
        let end = menu.insertion_end(self.text.cursor());

        // The picked choice supersedes any label being edited.
        self.tracker.abandon_editing();

        let mut next = self.text.clone();
        next.replace_range(start..end, &format!("{label} "));
        let mut events = self.handle_input(next.input().to_string(), next.cursor());

        let occurrence = self.tracker.occurrence_count(&label) + 1;
        debug!(%label, occurrence, start, "selected choice");
        let cwi = ChoiceWithIndices {
            choice,
            occurrence: Some(occurrence),
            indices: Indices::spanning(start, char_len(&label)),
        };
        events.extend(self.tracker.add_to_selected(cwi));
        self.tracker.update_indices(self.text.input());
        events.push(MentionEvent::SelectedChoicesChanged(self.tracker.selected().to_vec()));

        events.extend(self.hide_menu());
        events
    }

    /// Turn a selected choice back into a search term.
    pub fn edit_choice(&mut self, cwi: ChoiceWithIndices<C>) -> Vec<MentionEvent<C>> {
        let Some(range) = cwi.indices.range() else {
            return Vec::new();
        };
        let label = cwi.label();

        let mut events = self.tracker.start_editing(cwi);
        self.text.set_cursor(range.end);
        events.extend(self.show_menu());
        if let Some(menu) = self.menu.as_mut() {
            menu.trigger_position = range.start;
        }

        let edit_value = label.replacen(self.config.trigger_character, "", 1);
        events.push(MentionEvent::Search(edit_value));
        events
    }

    pub fn hide_menu(&mut self) -> Vec<MentionEvent<C>> {
        if self.menu.take().is_none() {
            return Vec::new();
        }

        let mut events = vec![MentionEvent::MenuHidden];
        events.extend(self.tracker.finish_editing(self.text.input()));
        events
    }

    /// The caret moved after a blur, so the caret captured on blur is stale.
    fn forget_blur_caret(&mut self) {
        if let Some(menu) = self.menu.as_mut() {
            menu.last_caret = None;
        }
    }

    fn show_menu(&mut self) -> Option<MentionEvent<C>> {
        if self.menu.is_some() {
            return None;
        }
        self.menu = Some(MenuState::new(self.text.cursor()));
        Some(MentionEvent::MenuShown)
    }
}
