//! Selected-choice bookkeeping.
//!
//! The tracker keeps choices anchored to the live text. Every operation takes
//! the current text, re-derives positions from scratch with the occurrence
//! locator, and returns the events it produced instead of emitting them.

use std::collections::HashMap;

use mentions_types::{Choice, ChoiceWithIndices, Indices, MentionEvent};
use mentions_util::char_len;
use tracing::debug;

use crate::locator::locate;

#[derive(Clone, Debug, PartialEq)]
pub struct ChoiceTracker<C> {
    /// Choices currently anchored in the text, in selection order
    selected: Vec<ChoiceWithIndices<C>>,
    /// Choices whose label disappeared, kept for restoration on undo
    dumped: Vec<ChoiceWithIndices<C>>,
    /// Choice taken out of the selection while its label is being edited
    editing: Option<ChoiceWithIndices<C>>,
}

impl<C> Default for ChoiceTracker<C> {
    fn default() -> Self {
        Self {
            selected: Vec::new(),
            dumped: Vec::new(),
            editing: None,
        }
    }
}

impl<C: Choice> ChoiceTracker<C> {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== SELECTORS =====

    pub fn selected(&self) -> &[ChoiceWithIndices<C>] {
        &self.selected
    }

    pub fn dumped(&self) -> &[ChoiceWithIndices<C>] {
        &self.dumped
    }

    pub fn editing(&self) -> Option<&ChoiceWithIndices<C>> {
        self.editing.as_ref()
    }

    /// Labels of all selected choices; these drive superstring masking.
    pub fn labels(&self) -> Vec<String> {
        self.selected.iter().map(ChoiceWithIndices::label).collect()
    }

    /// Number of selected choices rendering as `label`.
    pub fn occurrence_count(&self, label: &str) -> usize {
        self.selected.iter().filter(|cwi| cwi.label() == label).count()
    }

    /// Locate `label` at `occurrence` against the selected labels.
    pub fn locate_choice(&self, text: &str, label: &str, occurrence: usize) -> Option<usize> {
        locate(text, label, occurrence, &self.labels())
    }

    /// Selected choice whose label ends exactly at `caret`.
    pub fn choice_ending_at(&self, text: &str, caret: usize) -> Option<&ChoiceWithIndices<C>> {
        self.selected.iter().find(|cwi| {
            let label = cwi.label();
            self.locate_choice(text, &label, cwi.occurrence.unwrap_or(1))
                .is_some_and(|start| start + char_len(&label) == caret)
        })
    }

    fn is_selected(&self, cwi: &ChoiceWithIndices<C>) -> bool {
        self.selected.iter().any(|selected| selected.same_identity(cwi))
    }

    fn exists_in(&self, text: &str, cwi: &ChoiceWithIndices<C>) -> bool {
        self.locate_choice(text, &cwi.label(), cwi.occurrence.unwrap_or(1)).is_some()
    }

    // ===== REDUCERS =====

    /// Re-derive ordinals and ranges for every selected choice.
    ///
    /// Ordinals are handed out per label in selection order; each one is then
    /// resolved against the text. Unresolvable entries keep their ordinal but
    /// lose their range.
    pub fn update_indices(&mut self, text: &str) {
        let labels = self.labels();
        let ordinals = self.ordinals();
        for (cwi, occurrence) in self.selected.iter_mut().zip(ordinals) {
            let label = cwi.label();
            cwi.occurrence = Some(occurrence);
            cwi.indices = match locate(text, &label, occurrence, &labels) {
                Some(start) => Indices::spanning(start, char_len(&label)),
                None => Indices::UNRESOLVED,
            };
        }
    }

    /// Per-label ordinals of the selection as it stands now, in selection order.
    fn ordinals(&self) -> Vec<usize> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        self.selected
            .iter()
            .map(|cwi| {
                let count = counts.entry(cwi.label()).or_insert(0);
                *count += 1;
                *count
            })
            .collect()
    }

    pub fn add_to_selected(&mut self, cwi: ChoiceWithIndices<C>) -> Option<MentionEvent<C>> {
        if self.is_selected(&cwi) {
            return None;
        }
        self.selected.push(cwi.clone());
        Some(MentionEvent::ChoiceSelected(cwi))
    }

    pub fn remove_from_selected(&mut self, cwi: &ChoiceWithIndices<C>) -> Option<MentionEvent<C>> {
        let position = self.selected.iter().position(|selected| selected.same_identity(cwi))?;
        let removed = self.selected.remove(position);
        Some(MentionEvent::ChoiceRemoved(removed))
    }

    /// Move selected choices whose label can no longer be found into the dump.
    ///
    /// Presence is checked with the ordinals the current selection would get,
    /// not the stored ones: once an earlier choice with the same label leaves
    /// the selection, the later ones shift down an ordinal. Dumped entries keep
    /// their last known indices.
    pub fn dump_non_existing(&mut self, text: &str) -> Vec<MentionEvent<C>> {
        let labels = self.labels();
        let to_dump: Vec<_> = self
            .selected
            .iter()
            .zip(self.ordinals())
            .filter(|(cwi, occurrence)| locate(text, &cwi.label(), *occurrence, &labels).is_none())
            .map(|(cwi, _)| cwi.clone())
            .collect();

        let mut events = Vec::new();
        for cwi in to_dump {
            debug!(label = %cwi.label(), occurrence = ?cwi.occurrence, "dumping choice missing from text");
            events.extend(self.remove_from_selected(&cwi));
            self.dumped.push(cwi);
        }
        events
    }

    /// Restore dumped choices whose label reappeared and that are not selected.
    pub fn retrieve_existing(&mut self, text: &str) -> Vec<MentionEvent<C>> {
        let to_retrieve: Vec<_> = self
            .dumped
            .iter()
            .filter(|cwi| self.exists_in(text, cwi) && !self.is_selected(cwi))
            .cloned()
            .collect();

        let mut events = Vec::new();
        for cwi in to_retrieve {
            debug!(label = %cwi.label(), occurrence = ?cwi.occurrence, "retrieving dumped choice");
            if let Some(position) = self.dumped.iter().position(|dumped| dumped.same_identity(&cwi)) {
                self.dumped.remove(position);
            }
            events.extend(self.add_to_selected(cwi));
        }
        events
    }

    /// Dump, retrieve, and re-index against `text`.
    ///
    /// Emits `SelectedChoicesChanged` when the selection differs afterwards.
    pub fn resync(&mut self, text: &str) -> Vec<MentionEvent<C>> {
        let previous = self.selected.clone();
        let mut events = self.dump_non_existing(text);
        events.extend(self.retrieve_existing(text));
        self.update_indices(text);
        if self.selected != previous {
            events.push(MentionEvent::SelectedChoicesChanged(self.selected.clone()));
        }
        events
    }

    /// Replace the selection with preset choices found in `text`.
    ///
    /// Presets that cannot be located are dropped.
    pub fn set_presets(&mut self, text: &str, choices: Vec<C>) -> Vec<MentionEvent<C>> {
        let previous = std::mem::take(&mut self.selected);
        self.selected = choices.into_iter().map(ChoiceWithIndices::unresolved).collect();
        self.update_indices(text);
        self.selected.retain(ChoiceWithIndices::is_resolved);

        if self.selected != previous {
            vec![MentionEvent::SelectedChoicesChanged(self.selected.clone())]
        } else {
            Vec::new()
        }
    }

    /// Take `cwi` out of the selection while the user edits its label.
    pub fn start_editing(&mut self, cwi: ChoiceWithIndices<C>) -> Vec<MentionEvent<C>> {
        let mut events: Vec<_> = self.remove_from_selected(&cwi).into_iter().collect();
        self.editing = Some(cwi);
        events.push(MentionEvent::SelectedChoicesChanged(self.selected.clone()));
        events
    }

    /// Drop the editing choice without restoring it.
    pub fn abandon_editing(&mut self) -> Option<ChoiceWithIndices<C>> {
        self.editing.take()
    }

    /// Finish editing: restore the choice when its label, followed by a space,
    /// is still present at its ordinal.
    pub fn finish_editing(&mut self, text: &str) -> Vec<MentionEvent<C>> {
        let Some(editing) = self.editing.take() else {
            return Vec::new();
        };

        let label = format!("{} ", editing.label());
        let label_exists = self.locate_choice(text, &label, editing.occurrence.unwrap_or(1)).is_some();
        if !label_exists || self.is_selected(&editing) {
            return Vec::new();
        }

        let mut events: Vec<_> = self.add_to_selected(editing).into_iter().collect();
        self.update_indices(text);
        events.push(MentionEvent::SelectedChoicesChanged(self.selected.clone()));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cwi(label: &str, occurrence: usize, start: usize) -> ChoiceWithIndices<String> {
        ChoiceWithIndices {
            choice: label.to_string(),
            occurrence: Some(occurrence),
            indices: Indices::spanning(start, label.chars().count()),
        }
    }

    fn tracker_with(text: &str, labels: &[&str]) -> ChoiceTracker<String> {
        let mut tracker = ChoiceTracker::new();
        tracker.set_presets(text, labels.iter().map(|label| label.to_string()).collect());
        tracker
    }

    #[test]
    fn presets_resolve_and_drop_missing() {
        let mut tracker = ChoiceTracker::new();
        let events = tracker.set_presets("hi @ann and @bob", vec!["@bob".into(), "@zed".into(), "@ann".into()]);
        assert_eq!(tracker.selected(), &[cwi("@bob", 1, 12), cwi("@ann", 1, 3)]);
        assert_eq!(events, vec![MentionEvent::SelectedChoicesChanged(tracker.selected().to_vec())]);

        let again = tracker.set_presets("hi @ann and @bob", vec!["@bob".into(), "@ann".into()]);
        assert!(again.is_empty());
    }

    #[test]
    fn repeated_labels_get_ordinals_left_to_right() {
        let tracker = tracker_with("@a x @a y @a", &["@a", "@a", "@a"]);
        assert_eq!(tracker.selected(), &[cwi("@a", 1, 0), cwi("@a", 2, 5), cwi("@a", 3, 10)]);
    }

    #[test]
    fn update_indices_follows_edits() {
        let mut tracker = tracker_with("@a and @bc", &["@a", "@bc"]);
        tracker.update_indices("well, @a and @bc");
        assert_eq!(tracker.selected(), &[cwi("@a", 1, 6), cwi("@bc", 1, 13)]);
    }

    #[test]
    fn deletion_dumps_and_undo_retrieves() {
        let mut tracker = tracker_with("@a and @b", &["@a", "@b"]);

        let events = tracker.resync("@a and ");
        assert_eq!(tracker.selected(), &[cwi("@a", 1, 0)]);
        assert_eq!(tracker.dumped(), &[cwi("@b", 1, 7)]);
        assert_eq!(events[0], MentionEvent::ChoiceRemoved(cwi("@b", 1, 7)));
        assert!(matches!(events.last(), Some(MentionEvent::SelectedChoicesChanged(list)) if list.len() == 1));

        let events = tracker.resync("@a and @b");
        assert!(tracker.dumped().is_empty());
        assert_eq!(tracker.selected(), &[cwi("@a", 1, 0), cwi("@b", 1, 7)]);
        assert_eq!(events[0], MentionEvent::ChoiceSelected(cwi("@b", 1, 7)));
    }

    #[test]
    fn resync_renumbers_before_dumping() {
        let mut tracker = tracker_with("@ann @ann ", &["@ann", "@ann"]);
        let first = tracker.selected()[0].clone();
        tracker.start_editing(first);

        let events = tracker.resync("@an @ann ");
        assert_eq!(tracker.selected(), &[cwi("@ann", 1, 4)]);
        assert!(tracker.dumped().is_empty());
        assert_eq!(events, vec![MentionEvent::SelectedChoicesChanged(vec![cwi("@ann", 1, 4)])]);
    }

    #[test]
    fn removing_one_of_two_identical_labels_dumps_one() {
        let mut tracker = tracker_with("@a x @a", &["@a", "@a"]);
        tracker.resync("@a x ");
        assert_eq!(tracker.selected(), &[cwi("@a", 1, 0)]);
        assert_eq!(tracker.dumped(), &[cwi("@a", 2, 5)]);
    }

    #[test]
    fn resync_without_changes_is_silent() {
        let mut tracker = tracker_with("@a and @b", &["@a", "@b"]);
        assert!(tracker.resync("@a and @b").is_empty());
        assert!(tracker.resync("@a and @b").is_empty());
    }

    #[test]
    fn select_all_and_paste_dumps_everything() {
        let mut tracker = tracker_with("@a @b @a", &["@a", "@b", "@a"]);
        tracker.resync("pasted over");
        assert!(tracker.selected().is_empty());
        assert_eq!(tracker.dumped().len(), 3);
    }

    #[test]
    fn superstring_labels_do_not_shadow() {
        let tracker = tracker_with("@TEDEducation and @TED", &["@TED", "@TEDEducation"]);
        assert_eq!(tracker.selected(), &[cwi("@TED", 1, 18), cwi("@TEDEducation", 1, 0)]);
    }

    #[test]
    fn add_and_remove_are_identity_checked() {
        let mut tracker = ChoiceTracker::new();
        assert!(tracker.add_to_selected(cwi("@a", 1, 0)).is_some());
        assert!(tracker.add_to_selected(cwi("@a", 1, 9)).is_none());
        assert!(tracker.add_to_selected(cwi("@a", 2, 9)).is_some());
        assert_eq!(tracker.occurrence_count("@a"), 2);
        assert_eq!(tracker.remove_from_selected(&cwi("@a", 2, 0)), Some(MentionEvent::ChoiceRemoved(cwi("@a", 2, 9))));
        assert!(tracker.remove_from_selected(&cwi("@b", 1, 0)).is_none());
    }

    #[test]
    fn editing_restores_untouched_label() {
        let mut tracker = tracker_with("@ann hi", &["@ann"]);
        let chosen = tracker.selected()[0].clone();
        tracker.start_editing(chosen.clone());
        assert!(tracker.selected().is_empty());
        assert_eq!(tracker.editing(), Some(&chosen));

        let events = tracker.finish_editing("@ann hi");
        assert_eq!(tracker.selected(), &[chosen]);
        assert!(tracker.editing().is_none());
        assert!(matches!(events[0], MentionEvent::ChoiceSelected(_)));
    }

    #[test]
    fn editing_drops_changed_label() {
        let mut tracker = tracker_with("@ann hi", &["@ann"]);
        let chosen = tracker.selected()[0].clone();
        tracker.start_editing(chosen);
        assert!(tracker.finish_editing("@an hi").is_empty());
        assert!(tracker.selected().is_empty());
        assert!(tracker.editing().is_none());
    }

    #[test]
    fn choice_ending_at_caret() {
        let tracker = tracker_with("say @bob now", &["@bob"]);
        assert_eq!(tracker.choice_ending_at("say @bob now", 8).map(ChoiceWithIndices::label), Some("@bob".into()));
        assert!(tracker.choice_ending_at("say @bob now", 7).is_none());
    }
}
