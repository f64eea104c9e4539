use std::fmt::Debug;
use std::ops::Range;

use serde::{Deserialize, Serialize};

pub mod tag;

pub use tag::TemplateTag;

/// A value that can be inserted into text and tracked as a mention.
///
/// The rendered label doubles as the choice identity: two tracked entries refer
/// to the same mention when their labels and occurrence ordinals match.
pub trait Choice: Clone + PartialEq + Debug {
    /// Textual rendering of the choice as it appears in the text body.
    fn label(&self) -> String;
}

impl Choice for String {
    fn label(&self) -> String {
        self.clone()
    }
}

/// Half-open char range `[start, end)` of a choice inside the current text.
///
/// Unresolved ranges serialize as `-1` on both ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Indices {
    #[serde(with = "signed_offset")]
    pub start: Option<usize>,
    #[serde(with = "signed_offset")]
    pub end: Option<usize>,
}

impl Indices {
    pub const UNRESOLVED: Indices = Indices { start: None, end: None };

    /// Build a resolved range starting at `start` and spanning `len` chars.
    pub fn spanning(start: usize, len: usize) -> Self {
        Self {
            start: Some(start),
            end: Some(start + len),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn range(&self) -> Option<Range<usize>> {
        Some(self.start?..self.end?)
    }
}

/// A selected choice anchored to one occurrence of its label in the text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChoiceWithIndices<C> {
    /// The opaque choice value.
    pub choice: C,
    /// 1-based rank among all instances of the same label, `None` when unresolved.
    #[serde(with = "signed_offset")]
    pub occurrence: Option<usize>,
    /// Location of the label in the text.
    pub indices: Indices,
}

impl<C: Choice> ChoiceWithIndices<C> {
    /// Wrap a choice whose position is not yet known.
    pub fn unresolved(choice: C) -> Self {
        Self {
            choice,
            occurrence: None,
            indices: Indices::UNRESOLVED,
        }
    }

    pub fn label(&self) -> String {
        self.choice.label()
    }

    pub fn is_resolved(&self) -> bool {
        self.occurrence.is_some() && self.indices.start.is_some()
    }

    /// Whether `other` tracks the same label at the same ordinal.
    pub fn same_identity(&self, other: &ChoiceWithIndices<C>) -> bool {
        self.occurrence == other.occurrence && self.label() == other.label()
    }
}

/// Notifications produced by the mention widget in response to input events.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum MentionEvent<C> {
    /// The choices menu became visible.
    MenuShown,
    /// The choices menu was dismissed.
    MenuHidden,
    /// A choice entered the selected set.
    ChoiceSelected(ChoiceWithIndices<C>),
    /// A choice left the selected set.
    ChoiceRemoved(ChoiceWithIndices<C>),
    /// The selected set or any of its indices changed.
    SelectedChoicesChanged(Vec<ChoiceWithIndices<C>>),
    /// Search term typed after the trigger character.
    Search(String),
}

/// Serializes `Option<usize>` offsets with `-1` standing in for `None`.
mod signed_offset {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(offset) => serializer.serialize_i64(*offset as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(usize::try_from(raw).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unresolved_indices_serialize_as_negative_one() {
        let cwi = ChoiceWithIndices::unresolved("@TED".to_string());
        let value = serde_json::to_value(&cwi).unwrap();
        assert_eq!(
            value,
            json!({"choice": "@TED", "occurrence": -1, "indices": {"start": -1, "end": -1}})
        );
    }

    #[test]
    fn negative_offsets_deserialize_as_unresolved() {
        let cwi: ChoiceWithIndices<String> =
            serde_json::from_value(json!({"choice": "@a", "occurrence": 2, "indices": {"start": -1, "end": 4}})).unwrap();
        assert_eq!(cwi.occurrence, Some(2));
        assert_eq!(cwi.indices.start, None);
        assert_eq!(cwi.indices.end, Some(4));
        assert!(!cwi.is_resolved());
    }

    #[test]
    fn identity_ignores_indices() {
        let mut a = ChoiceWithIndices::unresolved("@a".to_string());
        a.occurrence = Some(1);
        a.indices = Indices::spanning(0, 2);
        let mut b = a.clone();
        b.indices = Indices::spanning(10, 2);
        assert!(a.same_identity(&b));
        b.occurrence = Some(2);
        assert!(!a.same_identity(&b));
    }

    #[test]
    fn events_are_tagged() {
        let event: MentionEvent<String> = MentionEvent::Search("jo".into());
        assert_eq!(serde_json::to_value(&event).unwrap(), json!({"event": "search", "payload": "jo"}));
        let hidden: MentionEvent<String> = MentionEvent::MenuHidden;
        assert_eq!(serde_json::to_value(&hidden).unwrap(), json!({"event": "menu_hidden"}));
    }
}
