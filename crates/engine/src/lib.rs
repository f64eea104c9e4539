//! # Mentions Engine
//!
//! Headless logic behind a mentions autocomplete: it keeps a set of selected
//! choices anchored to their labels in free-form text while the user types,
//! pastes, deletes, or undoes.
//!
//! ## Usage
//!
//! ```rust
//! use mentions_engine::{Key, MentionsInput};
//!
//! let mut input: MentionsInput<String> = MentionsInput::default();
//! input.handle_keydown(Key::Char('@'));
//! input.handle_input("@jo", 3);
//! assert_eq!(input.search_term(), Some("jo"));
//!
//! input.select_choice("@john".to_string());
//! assert_eq!(input.text(), "@john ");
//! assert_eq!(input.selected_choices()[0].indices.start, Some(0));
//! ```
//!
//! ## Architecture
//!
//! - **`locator`**: finds the Nth valid occurrence of a label in text
//! - **`tracker`**: selected / dumped / editing choice state and resync
//! - **`menu`**: trigger menu anchor
//! - **`input`**: the headless mention input driven by host events
//! - **`tag_textarea`**: template editor over a fixed tag catalog

pub mod input;
pub mod locator;
pub mod menu;
pub mod tag_textarea;
pub mod tracker;

pub use input::{Key, MentionsInput};
pub use locator::{find_string_index, locate, preceding_char_valid};
pub use menu::MenuState;
pub use mentions_types::{Choice, ChoiceWithIndices, Indices, MentionEvent, TemplateTag};
pub use tag_textarea::TagTextarea;
pub use tracker::ChoiceTracker;
