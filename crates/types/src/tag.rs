use serde::{Deserialize, Serialize};

use crate::Choice;

/// A named placeholder insertable into a template body as `[value]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateTag {
    /// Human-readable name used for filtering.
    pub name: String,
    /// Value rendered inside the brackets.
    pub value: String,
}

impl TemplateTag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Choice for TemplateTag {
    fn label(&self) -> String {
        format!("[{}]", self.value)
    }
}
