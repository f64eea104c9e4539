use serde::Serialize;

/// Open choices menu, anchored at the trigger character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MenuState {
    /// Char offset of the trigger character that opened the menu
    pub trigger_position: usize,
    /// Caret captured when the text control lost focus
    pub last_caret: Option<usize>,
}

impl MenuState {
    pub fn new(trigger_position: usize) -> Self {
        Self {
            trigger_position,
            last_caret: None,
        }
    }

    /// Char range of the search term typed after the trigger, up to `caret`.
    pub fn search_range(&self, caret: usize) -> std::ops::Range<usize> {
        let start = self.trigger_position + 1;
        start..caret.max(start)
    }

    /// Caret to replace up to when a choice is picked.
    ///
    /// Prefers the caret recorded on blur, since picking from the menu may
    /// have moved focus away from the text control.
    pub fn insertion_end(&self, caret: usize) -> usize {
        match self.last_caret {
            Some(last) if last > 0 => last,
            _ => caret,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_range_never_inverts() {
        let menu = MenuState::new(4);
        assert_eq!(menu.search_range(8), 5..8);
        assert_eq!(menu.search_range(4), 5..5);
    }

    #[test]
    fn insertion_prefers_blur_caret() {
        let mut menu = MenuState::new(0);
        assert_eq!(menu.insertion_end(3), 3);
        menu.last_caret = Some(6);
        assert_eq!(menu.insertion_end(3), 6);
    }
}
