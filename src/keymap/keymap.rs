//! Keymap struct for storing and looking up key mappings

use super::action::KeyAction;
use super::binding::KeyMapping;
use super::types::{KeyCombo, KeyEvent};

/// The keymap stores mappings in declaration order and handles lookup
///
/// Order matters: the first mapping whose combo matches wins. Later mappings
/// with an identical combo are unreachable, which is not an error.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    mappings: Vec<KeyMapping>,
}

impl Keymap {
    /// Create an empty keymap
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a keymap with the given mappings, keeping their order
    pub fn with_mappings(mappings: Vec<KeyMapping>) -> Self {
        Self { mappings }
    }

    /// Append a mapping at the lowest priority
    pub fn add_mapping(&mut self, mapping: KeyMapping) {
        self.mappings.push(mapping);
    }

    /// Find the action for a key press (first match)
    pub fn lookup(&self, event: &KeyEvent) -> Option<&KeyAction> {
        self.mappings
            .iter()
            .find(|m| event.is_combo(&m.combo))
            .map(|m| &m.action)
    }

    /// Find the first mapping declared for exactly this combo
    pub fn mapping_for(&self, combo: &KeyCombo) -> Option<&KeyMapping> {
        self.mappings.iter().find(|m| m.combo == *combo)
    }

    /// Indices of mappings shadowed by an earlier mapping with the same combo
    pub fn unreachable(&self) -> Vec<usize> {
        self.mappings
            .iter()
            .enumerate()
            .filter(|(i, m)| self.mappings[..*i].iter().any(|prev| prev.combo == m.combo))
            .map(|(i, _)| i)
            .collect()
    }

    /// Get all mappings
    pub fn mappings(&self) -> &[KeyMapping] {
        &self.mappings
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::action::Anchor;
    use crate::keymap::types::{FunctionKey, Modifiers};

    fn ctrl(c: char) -> KeyCombo {
        KeyCombo::new(c, Modifiers::CTRL).unwrap()
    }

    #[test]
    fn test_single_mapping_lookup() {
        let keymap = Keymap::with_mappings(vec![KeyMapping::new(
            ctrl('s'),
            KeyAction::insert(Anchor::AtCaret, "x"),
        )]);

        let hit = keymap.lookup(&KeyEvent::char('s', Modifiers::CTRL));
        assert_eq!(hit, Some(&KeyAction::insert(Anchor::AtCaret, "x")));
        assert_eq!(keymap.lookup(&KeyEvent::char('k', Modifiers::CTRL)), None);
    }

    #[test]
    fn test_first_match_wins() {
        let keymap = Keymap::with_mappings(vec![
            KeyMapping::new(ctrl('a'), KeyAction::insert(Anchor::AtCaret, "first")),
            KeyMapping::new(ctrl('a'), KeyAction::insert(Anchor::AtCaret, "second")),
        ]);

        let hit = keymap.lookup(&KeyEvent::char('A', Modifiers::CTRL)).unwrap();
        assert_eq!(hit.text, "first");
        assert_eq!(keymap.unreachable(), vec![1]);
    }

    #[test]
    fn test_extra_modifier_reaches_other_mapping() {
        let keymap = Keymap::with_mappings(vec![
            KeyMapping::new(ctrl('a'), KeyAction::insert(Anchor::AtCaret, "ctrl")),
            KeyMapping::new(
                KeyCombo::new('a', Modifiers::CTRL | Modifiers::SHIFT).unwrap(),
                KeyAction::insert(Anchor::AtCaret, "ctrl-shift"),
            ),
        ]);

        let hit = keymap
            .lookup(&KeyEvent::char('a', Modifiers::CTRL | Modifiers::SHIFT))
            .unwrap();
        assert_eq!(hit.text, "ctrl-shift");
        assert!(keymap.unreachable().is_empty());
    }

    #[test]
    fn test_function_keys_never_match() {
        let keymap = Keymap::with_mappings(vec![KeyMapping::new(
            KeyCombo::letter('f').unwrap(),
            KeyAction::insert(Anchor::AtCaret, "f"),
        )]);

        assert_eq!(
            keymap.lookup(&KeyEvent::function(FunctionKey::F1, Modifiers::NONE)),
            None
        );
    }
}
