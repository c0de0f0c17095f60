//! KeyMapping: a combo paired with the action it triggers

use std::fmt;

use super::action::KeyAction;
use super::types::KeyCombo;

/// A single mapping from a key combo to an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMapping {
    pub combo: KeyCombo,
    pub action: KeyAction,
}

impl KeyMapping {
    pub fn new(combo: KeyCombo, action: KeyAction) -> Self {
        Self { combo, action }
    }

    /// Get display string for this mapping, e.g. `Ctrl+D --> delete "x" at caret`
    pub fn display_string(&self) -> String {
        format!("{} --> {}", self.combo.display_string(), self.action.describe())
    }
}

/// Renders one keymap declaration; parsing it back yields an equal mapping
impl fmt::Display for KeyMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.combo, self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::action::Anchor;
    use crate::keymap::types::Modifiers;

    #[test]
    fn test_mapping_display() {
        let combo = KeyCombo::new('d', Modifiers::CTRL | Modifiers::ALT).unwrap();
        let mapping = KeyMapping::new(combo, KeyAction::delete(Anchor::LineStart, "# "));

        assert_eq!(mapping.to_string(), "ctrl+alt+d delete \"# \" at start of line");
        assert_eq!(
            mapping.display_string(),
            "Ctrl+Alt+D --> delete \"# \" at start of line"
        );
    }
}
