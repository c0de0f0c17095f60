//! Key actions: a described text edit bound to a combo

use std::fmt;

/// What the action does with its text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditOp {
    Insert,
    Delete,
}

/// Where the action applies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// At the current caret position
    AtCaret,
    /// At the start of the caret's line
    LineStart,
}

/// An immutable description of a text edit
///
/// One of:
/// - insert `text` at the caret
/// - insert `text` at the start of the line
/// - delete `text` at the caret (the text just before it)
/// - delete `text` at the start of the line
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyAction {
    pub op: EditOp,
    pub anchor: Anchor,
    pub text: String,
}

impl KeyAction {
    pub fn new(op: EditOp, anchor: Anchor, text: impl Into<String>) -> Self {
        Self {
            op,
            anchor,
            text: text.into(),
        }
    }

    pub fn insert(anchor: Anchor, text: impl Into<String>) -> Self {
        Self::new(EditOp::Insert, anchor, text)
    }

    pub fn delete(anchor: Anchor, text: impl Into<String>) -> Self {
        Self::new(EditOp::Delete, anchor, text)
    }

    /// Human-readable description, e.g. `insert "// " at start of line`
    pub fn describe(&self) -> String {
        format!("{} \"{}\" at {}", self.op, self.text, self.anchor)
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOp::Insert => write!(f, "insert"),
            EditOp::Delete => write!(f, "delete"),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::AtCaret => write!(f, "caret"),
            Anchor::LineStart => write!(f, "start of line"),
        }
    }
}

/// Canonical keymap form with the payload escaped, e.g. `insert "a\"b" at caret`
impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\" at {}", self.op, escape(&self.text), self.anchor)
    }
}

/// Escape a payload for the keymap format
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let action = KeyAction::insert(Anchor::LineStart, "// ");
        assert_eq!(action.describe(), "insert \"// \" at start of line");

        let action = KeyAction::delete(Anchor::AtCaret, "x");
        assert_eq!(action.describe(), "delete \"x\" at caret");
    }

    #[test]
    fn test_display_escapes_payload() {
        let action = KeyAction::insert(Anchor::AtCaret, "say \"hi\"\n");
        assert_eq!(action.to_string(), r#"insert "say \"hi\"\n" at caret"#);
    }
}
