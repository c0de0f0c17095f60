//! Keymap file parsing
//!
//! A keymap file holds one declaration per line:
//!
//! ```text
//! # comment
//! ctrl+shift+c  insert "// " at start of line
//! alt+u         delete "// " at start of line   # trailing comment
//! ctrl+d        delete "foo" at caret
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Keywords and
//! modifiers are case-insensitive; the payload is a double-quoted string
//! with `\"`, `\\`, `\n`, `\t` and `\r` escapes.

use std::io::Read;
use std::path::Path;

use thiserror::Error;

use super::action::{Anchor, EditOp, KeyAction};
use super::binding::KeyMapping;
use super::types::{KeyCombo, Modifiers};

/// Errors that can occur when loading keymaps
#[derive(Debug, Error)]
pub enum KeymapError {
    /// The source could not be read (missing file, permissions, bad UTF-8)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The source was read but a declaration is malformed
    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
}

impl KeymapError {
    pub fn is_io(&self) -> bool {
        matches!(self, KeymapError::Io(_))
    }

    /// 1-based line of a parse error
    pub fn line(&self) -> Option<usize> {
        match self {
            KeymapError::Parse { line, .. } => Some(*line),
            KeymapError::Io(_) => None,
        }
    }
}

/// Load key mappings from a keymap file
pub fn load_keymap_file(path: &Path) -> Result<Vec<KeyMapping>, KeymapError> {
    let file = std::fs::File::open(path)?;
    parse_keymap_reader(file)
}

/// Parse key mappings from a byte stream
///
/// Read failures and invalid UTF-8 are reported as [`KeymapError::Io`].
pub fn parse_keymap_reader<R: Read>(mut reader: R) -> Result<Vec<KeyMapping>, KeymapError> {
    let mut source = String::new();
    reader.read_to_string(&mut source)?;
    parse_keymap(&source)
}

/// Parse key mappings from keymap text, keeping declaration order
pub fn parse_keymap(source: &str) -> Result<Vec<KeyMapping>, KeymapError> {
    let mut mappings = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mapping = parse_line(line).map_err(|(column, message)| KeymapError::Parse {
            line: idx + 1,
            column,
            message,
        })?;
        mappings.push(mapping);
    }

    Ok(mappings)
}

/// Parse a combo string like "ctrl+shift+a" into a KeyCombo
pub fn parse_combo(combo_str: &str) -> Result<KeyCombo, String> {
    let mut mods = Modifiers::NONE;
    let mut letter = None;

    for part in combo_str.split('+') {
        let part_lower = part.to_lowercase();
        match part_lower.as_str() {
            "ctrl" | "control" => mods = mods | Modifiers::CTRL,
            "alt" | "option" | "opt" => mods = mods | Modifiers::ALT,
            "shift" => mods = mods | Modifiers::SHIFT,
            "" => return Err(format!("Empty key in combo '{}'", combo_str)),
            _ => {
                let mut chars = part.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphabetic() => {
                        if letter.is_some() {
                            return Err(format!("Multiple letters in combo '{}'", combo_str));
                        }
                        letter = Some(c);
                    }
                    (Some(c), None) => {
                        return Err(format!("Key '{}' is not a letter", c));
                    }
                    _ => return Err(format!("Unknown modifier '{}'", part)),
                }
            }
        }
    }

    let letter = letter.ok_or_else(|| format!("No letter in combo '{}'", combo_str))?;
    KeyCombo::new(letter, mods).ok_or_else(|| format!("Key '{}' is not a letter", letter))
}

/// Parse an operation keyword
fn parse_op(word: &str) -> Option<EditOp> {
    match word.to_lowercase().as_str() {
        "insert" => Some(EditOp::Insert),
        "delete" => Some(EditOp::Delete),
        _ => None,
    }
}

/// Parse an anchor phrase (already split into words)
fn parse_anchor(words: &[&str]) -> Option<Anchor> {
    let phrase = words.join(" ").to_lowercase();
    match phrase.as_str() {
        "caret" => Some(Anchor::AtCaret),
        "start of line" | "line start" | "line_start" => Some(Anchor::LineStart),
        _ => None,
    }
}

/// Column-tracking scanner over one line
struct LineScanner<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> LineScanner<'a> {
    fn new(line: &'a str) -> Self {
        Self { line, pos: 0 }
    }

    /// 1-based character column of the current position
    fn column(&self) -> usize {
        self.line[..self.pos].chars().count() + 1
    }

    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Next whitespace-delimited word, with its column
    fn word(&mut self) -> Option<(usize, &'a str)> {
        self.skip_whitespace();
        let rest = self.rest();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        let column = self.column();
        self.pos += end;
        Some((column, &rest[..end]))
    }

    /// A double-quoted payload with escapes
    fn quoted(&mut self) -> Result<String, (usize, String)> {
        self.skip_whitespace();
        let start_column = self.column();
        let mut chars = self.rest().char_indices();

        match chars.next() {
            Some((_, '"')) => {}
            _ => return Err((start_column, "Expected quoted text".to_string())),
        }

        let mut text = String::new();
        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += offset + 1;
                    return Ok(text);
                }
                '\\' => {
                    let escaped = match chars.next() {
                        Some((_, '"')) => '"',
                        Some((_, '\\')) => '\\',
                        Some((_, 'n')) => '\n',
                        Some((_, 't')) => '\t',
                        Some((_, 'r')) => '\r',
                        Some((_, other)) => {
                            let column = start_column + self.rest()[..offset].chars().count();
                            return Err((column, format!("Invalid escape '\\{}'", other)));
                        }
                        None => break,
                    };
                    text.push(escaped);
                }
                c => text.push(c),
            }
        }

        Err((start_column, "Unterminated text".to_string()))
    }
}

/// Parse one non-blank, non-comment line
///
/// Errors carry the 1-based column and a message.
fn parse_line(line: &str) -> Result<KeyMapping, (usize, String)> {
    let mut scanner = LineScanner::new(line);

    let (column, combo_str) = scanner
        .word()
        .ok_or_else(|| (scanner.column(), "Expected key combo".to_string()))?;
    let combo = parse_combo(combo_str).map_err(|msg| (column, msg))?;

    let (column, op_word) = scanner
        .word()
        .ok_or_else(|| (scanner.column(), "Expected 'insert' or 'delete'".to_string()))?;
    let op = parse_op(op_word).ok_or_else(|| (column, format!("Unknown action '{}'", op_word)))?;

    let text = scanner.quoted()?;

    match scanner.word() {
        Some((_, at)) if at.eq_ignore_ascii_case("at") => {}
        Some((column, other)) => return Err((column, format!("Expected 'at', found '{}'", other))),
        None => return Err((scanner.column(), "Expected 'at' after text".to_string())),
    }

    scanner.skip_whitespace();
    let anchor_column = scanner.column();
    let anchor_src = scanner.rest().split('#').next().unwrap_or_default();
    let words: Vec<&str> = anchor_src.split_whitespace().collect();
    if words.is_empty() {
        return Err((anchor_column, "Expected 'caret' or 'start of line'".to_string()));
    }
    let anchor = parse_anchor(&words)
        .ok_or_else(|| (anchor_column, format!("Unknown position '{}'", words.join(" "))))?;

    Ok(KeyMapping::new(combo, KeyAction::new(op, anchor, text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_combo() {
        let combo = parse_combo("a").unwrap();
        assert_eq!(combo.key(), 'a');
        assert!(combo.mods().is_empty());
    }

    #[test]
    fn test_parse_combo_with_modifiers() {
        let combo = parse_combo("Ctrl+Shift+S").unwrap();
        assert_eq!(combo.key(), 's');
        assert!(combo.mods().ctrl());
        assert!(combo.mods().shift());
        assert!(!combo.mods().alt());
    }

    #[test]
    fn test_parse_combo_duplicate_modifiers() {
        assert_eq!(parse_combo("ctrl+ctrl+x"), parse_combo("ctrl+x"));
    }

    #[test]
    fn test_parse_combo_errors() {
        assert!(parse_combo("ctrl+shift").unwrap_err().contains("No letter"));
        assert!(parse_combo("ctrl+a+b").unwrap_err().contains("Multiple letters"));
        assert!(parse_combo("hyper+a").unwrap_err().contains("Unknown modifier"));
        assert!(parse_combo("ctrl+1").unwrap_err().contains("not a letter"));
        assert!(parse_combo("ctrl++a").unwrap_err().contains("Empty key"));
    }

    #[test]
    fn test_parse_line() {
        let mapping = parse_line("ctrl+d delete \"foo\" at caret").unwrap();
        assert_eq!(mapping.combo, parse_combo("ctrl+d").unwrap());
        assert_eq!(mapping.action, KeyAction::delete(Anchor::AtCaret, "foo"));
    }

    #[test]
    fn test_parse_line_start_spellings() {
        for anchor in ["start of line", "START OF LINE", "line start", "line_start"] {
            let line = format!("alt+c insert \"# \" at {}", anchor);
            let mapping = parse_line(&line).unwrap();
            assert_eq!(mapping.action.anchor, Anchor::LineStart, "{}", anchor);
        }
    }

    #[test]
    fn test_parse_escapes() {
        let mapping = parse_line(r#"x insert "a\"b\\c\n\t" at caret"#).unwrap();
        assert_eq!(mapping.action.text, "a\"b\\c\n\t");
    }

    #[test]
    fn test_parse_trailing_comment() {
        let mapping = parse_line("x insert \"#\" at caret # note").unwrap();
        assert_eq!(mapping.action.text, "#");
        assert_eq!(mapping.action.anchor, Anchor::AtCaret);
    }

    #[test]
    fn test_parse_line_errors_carry_column() {
        let (column, msg) = parse_line("ctrl+a paste \"x\" at caret").unwrap_err();
        assert_eq!(column, 8);
        assert!(msg.contains("Unknown action"));

        let (_, msg) = parse_line("ctrl+a insert x at caret").unwrap_err();
        assert!(msg.contains("Expected quoted text"));

        let (_, msg) = parse_line("ctrl+a insert \"x at caret").unwrap_err();
        assert!(msg.contains("Unterminated"));

        let (_, msg) = parse_line("ctrl+a insert \"x\" on caret").unwrap_err();
        assert!(msg.contains("Expected 'at'"));

        let (_, msg) = parse_line("ctrl+a insert \"x\" at").unwrap_err();
        assert!(msg.contains("Expected 'caret'"));

        let (_, msg) = parse_line("ctrl+a insert \"x\" at caret now").unwrap_err();
        assert!(msg.contains("Unknown position"));

        let (_, msg) = parse_line(r#"ctrl+a insert "\q" at caret"#).unwrap_err();
        assert!(msg.contains("Invalid escape"));
    }

    #[test]
    fn test_parse_keymap_skips_blank_and_comments() {
        let source = "\n# heading\n   \nctrl+a insert \"x\" at caret\n  # indented comment\nb delete \"y\" at line start\n";
        let mappings = parse_keymap(source).unwrap();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].action.text, "x");
        assert_eq!(mappings[1].action.anchor, Anchor::LineStart);
    }

    #[test]
    fn test_parse_keymap_reports_line() {
        let source = "ctrl+a insert \"x\" at caret\n\nctrl+q frobnicate \"y\" at caret\n";
        let err = parse_keymap(source).unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(err.to_string().contains("line 3"));
        assert!(!err.is_io());
    }

    #[test]
    fn test_reader_invalid_utf8_is_io() {
        let bytes: &[u8] = &[0x61, 0xff, 0xfe];
        let err = parse_keymap_reader(bytes).unwrap_err();
        assert!(err.is_io());
    }
}
