//! Text buffer - the rope, the caret and the current selection
//!
//! All offsets are char indices into the rope. Every operation clamps its
//! inputs into `[0, len]`; invalid requests return `None` instead of erroring.
//! The buffer itself is not synchronized, [`crate::editor::Editor`] owns it
//! behind a lock.

use std::ops::Range;

use ropey::Rope;

/// Editable text with a caret and an optional selection
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
    caret: usize,
    selection: Option<Range<usize>>,
}

impl TextBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding `text`, caret at the start
    pub fn with_text(text: &str) -> Self {
        Self {
            rope: Rope::from(text),
            caret: 0,
            selection: None,
        }
    }

    /// Replace the whole content, caret at the start
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from(text);
        self.caret = 0;
        self.selection = None;
    }

    /// Full content
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// The underlying rope; cloning it is cheap
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Move the caret, clamped to `[0, len]`
    pub fn set_caret(&mut self, pos: usize) {
        self.caret = self.clamp(pos);
        self.selection = None;
    }

    /// Currently highlighted range, if any
    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    /// Text between `start` and `end`, both clamped
    pub fn slice(&self, start: usize, end: usize) -> String {
        let start = self.clamp(start);
        let end = self.clamp(end);
        if start >= end {
            return String::new();
        }
        self.rope.slice(start..end).to_string()
    }

    /// Insert `text` at `idx` (clamped)
    ///
    /// A caret at or after `idx` shifts right by the inserted length.
    pub fn insert(&mut self, idx: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let idx = self.clamp(idx);
        self.rope.insert(idx, text);
        if idx <= self.caret {
            self.caret += text.chars().count();
        }
        self.selection = None;
    }

    /// Insert `text` at the caret, leaving the caret after it
    pub fn insert_at_caret(&mut self, text: &str) {
        self.insert(self.caret, text);
    }

    /// Remove `[start, end)` and return the removed text
    ///
    /// Returns `None` without touching the buffer when `start > end`,
    /// `start >= len` or `end == 0`. `end` past the buffer is clamped.
    pub fn delete_range(&mut self, start: usize, end: usize) -> Option<String> {
        let len = self.len();
        if start > end || start >= len || end == 0 {
            return None;
        }
        let end = end.min(len);
        Some(self.remove(start..end))
    }

    /// Remove `text` if it is exactly what precedes the caret
    ///
    /// The caret lands where the removed span started.
    pub fn delete_before_caret(&mut self, text: &str) -> Option<String> {
        let n = text.chars().count();
        if n == 0 || n > self.caret {
            return None;
        }
        let start = self.caret - n;
        if self.rope.slice(start..self.caret) != text {
            return None;
        }
        Some(self.remove(start..self.caret))
    }

    /// Remove `text` if the buffer contains it literally starting at `at`
    pub fn delete_at(&mut self, at: usize, text: &str) -> Option<String> {
        let n = text.chars().count();
        let at = self.clamp(at);
        if n == 0 || at + n > self.len() {
            return None;
        }
        if self.rope.slice(at..at + n) != text {
            return None;
        }
        Some(self.remove(at..at + n))
    }

    /// Replace every literal, non-overlapping occurrence of `find`
    ///
    /// Returns the number of replacements. The caret keeps its place
    /// relative to the text before it.
    pub fn replace_all(&mut self, find: &str, replace: &str) -> usize {
        if find.is_empty() {
            return 0;
        }
        let text = self.text();
        let count = text.matches(find).count();
        if count == 0 {
            return 0;
        }

        let caret_byte = self.rope.char_to_byte(self.caret);
        let new_caret = text[..caret_byte].replace(find, replace).chars().count();

        self.rope = Rope::from(text.replace(find, replace));
        self.caret = self.clamp(new_caret);
        self.selection = None;
        count
    }

    /// Select `[start, end)` (clamped, order-insensitive); caret moves to `end`
    pub fn highlight(&mut self, start: usize, end: usize) {
        let start = self.clamp(start);
        let end = self.clamp(end);
        self.selection = Some(start.min(end)..start.max(end));
        self.caret = end;
    }

    /// Offset where the caret's line begins
    ///
    /// One past the last newline before the caret. A newline at offset 0
    /// does not count, so a caret on the second line of "\nabc" still
    /// reports 0.
    pub fn line_start(&self) -> usize {
        let mut idx = self.caret;
        for c in self.rope.chars_at(self.caret).reversed() {
            idx -= 1;
            if c == '\n' {
                return if idx == 0 { 0 } else { idx + 1 };
            }
        }
        0
    }

    /// First occurrence of `needle` at or after `from`, as char offsets
    pub fn find_from(&self, needle: &str, from: usize) -> Option<Range<usize>> {
        if needle.is_empty() {
            return None;
        }
        let from = self.clamp(from);
        let tail = self.rope.slice(from..).to_string();
        let byte = tail.find(needle)?;
        let start = from + tail[..byte].chars().count();
        Some(start..start + needle.chars().count())
    }

    fn remove(&mut self, range: Range<usize>) -> String {
        let removed = self.rope.slice(range.clone()).to_string();
        self.rope.remove(range.clone());
        let n = range.end - range.start;
        if self.caret >= range.end {
            self.caret -= n;
        } else if self.caret > range.start {
            self.caret = range.start;
        }
        self.selection = None;
        removed
    }

    fn clamp(&self, pos: usize) -> usize {
        pos.min(self.len())
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self::with_text(text)
    }
}
