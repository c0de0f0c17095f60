//! Find: prompt for a term and highlight its next occurrence after the caret

use std::ops::Range;
use std::sync::Arc;

use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

use crate::api::{EditorApi, FunctionKey, Locale};
use crate::plugins::Plugin;

#[derive(Debug, Default)]
pub struct FindPlugin;

impl FindPlugin {
    pub const ID: &'static str = "plume.FindPlugin";
}

struct Strings {
    name: &'static str,
    button: &'static str,
    prompt: &'static str,
}

fn strings(locale: &Locale) -> Strings {
    match locale.language().as_str() {
        "fr" => Strings {
            name: "Recherche",
            button: "Rechercher",
            prompt: "Texte à rechercher :",
        },
        "de" => Strings {
            name: "Suche",
            button: "Suchen",
            prompt: "Suchbegriff eingeben:",
        },
        _ => Strings {
            name: "Find",
            button: "Find",
            prompt: "Enter a search term:",
        },
    }
}

/// Locate `term` in `text` (the text after the caret), matching NFC forms
///
/// The range is in chars of `text` itself, relative to the caret, so a
/// decomposed sequence before or inside the match does not shift it.
pub fn find_after_caret(text: &str, term: &str) -> Option<Range<usize>> {
    let term: String = term.nfc().collect();
    if term.is_empty() {
        return None;
    }

    let segments = Segments::new(text);
    let byte = segments.normalized.find(&term)?;
    let start = segments.normalized[..byte].chars().count();
    segments.to_source(start..start + term.chars().count())
}

/// One run of a starter and its combining marks
struct Segment {
    /// Chars of the source text
    source: Range<usize>,
    /// Chars of the normalized text
    normalized: Range<usize>,
}

/// `text` normalized one segment at a time, with the offsets of each piece
struct Segments {
    normalized: String,
    table: Vec<Segment>,
}

impl Segments {
    fn new(text: &str) -> Self {
        let mut normalized = String::with_capacity(text.len());
        let mut table = Vec::new();
        let mut pending = String::new();
        let mut source_start = 0;
        let mut normalized_start = 0;

        let mut flush = |pending: &mut String, source_end: usize| {
            if pending.is_empty() {
                return;
            }
            let before = normalized.len();
            normalized.extend(pending.nfc());
            let normalized_end = normalized_start + normalized[before..].chars().count();
            table.push(Segment {
                source: source_start..source_end,
                normalized: normalized_start..normalized_end,
            });
            source_start = source_end;
            normalized_start = normalized_end;
            pending.clear();
        };

        for (i, c) in text.chars().enumerate() {
            if canonical_combining_class(c) == 0 {
                flush(&mut pending, i);
            }
            pending.push(c);
        }
        flush(&mut pending, text.chars().count());

        Self { normalized, table }
    }

    /// Widen a normalized range to the whole source segments it touches
    fn to_source(&self, found: Range<usize>) -> Option<Range<usize>> {
        let first = self
            .table
            .partition_point(|segment| segment.normalized.end <= found.start);
        let last = self
            .table
            .partition_point(|segment| segment.normalized.end < found.end);
        let start = self.table.get(first)?.source.start;
        let end = self.table.get(last)?.source.end;
        Some(start..end)
    }
}

fn run_find(api: &dyn EditorApi, prompt: &str) {
    let Some(term) = api.prompt_user(prompt) else {
        return;
    };
    let caret = api.caret_position();
    let after = api.text_range(caret, api.text_length());
    match find_after_caret(&after, &term) {
        Some(found) => api.highlight_text(caret + found.start, caret + found.end),
        None => tracing::debug!("Find: '{}' not found after offset {}", term, caret),
    }
}

impl Plugin for FindPlugin {
    fn start(&self, api: Arc<dyn EditorApi>) {
        let strings = strings(&api.locale());
        let prompt = strings.prompt;

        let handler_api = api.clone();
        let handler: Arc<dyn Fn() + Send + Sync> =
            Arc::new(move || run_find(handler_api.as_ref(), prompt));

        api.register_button(&format!("{}...", strings.button), handler.clone());
        if let Err(e) = api.register_on_function_key(FunctionKey::F3, handler) {
            tracing::warn!("Find plugin: {}", e);
        }
    }

    fn name(&self, locale: &Locale) -> String {
        strings(locale).name.to_string()
    }
}
