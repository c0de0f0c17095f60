//! Capability API shared by plugins, scripts and the dispatcher
//!
//! Extensions receive an `Arc<dyn EditorApi>` once and keep whatever they
//! need from it. Every method may be called from any thread.

use std::fmt;
use std::sync::Arc;

pub use crate::keymap::FunctionKey;
use crate::registry::RegistryError;

/// Toolbar button callback
pub type ButtonHandler = Arc<dyn Fn() + Send + Sync>;

/// Function key callback
pub type FunctionKeyHandler = Arc<dyn Fn() + Send + Sync>;

/// Text change callback, called with the full previous and current text
pub type TextChangeHandler = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Operations exposed to extension code
///
/// Offsets are char indices. Out-of-range offsets are clamped to
/// `[0, text_length()]`; invalid deletions return `None`.
pub trait EditorApi: Send + Sync {
    /// Add a toolbar button; buttons keep registration order
    fn register_button(&self, label: &str, handler: ButtonHandler);

    /// Bind a function key
    ///
    /// Fails if the key is already bound, the existing handler stays active.
    fn register_on_function_key(
        &self,
        key: FunctionKey,
        handler: FunctionKeyHandler,
    ) -> Result<(), RegistryError>;

    /// Observe every text change
    fn register_text_modification_handler(&self, handler: TextChangeHandler);

    /// Ask the user for a line of text; `None` if cancelled
    fn prompt_user(&self, prompt: &str) -> Option<String>;

    fn locale(&self) -> Locale;

    fn caret_position(&self) -> usize;

    fn set_caret_position(&self, pos: usize);

    fn text(&self) -> String;

    fn text_range(&self, start: usize, end: usize) -> String;

    fn text_length(&self) -> usize;

    /// Insert at the caret
    fn insert_text(&self, text: &str);

    fn insert_text_at(&self, idx: usize, text: &str);

    /// Remove `[start, end)`; `None` if `start > end`, `start >= len` or `end == 0`
    fn delete_range(&self, start: usize, end: usize) -> Option<String>;

    /// Remove `text` if it immediately precedes the caret
    fn delete_text(&self, text: &str) -> Option<String>;

    /// Replace all literal occurrences of `find`
    fn replace_text(&self, find: &str, replace: &str);

    /// Select a range, clamped to the buffer
    fn highlight_text(&self, start: usize, end: usize);
}

/// A locale tag such as `en-US` or `fr_FR.UTF-8`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Locale from `LC_ALL`, `LC_MESSAGES` or `LANG`, else `en`
    pub fn from_env() -> Self {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty() && value != "C" && value != "POSIX")
            .map(Self)
            .unwrap_or_default()
    }

    pub fn tag(&self) -> &str {
        &self.0
    }

    /// Lowercase language subtag (`fr` for `fr_FR.UTF-8`)
    pub fn language(&self) -> String {
        self.0
            .split(['-', '_', '.', '@'])
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_language() {
        assert_eq!(Locale::new("fr_FR.UTF-8").language(), "fr");
        assert_eq!(Locale::new("en-US").language(), "en");
        assert_eq!(Locale::new("DE").language(), "de");
        assert_eq!(Locale::default().tag(), "en");
    }
}
