//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use plume::api::{EditorApi, Locale};
use plume::dispatch::Dispatcher;
use plume::editor::Editor;
use plume::keymap::{parse_keymap, Keymap};
use plume::ui::HeadlessUi;

/// Editor with `text`, caret at `caret`, English locale and a headless UI
pub fn test_editor(text: &str, caret: usize) -> (Arc<HeadlessUi>, Arc<Editor>) {
    let ui = Arc::new(HeadlessUi::new());
    let editor = Arc::new(
        Editor::new(ui.clone())
            .with_locale(Locale::new("en-US"))
            .with_text(text),
    );
    editor.set_caret_position(caret);
    (ui, editor)
}

/// Dispatcher over a keymap given as keymap file text
pub fn test_dispatcher(keymap: &str, text: &str, caret: usize) -> Dispatcher {
    let (_ui, editor) = test_editor(text, caret);
    let mappings = parse_keymap(keymap).expect("test keymap should parse");
    Dispatcher::new(editor, Some(Keymap::with_mappings(mappings)))
}

/// Thread-safe event log for asserting on callback order
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Poll `condition` until it holds or a few seconds pass
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    condition()
}
