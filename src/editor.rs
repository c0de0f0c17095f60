//! Host editor: the synchronized buffer plus the capability API
//!
//! The buffer sits behind one lock. Each API call is a single critical
//! section, so calls from the event thread and from script workers are
//! linearized and the last writer wins.
//!
//! Text change notifications are queued while the buffer lock is held and
//! delivered on a dedicated notifier thread. Handlers never run inside a
//! mutation, so a handler that edits the buffer just queues another
//! notification.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::api::{
    ButtonHandler, EditorApi, FunctionKeyHandler, Locale, TextChangeHandler,
};
use crate::buffer::TextBuffer;
use crate::keymap::FunctionKey;
use crate::registry::{CallbackRegistry, RegistryError};
use crate::ui::HostUi;

enum Notice {
    Changed { previous: String, current: String },
    Flush(Sender<()>),
}

/// Delivery end of the notification queue
struct Notifier {
    tx: Sender<Notice>,
    thread: Option<ThreadId>,
}

impl Notifier {
    fn spawn(registry: Arc<CallbackRegistry>) -> Self {
        let (tx, rx) = mpsc::channel::<Notice>();

        let spawned = thread::Builder::new()
            .name("plume-notifier".to_string())
            .spawn(move || {
                for notice in rx {
                    match notice {
                        Notice::Changed { previous, current } => {
                            let result = catch_unwind(AssertUnwindSafe(|| {
                                registry.notify_text_changed(&previous, &current)
                            }));
                            if result.is_err() {
                                tracing::error!("Text change handler panicked");
                            }
                        }
                        Notice::Flush(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
                tracing::debug!("Notifier thread exiting");
            });

        let thread = match spawned {
            Ok(handle) => Some(handle.thread().id()),
            Err(e) => {
                tracing::error!("Failed to spawn notifier thread: {}", e);
                None
            }
        };

        Self { tx, thread }
    }
}

/// The document, its caret and the callback registry behind one API
pub struct Editor {
    buffer: Mutex<TextBuffer>,
    registry: Arc<CallbackRegistry>,
    ui: Arc<dyn HostUi>,
    locale: Locale,
    notifier: Notifier,
}

impl Editor {
    /// Create an editor with an empty buffer and the environment locale
    pub fn new(ui: Arc<dyn HostUi>) -> Self {
        let registry = Arc::new(CallbackRegistry::new());
        let notifier = Notifier::spawn(registry.clone());
        Self {
            buffer: Mutex::new(TextBuffer::new()),
            registry,
            ui,
            locale: Locale::from_env(),
            notifier,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Initial content, without notifying anyone
    pub fn with_text(self, text: &str) -> Self {
        self.buffer.lock().set_text(text);
        self
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    pub fn ui(&self) -> &Arc<dyn HostUi> {
        &self.ui
    }

    /// Run `f` against the buffer as one atomic edit
    ///
    /// Text change handlers are notified afterwards if the text changed.
    pub fn edit<R>(&self, f: impl FnOnce(&mut TextBuffer) -> R) -> R {
        let mut buffer = self.buffer.lock();
        let before = buffer.rope().clone();
        let result = f(&mut buffer);
        if *buffer.rope() != before {
            let notice = Notice::Changed {
                previous: before.to_string(),
                current: buffer.text(),
            };
            if self.notifier.tx.send(notice).is_err() {
                tracing::warn!("Notifier is gone, dropping text change notification");
            }
        }
        result
    }

    /// Read the buffer under the lock
    pub fn read<R>(&self, f: impl FnOnce(&TextBuffer) -> R) -> R {
        f(&self.buffer.lock())
    }

    /// Replace the whole document (e.g. after opening a file)
    pub fn set_text(&self, text: &str) {
        self.edit(|buffer| buffer.set_text(text));
    }

    pub fn selection(&self) -> Option<std::ops::Range<usize>> {
        self.read(|buffer| buffer.selection())
    }

    /// Block until every queued text change notification has been delivered
    ///
    /// Returns immediately when called from a text change handler.
    pub fn sync(&self) {
        if self.notifier.thread == Some(thread::current().id()) {
            return;
        }
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.notifier.tx.send(Notice::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    /// Run the handler bound to a function key on the calling thread
    pub fn press_function_key(&self, key: FunctionKey) -> bool {
        let handled = self.registry.fire_function_key(key);
        tracing::debug!("Function key {} handled: {}", key, handled);
        handled
    }

    /// Run a toolbar button by position
    pub fn press_button(&self, index: usize) -> bool {
        match self.registry.button(index) {
            Some(button) => {
                tracing::debug!("Toolbar button '{}' pressed", button.label);
                (button.handler)();
                true
            }
            None => false,
        }
    }

    /// Run the first toolbar button with this label
    pub fn press_button_labeled(&self, label: &str) -> bool {
        match self.registry.button_by_label(label) {
            Some(button) => {
                tracing::debug!("Toolbar button '{}' pressed", label);
                (button.handler)();
                true
            }
            None => false,
        }
    }

    /// Toolbar labels in registration order
    pub fn button_labels(&self) -> Vec<String> {
        self.registry.buttons().into_iter().map(|b| b.label).collect()
    }
}

impl EditorApi for Editor {
    fn register_button(&self, label: &str, handler: ButtonHandler) {
        tracing::debug!("Registered toolbar button '{}'", label);
        self.registry.register_button(label, handler);
    }

    fn register_on_function_key(
        &self,
        key: FunctionKey,
        handler: FunctionKeyHandler,
    ) -> Result<(), RegistryError> {
        match self.registry.register_function_key(key, handler) {
            Ok(()) => {
                tracing::debug!("Registered handler for {}", key);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("{}", e);
                self.ui.show_error("Duplicate function key", &e.to_string());
                Err(e)
            }
        }
    }

    fn register_text_modification_handler(&self, handler: TextChangeHandler) {
        self.registry.register_text_handler(handler);
    }

    fn prompt_user(&self, prompt: &str) -> Option<String> {
        self.ui.prompt(prompt)
    }

    fn locale(&self) -> Locale {
        self.locale.clone()
    }

    fn caret_position(&self) -> usize {
        self.read(|buffer| buffer.caret())
    }

    fn set_caret_position(&self, pos: usize) {
        self.edit(|buffer| buffer.set_caret(pos));
    }

    fn text(&self) -> String {
        self.read(|buffer| buffer.text())
    }

    fn text_range(&self, start: usize, end: usize) -> String {
        self.read(|buffer| buffer.slice(start, end))
    }

    fn text_length(&self) -> usize {
        self.read(|buffer| buffer.len())
    }

    fn insert_text(&self, text: &str) {
        self.edit(|buffer| buffer.insert_at_caret(text));
    }

    fn insert_text_at(&self, idx: usize, text: &str) {
        self.edit(|buffer| buffer.insert(idx, text));
    }

    fn delete_range(&self, start: usize, end: usize) -> Option<String> {
        self.edit(|buffer| buffer.delete_range(start, end))
    }

    fn delete_text(&self, text: &str) -> Option<String> {
        self.edit(|buffer| buffer.delete_before_caret(text))
    }

    fn replace_text(&self, find: &str, replace: &str) {
        let count = self.edit(|buffer| buffer.replace_all(find, replace));
        tracing::debug!("Replaced {} occurrence(s)", count);
    }

    fn highlight_text(&self, start: usize, end: usize) {
        self.edit(|buffer| buffer.highlight(start, end));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::HeadlessUi;

    fn editor(text: &str) -> Editor {
        Editor::new(Arc::new(HeadlessUi::new()))
            .with_locale(Locale::new("en-US"))
            .with_text(text)
    }

    #[test]
    fn test_api_reads_and_writes_buffer() {
        let editor = editor("hello");
        editor.set_caret_position(5);
        editor.insert_text(" world");
        assert_eq!(editor.text(), "hello world");
        assert_eq!(editor.caret_position(), 11);
        assert_eq!(editor.text_range(0, 5), "hello");
        assert_eq!(editor.text_length(), 11);
        assert_eq!(editor.locale().tag(), "en-US");
    }

    #[test]
    fn test_notifications_arrive_in_order() {
        let editor = editor("a");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        editor.register_text_modification_handler(Arc::new(move |prev: &str, cur: &str| {
            sink.lock().push((prev.to_string(), cur.to_string()));
        }));

        editor.insert_text_at(1, "b");
        editor.insert_text_at(2, "c");
        editor.sync();

        assert_eq!(
            *seen.lock(),
            vec![
                ("a".to_string(), "ab".to_string()),
                ("ab".to_string(), "abc".to_string())
            ]
        );
    }

    #[test]
    fn test_caret_moves_do_not_notify() {
        let editor = editor("abc");
        let calls = Arc::new(Mutex::new(0));
        let sink = calls.clone();
        editor.register_text_modification_handler(Arc::new(move |_: &str, _: &str| *sink.lock() += 1));

        editor.set_caret_position(2);
        editor.highlight_text(0, 1);
        assert_eq!(editor.delete_text("zz"), None);
        editor.sync();

        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_duplicate_function_key_is_reported() {
        let ui = Arc::new(HeadlessUi::new());
        let editor = Editor::new(ui.clone());

        assert!(editor
            .register_on_function_key(FunctionKey::F3, Arc::new(|| {}))
            .is_ok());
        assert!(editor
            .register_on_function_key(FunctionKey::F3, Arc::new(|| {}))
            .is_err());

        let errors = ui.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].details.contains("F3"));
    }
}
