//! Callback registry: function keys, text change observers, toolbar buttons
//!
//! One lock covers all three tables. Handlers are cloned out under the lock
//! and called after it is released, so a handler may register further
//! handlers.

use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;

use crate::api::{ButtonHandler, FunctionKeyHandler, TextChangeHandler};
use crate::keymap::FunctionKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Function key {0} is already bound")]
    DuplicateFunctionKey(FunctionKey),
}

/// A registered toolbar button
#[derive(Clone)]
pub struct ToolbarButton {
    pub label: String,
    pub handler: ButtonHandler,
}

impl std::fmt::Debug for ToolbarButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolbarButton")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Tables {
    function_keys: HashMap<FunctionKey, FunctionKeyHandler>,
    text_handlers: Vec<TextChangeHandler>,
    buttons: Vec<ToolbarButton>,
}

/// Thread-safe handler store
#[derive(Default)]
pub struct CallbackRegistry {
    tables: Mutex<Tables>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` unless it is already bound
    pub fn register_function_key(
        &self,
        key: FunctionKey,
        handler: FunctionKeyHandler,
    ) -> Result<(), RegistryError> {
        let mut tables = self.tables.lock();
        if tables.function_keys.contains_key(&key) {
            return Err(RegistryError::DuplicateFunctionKey(key));
        }
        tables.function_keys.insert(key, handler);
        Ok(())
    }

    pub fn function_key_handler(&self, key: FunctionKey) -> Option<FunctionKeyHandler> {
        self.tables.lock().function_keys.get(&key).cloned()
    }

    /// Keys with a handler, in F1..F12 order
    pub fn bound_function_keys(&self) -> Vec<FunctionKey> {
        let tables = self.tables.lock();
        FunctionKey::ALL
            .into_iter()
            .filter(|key| tables.function_keys.contains_key(key))
            .collect()
    }

    /// Run the handler bound to `key`; returns whether one was bound
    pub fn fire_function_key(&self, key: FunctionKey) -> bool {
        match self.function_key_handler(key) {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }

    /// Append a text change handler; the same handler may be added twice
    pub fn register_text_handler(&self, handler: TextChangeHandler) {
        self.tables.lock().text_handlers.push(handler);
    }

    /// Snapshot of text change handlers in registration order
    pub fn text_handlers(&self) -> Vec<TextChangeHandler> {
        self.tables.lock().text_handlers.clone()
    }

    /// Call every text change handler with the full old and new text
    pub fn notify_text_changed(&self, previous: &str, current: &str) {
        for handler in self.text_handlers() {
            handler(previous, current);
        }
    }

    /// Append a toolbar button
    pub fn register_button(&self, label: &str, handler: ButtonHandler) {
        self.tables.lock().buttons.push(ToolbarButton {
            label: label.to_string(),
            handler,
        });
    }

    /// Snapshot of toolbar buttons in registration order
    pub fn buttons(&self) -> Vec<ToolbarButton> {
        self.tables.lock().buttons.clone()
    }

    pub fn button(&self, index: usize) -> Option<ToolbarButton> {
        self.tables.lock().buttons.get(index).cloned()
    }

    /// First button with this label
    pub fn button_by_label(&self, label: &str) -> Option<ToolbarButton> {
        self.tables
            .lock()
            .buttons
            .iter()
            .find(|b| b.label == label)
            .cloned()
    }
}
