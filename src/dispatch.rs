//! Key event dispatch
//!
//! Two independent routes:
//! - Function keys go to the callback registry and run on the calling thread
//! - Letter keys go through the keymap (if one is loaded), first match wins
//!
//! Keymap actions are conservative: they never delete partial matches and
//! leave the buffer alone when the payload is not literally at the anchor.

use std::sync::Arc;

use crate::buffer::TextBuffer;
use crate::editor::Editor;
use crate::keymap::{Anchor, EditOp, FunctionKey, Key, KeyAction, KeyEvent, Keymap};

/// What an executed keymap action did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Payload inserted at this offset
    Inserted { at: usize },
    /// Payload removed from this offset
    Deleted { at: usize, text: String },
    /// Payload was not at the anchor; buffer untouched
    NotFound,
}

/// What a key press led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A function key handler ran
    FunctionKey(FunctionKey),
    /// A keymap action ran
    Action {
        action: KeyAction,
        outcome: ActionOutcome,
    },
    /// Nothing is bound to this key
    Unbound,
}

/// Routes key presses to function key handlers and keymap actions
pub struct Dispatcher {
    editor: Arc<Editor>,
    keymap: Option<Keymap>,
}

impl Dispatcher {
    /// `keymap` is `None` when loading failed; letter keys are then ignored
    pub fn new(editor: Arc<Editor>, keymap: Option<Keymap>) -> Self {
        Self { editor, keymap }
    }

    pub fn editor(&self) -> &Arc<Editor> {
        &self.editor
    }

    pub fn keymap(&self) -> Option<&Keymap> {
        self.keymap.as_ref()
    }

    /// Handle one key press
    pub fn handle_key(&self, event: &KeyEvent) -> Dispatch {
        match event.key {
            Key::Function(key) => {
                if self.editor.press_function_key(key) {
                    Dispatch::FunctionKey(key)
                } else {
                    Dispatch::Unbound
                }
            }
            Key::Char(_) => {
                let Some(action) = self.keymap.as_ref().and_then(|k| k.lookup(event)) else {
                    return Dispatch::Unbound;
                };
                let outcome = self.execute(action);
                tracing::debug!("{:?} -> {} ({:?})", event, action.describe(), outcome);
                Dispatch::Action {
                    action: action.clone(),
                    outcome,
                }
            }
            Key::Other => Dispatch::Unbound,
        }
    }

    /// Execute an action as one atomic edit of the editor's buffer
    pub fn execute(&self, action: &KeyAction) -> ActionOutcome {
        self.editor.edit(|buffer| apply_action(buffer, action))
    }
}

/// Apply a keymap action to a buffer
pub fn apply_action(buffer: &mut TextBuffer, action: &KeyAction) -> ActionOutcome {
    match (action.op, action.anchor) {
        (EditOp::Insert, Anchor::AtCaret) => {
            let at = buffer.caret();
            buffer.insert(at, &action.text);
            ActionOutcome::Inserted { at }
        }
        (EditOp::Insert, Anchor::LineStart) => {
            let at = buffer.line_start();
            buffer.insert(at, &action.text);
            ActionOutcome::Inserted { at }
        }
        (EditOp::Delete, Anchor::AtCaret) => match buffer.delete_before_caret(&action.text) {
            Some(text) => ActionOutcome::Deleted {
                at: buffer.caret(),
                text,
            },
            None => ActionOutcome::NotFound,
        },
        (EditOp::Delete, Anchor::LineStart) => {
            let at = buffer.line_start();
            match buffer.delete_at(at, &action.text) {
                Some(text) => ActionOutcome::Deleted { at, text },
                None => ActionOutcome::NotFound,
            }
        }
    }
}
