//! Configurable keymap system
//!
//! This module provides a data-driven keymap that:
//! - Maps letter combos (letter + exact modifier set) to text actions
//! - Keeps declarations ordered: the first matching combo wins
//! - Loads declarations from a line-oriented keymap file
//!
//! # Architecture
//!
//! ```text
//! KeyEvent → Keymap::lookup() → KeyAction → Dispatcher::execute()
//! ```
//!
//! # Loading Keymaps
//!
//! ```ignore
//! // Load from embedded defaults
//! let keymap = Keymap::with_mappings(default_mappings());
//!
//! // Or load from a file
//! let keymap = Keymap::with_mappings(load_keymap_file(Path::new("my.keymap"))?);
//! ```

mod action;
mod binding;
mod config;
mod defaults;
#[allow(clippy::module_inception)]
mod keymap;
mod types;

pub use action::{Anchor, EditOp, KeyAction};
pub use binding::KeyMapping;
pub use config::{load_keymap_file, parse_combo, parse_keymap, parse_keymap_reader, KeymapError};
pub use defaults::{default_mappings, get_default_keymap_text, load_keymap};
pub use keymap::Keymap;
pub use types::{FunctionKey, Key, KeyCombo, KeyEvent, Modifiers};
