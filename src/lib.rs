//! Plume - an extensible text editor core
//!
//! A single text buffer driven by three kinds of extension:
//! - Keymaps: declarative letter-key bindings that insert or delete text
//! - Plugins: native extensions resolved by identifier from a catalog
//! - Scripts: embedded JavaScript run on a bounded worker pool
//!
//! Plugins and scripts share one capability API, [`api::EditorApi`].

pub mod api;
pub mod app;
pub mod buffer;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod dispatch;
pub mod editor;
pub mod io;
pub mod keymap;
pub mod plugins;
pub mod registry;
pub mod scripts;
pub mod tracing;
pub mod ui;
pub mod util;

// Re-export commonly used types
pub use api::{EditorApi, Locale};
pub use app::App;
pub use buffer::TextBuffer;
pub use config::EditorConfig;
pub use dispatch::{ActionOutcome, Dispatch, Dispatcher};
pub use editor::Editor;
pub use keymap::{FunctionKey, KeyEvent, Keymap, Modifiers};
