//! Embedded scripts
//!
//! A [`ScriptManager`] reads script files, rejects exact (name, source)
//! repeats and runs the rest through a [`ScriptEngine`] on a worker pool.
//! Every script gets the same `Arc<dyn EditorApi>` as plugins do.

mod engine;
mod manager;
#[cfg(feature = "quickjs")]
mod quickjs;
mod script;

pub use engine::{default_engine, DisabledEngine, ScriptEngine, ScriptError};
pub use manager::{ScriptLoadError, ScriptManager, ScriptOutcome, ScriptTicket};
#[cfg(feature = "quickjs")]
pub use quickjs::QuickJsEngine;
pub use script::Script;
