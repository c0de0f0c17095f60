//! Pluggable interpreter interface

use std::sync::Arc;

use thiserror::Error;

use super::Script;
use crate::api::EditorApi;

/// Failure while running a script body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("Failed to start interpreter: {0}")]
    Interpreter(String),

    #[error("Error in {script}: {message}")]
    Runtime { script: String, message: String },
}

/// An embedded interpreter
///
/// `execute` creates a fresh interpreter instance, binds `api` into it, runs
/// the script body and releases the instance before returning, whether the
/// body completed or failed. Callbacks the script registered with the API
/// may outlive the call.
pub trait ScriptEngine: Send + Sync {
    /// File suffix this engine runs, without the dot
    fn extension(&self) -> &str;

    fn execute(&self, script: &Script, api: Arc<dyn EditorApi>) -> Result<(), ScriptError>;
}

/// Stand-in used when the crate is built without an interpreter
#[derive(Debug, Default)]
pub struct DisabledEngine;

impl ScriptEngine for DisabledEngine {
    fn extension(&self) -> &str {
        "js"
    }

    fn execute(&self, script: &Script, _api: Arc<dyn EditorApi>) -> Result<(), ScriptError> {
        Err(ScriptError::Interpreter(format!(
            "cannot run {}: built without script support",
            script.name
        )))
    }
}

/// The interpreter compiled into this build
pub fn default_engine() -> Arc<dyn ScriptEngine> {
    #[cfg(feature = "quickjs")]
    {
        Arc::new(super::QuickJsEngine::new())
    }

    #[cfg(not(feature = "quickjs"))]
    {
        Arc::new(DisabledEngine)
    }
}
