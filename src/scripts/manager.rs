//! Script loading and execution on a bounded worker pool

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use super::{Script, ScriptEngine};
use crate::api::EditorApi;
use crate::util::{filename_for_display, panic_message};

/// Failures reported before a script is queued
#[derive(Debug, Error)]
pub enum ScriptLoadError {
    #[error("{} is not a .{expected} script", .path.display())]
    BadExtension { path: PathBuf, expected: String },

    #[error("Could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How a queued script ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutcome {
    Completed,
    /// The body raised an error or panicked; already logged
    Failed(String),
    /// An identical (name, source) script had already been started
    AlreadyStarted,
}

/// Handle to one queued script run
#[derive(Debug)]
pub struct ScriptTicket {
    name: String,
    rx: Receiver<ScriptOutcome>,
}

impl ScriptTicket {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block until the script body has finished
    pub fn wait(self) -> ScriptOutcome {
        self.rx
            .recv()
            .unwrap_or_else(|_| ScriptOutcome::Failed("script worker exited".to_string()))
    }

    /// Outcome if the script has already finished
    pub fn try_outcome(&self) -> Option<ScriptOutcome> {
        self.rx.try_recv().ok()
    }
}

#[derive(Default)]
struct Started {
    seen: HashSet<Script>,
    order: Vec<Script>,
}

impl Started {
    /// Record `script`; false if an identical one was already recorded
    fn insert(&mut self, script: &Script) -> bool {
        if !self.seen.insert(script.clone()) {
            return false;
        }
        self.order.push(script.clone());
        true
    }
}

/// Runs each distinct script at most once, on a fixed number of workers
///
/// Scripts that never finish keep their worker busy; later scripts queue
/// behind them. There is no cancellation.
pub struct ScriptManager {
    engine: Arc<dyn ScriptEngine>,
    pool: rayon::ThreadPool,
    started: Arc<Mutex<Started>>,
}

impl ScriptManager {
    pub fn new(
        engine: Arc<dyn ScriptEngine>,
        workers: usize,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("plume-script-{}", i))
            .build()?;
        tracing::debug!("Script pool ready with {} worker(s)", pool.current_num_threads());
        Ok(Self {
            engine,
            pool,
            started: Arc::new(Mutex::new(Started::default())),
        })
    }

    /// File suffix accepted by `load`
    pub fn extension(&self) -> &str {
        self.engine.extension()
    }

    /// Read a script file and queue it
    ///
    /// Suffix and IO errors are returned here; anything that goes wrong
    /// while the script runs only shows up in the ticket and the log.
    pub fn load(
        &self,
        path: &Path,
        api: Arc<dyn EditorApi>,
    ) -> Result<ScriptTicket, ScriptLoadError> {
        let expected = self.engine.extension();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(expected));
        if !matches {
            return Err(ScriptLoadError::BadExtension {
                path: path.to_path_buf(),
                expected: expected.to_string(),
            });
        }

        let source = std::fs::read_to_string(path).map_err(|source| ScriptLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(self.submit(Script::new(filename_for_display(path), source), api))
    }

    /// Queue a script that is already in memory
    pub fn submit(&self, script: Script, api: Arc<dyn EditorApi>) -> ScriptTicket {
        let (tx, rx) = mpsc::channel();
        let name = script.name.clone();
        let engine = self.engine.clone();
        let started = self.started.clone();

        tracing::debug!("Queued script '{}'", name);
        self.pool.spawn(move || {
            let outcome = run_script(engine.as_ref(), &started, &script, api);
            let _ = tx.send(outcome);
        });

        ScriptTicket { name, rx }
    }

    /// Scripts started so far, in start order
    pub fn scripts(&self) -> Vec<Script> {
        self.started.lock().order.clone()
    }
}

fn run_script(
    engine: &dyn ScriptEngine,
    started: &Mutex<Started>,
    script: &Script,
    api: Arc<dyn EditorApi>,
) -> ScriptOutcome {
    if !started.lock().insert(script) {
        tracing::debug!("Script '{}' already started, skipping", script.name);
        return ScriptOutcome::AlreadyStarted;
    }

    tracing::info!("Running script '{}'", script.name);
    match catch_unwind(AssertUnwindSafe(|| engine.execute(script, api))) {
        Ok(Ok(())) => {
            tracing::info!("Script '{}' finished", script.name);
            ScriptOutcome::Completed
        }
        Ok(Err(e)) => {
            tracing::error!("Script '{}' failed: {}", script.name, e);
            ScriptOutcome::Failed(e.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!("Script '{}' panicked: {}", script.name, message);
            ScriptOutcome::Failed(message)
        }
    }
}
