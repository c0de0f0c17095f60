//! Script manager tests - loading, idempotence, failures, JavaScript API

mod common;

use std::path::Path;
use std::sync::Arc;

use common::{test_editor, wait_until, Log};
use plume::api::EditorApi;
use plume::scripts::{
    Script, ScriptEngine, ScriptError, ScriptLoadError, ScriptManager, ScriptOutcome,
};

/// Records every script body it is asked to run
struct RecordingEngine {
    runs: Log,
}

impl ScriptEngine for RecordingEngine {
    fn extension(&self) -> &str {
        "js"
    }

    fn execute(&self, script: &Script, api: Arc<dyn EditorApi>) -> Result<(), ScriptError> {
        self.runs.push(format!("{}:{}", script.name, script.source));
        match script.source.as_str() {
            "fail" => Err(ScriptError::Runtime {
                script: script.name.clone(),
                message: "boom".to_string(),
            }),
            "panic" => panic!("engine bug"),
            source => {
                api.insert_text(source);
                Ok(())
            }
        }
    }
}

fn recording_manager(workers: usize) -> (Log, ScriptManager) {
    let runs = Log::new();
    let engine = Arc::new(RecordingEngine { runs: runs.clone() });
    (runs, ScriptManager::new(engine, workers).unwrap())
}

fn write_script(dir: &Path, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, source).unwrap();
    path
}

// ========================================================================
// Idempotence
// ========================================================================

#[test]
fn test_same_script_runs_once() {
    let (_ui, editor) = test_editor("", 0);
    let (runs, manager) = recording_manager(2);
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(dir.path(), "hello.js", "a");

    let first = manager.load(&path, editor.clone()).unwrap().wait();
    let second = manager.load(&path, editor.clone()).unwrap().wait();

    assert_eq!(first, ScriptOutcome::Completed);
    assert_eq!(second, ScriptOutcome::AlreadyStarted);
    assert_eq!(runs.entries(), vec!["hello.js:a".to_string()]);
    assert_eq!(manager.scripts().len(), 1);
}

#[test]
fn test_changed_source_under_same_name_runs_again() {
    let (_ui, editor) = test_editor("", 0);
    let (runs, manager) = recording_manager(2);
    let dir = tempfile::tempdir().unwrap();

    let path = write_script(dir.path(), "edit.js", "a");
    manager.load(&path, editor.clone()).unwrap().wait();
    write_script(dir.path(), "edit.js", "b");
    manager.load(&path, editor.clone()).unwrap().wait();

    assert_eq!(
        runs.entries(),
        vec!["edit.js:a".to_string(), "edit.js:b".to_string()]
    );
    assert_eq!(editor.text(), "ab");
}

#[test]
fn test_concurrent_duplicates_run_once() {
    let (_ui, editor) = test_editor("", 0);
    let (runs, manager) = recording_manager(4);

    let tickets: Vec<_> = (0..8)
        .map(|_| manager.submit(Script::new("dup.js", "x"), editor.clone()))
        .collect();
    let outcomes: Vec<_> = tickets.into_iter().map(|t| t.wait()).collect();

    assert_eq!(
        outcomes
            .iter()
            .filter(|o| **o == ScriptOutcome::Completed)
            .count(),
        1
    );
    assert_eq!(runs.entries().len(), 1);
    assert_eq!(editor.text(), "x");
}

// ========================================================================
// Load errors
// ========================================================================

#[test]
fn test_wrong_extension_is_rejected_before_reading() {
    let (_ui, editor) = test_editor("", 0);
    let (runs, manager) = recording_manager(1);

    let err = manager
        .load(Path::new("/nonexistent/script.py"), editor)
        .unwrap_err();
    assert!(matches!(err, ScriptLoadError::BadExtension { .. }));
    assert!(runs.entries().is_empty());
}

#[test]
fn test_extension_check_ignores_case() {
    let (_ui, editor) = test_editor("", 0);
    let (_runs, manager) = recording_manager(1);
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(dir.path(), "LOUD.JS", "y");

    assert_eq!(
        manager.load(&path, editor).unwrap().wait(),
        ScriptOutcome::Completed
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let (_ui, editor) = test_editor("", 0);
    let (_runs, manager) = recording_manager(1);
    let dir = tempfile::tempdir().unwrap();

    let err = manager
        .load(&dir.path().join("missing.js"), editor)
        .unwrap_err();
    assert!(matches!(err, ScriptLoadError::Io { .. }));
}

// ========================================================================
// Runtime failures stay inside the worker
// ========================================================================

#[test]
fn test_script_error_is_reported_on_ticket() {
    let (_ui, editor) = test_editor("", 0);
    let (_runs, manager) = recording_manager(1);

    let outcome = manager.submit(Script::new("bad.js", "fail"), editor).wait();
    match outcome {
        ScriptOutcome::Failed(message) => assert!(message.contains("boom")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_engine_panic_does_not_kill_the_pool() {
    let (_ui, editor) = test_editor("", 0);
    let (_runs, manager) = recording_manager(1);

    let outcome = manager
        .submit(Script::new("crash.js", "panic"), editor.clone())
        .wait();
    assert!(matches!(outcome, ScriptOutcome::Failed(_)));

    // Still started, so not run again
    assert_eq!(
        manager
            .submit(Script::new("crash.js", "panic"), editor.clone())
            .wait(),
        ScriptOutcome::AlreadyStarted
    );
    assert_eq!(
        manager.submit(Script::new("ok.js", "fine"), editor.clone()).wait(),
        ScriptOutcome::Completed
    );
    assert_eq!(editor.text(), "fine");
}

// ========================================================================
// JavaScript
// ========================================================================

#[cfg(feature = "quickjs")]
mod javascript {
    use super::*;
    use plume::keymap::FunctionKey;
    use plume::scripts::QuickJsEngine;

    fn js_manager() -> ScriptManager {
        ScriptManager::new(Arc::new(QuickJsEngine::new()), 2).unwrap()
    }

    fn run(
        manager: &ScriptManager,
        editor: Arc<plume::editor::Editor>,
        source: &str,
    ) -> ScriptOutcome {
        manager.submit(Script::new("test.js", source), editor).wait()
    }

    #[test]
    fn test_script_edits_buffer() {
        let (_ui, editor) = test_editor("world", 0);
        let manager = js_manager();

        let outcome = run(
            &manager,
            editor.clone(),
            r#"
            api.insertText("hello ");
            api.setCaretPosition(api.getTextLength());
            api.insertText("!");
            "#,
        );

        assert_eq!(outcome, ScriptOutcome::Completed);
        assert_eq!(editor.text(), "hello world!");
    }

    #[test]
    fn test_script_reads_locale_and_ranges() {
        let (_ui, editor) = test_editor("abcdef", 0);
        let manager = js_manager();

        run(
            &manager,
            editor.clone(),
            r#"
            var middle = api.getText(2, 4);
            var tail = api.getText(4);
            var removed = api.deleteRange(0, 2);
            api.setCaretPosition(-5);
            api.insertText(api.getLocale() + ":" + middle + ":" + tail + ":" + removed + ":");
            "#,
        );

        assert_eq!(editor.text(), "en-US:cd:ef:ab:cdef");
    }

    #[test]
    fn test_emoji_replacement_handler() {
        let (_ui, editor) = test_editor("", 0);
        let manager = js_manager();

        let outcome = run(
            &manager,
            editor.clone(),
            r#"
            api.registerTextModificationHandler(function (prev, cur) {
                if (cur.indexOf(":-)") >= 0) {
                    api.replaceText(":-)", "\u{1F60A}");
                }
            });
            "#,
        );
        assert_eq!(outcome, ScriptOutcome::Completed);

        editor.insert_text("hi :-)");
        assert!(wait_until(|| editor.text() == "hi \u{1F60A}"));
    }

    #[test]
    fn test_function_key_callback_outlives_script() {
        let (_ui, editor) = test_editor("", 0);
        let manager = js_manager();

        let outcome = run(
            &manager,
            editor.clone(),
            r#"
            var count = 0;
            var ok = api.registerOnFunctionKeyEvent("F5", function () {
                count += 1;
                api.insertText(String(count));
            });
            if (!ok) { throw new Error("F5 should be free"); }
            "#,
        );
        assert_eq!(outcome, ScriptOutcome::Completed);

        assert!(editor.press_function_key(FunctionKey::F5));
        assert!(editor.press_function_key(FunctionKey::F5));
        assert_eq!(editor.text(), "12");
    }

    #[test]
    fn test_callback_can_register_more_callbacks() {
        let (_ui, editor) = test_editor("", 0);
        let manager = js_manager();

        let outcome = run(
            &manager,
            editor.clone(),
            r#"
            api.registerOnFunctionKeyEvent("F6", function () {
                api.registerButton("Late", function () { api.insertText("late"); });
                api.insertText("F6 ");
            });
            "#,
        );
        assert_eq!(outcome, ScriptOutcome::Completed);
        assert!(!editor.press_button_labeled("Late"));

        assert!(editor.press_function_key(FunctionKey::F6));
        assert!(editor.press_button_labeled("Late"));
        assert_eq!(editor.text(), "F6 late");
    }

    #[test]
    fn test_script_without_callbacks_leaves_nothing_registered() {
        let (_ui, editor) = test_editor("", 0);
        let manager = js_manager();

        assert_eq!(
            run(&manager, editor.clone(), "api.insertText('once');"),
            ScriptOutcome::Completed
        );
        assert!(editor.button_labels().is_empty());
        assert_eq!(editor.text(), "once");
    }

    #[test]
    fn test_duplicate_function_key_returns_false() {
        let (ui, editor) = test_editor("", 0);
        editor
            .register_on_function_key(FunctionKey::F2, Arc::new(|| {}))
            .unwrap();
        let manager = js_manager();

        run(
            &manager,
            editor.clone(),
            r#"
            var ok = api.registerOnFunctionKeyEvent("F2", function () {});
            api.insertText(String(ok));
            "#,
        );

        assert_eq!(editor.text(), "false");
        assert_eq!(ui.errors().len(), 1);
    }

    #[test]
    fn test_prompt_and_button() {
        let (ui, editor) = test_editor("", 0);
        ui.push_answer(Some("Ada"));
        let manager = js_manager();

        run(
            &manager,
            editor.clone(),
            r#"
            api.registerButton("Greet", function () {
                var name = api.promptUser("Name?");
                api.insertText(name === null ? "nobody" : "hi " + name);
            });
            "#,
        );

        assert!(editor.press_button_labeled("Greet"));
        assert!(editor.press_button_labeled("Greet"));
        assert_eq!(editor.text(), "hi Adanobody");
        assert_eq!(ui.prompts(), vec!["Name?".to_string(), "Name?".to_string()]);
    }

    #[test]
    fn test_thrown_error_fails_ticket() {
        let (_ui, editor) = test_editor("", 0);
        let manager = js_manager();

        match run(&manager, editor, "throw new Error('bad things');") {
            ScriptOutcome::Failed(message) => assert!(message.contains("bad things")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_function_key_name_throws() {
        let (_ui, editor) = test_editor("", 0);
        let manager = js_manager();

        let outcome = run(
            &manager,
            editor,
            r#"api.registerOnFunctionKeyEvent("F13", function () {});"#,
        );
        assert!(matches!(outcome, ScriptOutcome::Failed(_)));
    }
}
