//! plume: a line-driven host for the editor core
//!
//! Reads commands from stdin, one per line:
//!
//! ```text
//! key ctrl+shift+c     press a letter key with modifiers
//! fn F3                press a function key
//! button Date          press a toolbar button by label
//! type some text       insert at the caret
//! caret 12             move the caret
//! show                 print the buffer, caret and selection
//! plugin <id>          load a plugin
//! script <path>        run a script
//! list                 list loaded extensions and toolbar buttons
//! open <path> / save [path]
//! quit
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;

use plume::api::{EditorApi, FunctionKey};
use plume::app::App;
use plume::cli::CliArgs;
use plume::config::EditorConfig;
use plume::dispatch::{ActionOutcome, Dispatch};
use plume::keymap::{parse_combo, KeyEvent, Modifiers};
use plume::ui::StdioUi;

enum Flow {
    Continue,
    Quit,
}

fn main() -> Result<()> {
    plume::tracing::init();

    let args = CliArgs::parse();
    let startup = args.into_config(EditorConfig::load());

    let app = App::with_defaults(Arc::new(StdioUi), &startup.editor)
        .context("failed to start script workers")?;

    let mut current_file = startup.file.clone();
    if let Some(path) = &current_file {
        if path.exists() {
            // Already shown to the user by the app
            let _ = app.open(path);
        }
    }

    for ticket in app.load_startup_extensions(&startup.editor) {
        tracing::debug!("Startup script '{}' queued", ticket.name());
    }

    let stdin = std::io::stdin();
    let mut out = std::io::stdout();
    let mut line = String::new();
    // Stdin is locked per line only: prompts from handlers read it too
    loop {
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        match run_command(&app, line.trim(), &mut current_file, &mut out) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => writeln!(out, "error: {:#}", e)?,
        }
        out.flush()?;
    }

    app.editor().sync();
    Ok(())
}

fn run_command(
    app: &App,
    line: &str,
    current_file: &mut Option<PathBuf>,
    out: &mut impl Write,
) -> Result<Flow> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let editor = app.editor();

    match command {
        "" => {}
        "quit" | "exit" => return Ok(Flow::Quit),
        "key" => {
            let combo = parse_combo(rest).map_err(|e| anyhow!(e))?;
            let event = KeyEvent::char(combo.key(), combo.mods());
            match app.handle_key(&event) {
                Dispatch::Action { action, outcome } => {
                    let result = match outcome {
                        ActionOutcome::Inserted { at } => format!("inserted at {}", at),
                        ActionOutcome::Deleted { at, .. } => format!("deleted at {}", at),
                        ActionOutcome::NotFound => "not found".to_string(),
                    };
                    writeln!(out, "{}: {}", action.describe(), result)?;
                }
                Dispatch::FunctionKey(_) => {}
                Dispatch::Unbound => writeln!(out, "{} is not bound", combo.display_string())?,
            }
        }
        "fn" => {
            let key: FunctionKey = rest.parse().map_err(|e: String| anyhow!(e))?;
            if let Dispatch::Unbound = app.handle_key(&KeyEvent::function(key, Modifiers::NONE))
            {
                writeln!(out, "{} is not bound", key)?;
            }
        }
        "button" => {
            if !editor.press_button_labeled(rest) {
                bail!("no button labeled '{}'", rest);
            }
        }
        "type" => editor.insert_text(rest),
        "caret" => {
            let pos: usize = rest.parse().context("caret needs a number")?;
            editor.set_caret_position(pos);
        }
        "show" => {
            editor.sync();
            writeln!(out, "{}", editor.text())?;
            match editor.selection() {
                Some(range) => writeln!(
                    out,
                    "caret {} selection {}..{}",
                    editor.caret_position(),
                    range.start,
                    range.end
                )?,
                None => writeln!(out, "caret {}", editor.caret_position())?,
            }
        }
        "plugin" => {
            // Failures are shown by the app
            if let Ok(None) = app.load_plugin(rest) {
                writeln!(out, "{} is already loaded", rest)?;
            }
        }
        "script" => {
            if let Ok(ticket) = app.load_script(&PathBuf::from(rest)) {
                let name = ticket.name().to_string();
                writeln!(out, "{}: {:?}", name, ticket.wait())?;
            }
        }
        "list" => {
            for name in app.extension_names() {
                writeln!(out, "extension: {}", name)?;
            }
            for label in editor.button_labels() {
                writeln!(out, "button: {}", label)?;
            }
        }
        "open" => {
            let path = PathBuf::from(rest);
            if app.open(&path).is_ok() {
                *current_file = Some(path);
            }
        }
        "save" => {
            let path = if rest.is_empty() {
                current_file
                    .clone()
                    .ok_or_else(|| anyhow!("no file name, use: save <path>"))?
            } else {
                PathBuf::from(rest)
            };
            editor.sync();
            if app.save(&path).is_ok() {
                *current_file = Some(path);
            }
        }
        other => bail!("unknown command '{}'", other),
    }

    Ok(Flow::Continue)
}
