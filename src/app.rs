//! Application wiring
//!
//! Owns the editor, the key dispatcher and both extension managers, and turns
//! their failures into messages for the host UI.

use std::path::Path;
use std::sync::Arc;

use crate::api::{EditorApi, Locale};
use crate::config::EditorConfig;
use crate::dispatch::{Dispatch, Dispatcher};
use crate::editor::Editor;
use crate::io::{self, FileError};
use crate::keymap::{load_keymap, KeyEvent};
use crate::plugins::{Plugin, PluginCatalog, PluginLoadError, PluginManager};
use crate::scripts::{ScriptEngine, ScriptLoadError, ScriptManager, ScriptTicket};
use crate::ui::HostUi;

pub struct App {
    editor: Arc<Editor>,
    dispatcher: Dispatcher,
    plugins: PluginManager,
    scripts: ScriptManager,
}

impl App {
    /// Build the editor from `config`
    ///
    /// A keymap that fails to load is reported to the user; the editor then
    /// runs without one and only function keys are dispatched.
    pub fn new(
        ui: Arc<dyn HostUi>,
        config: &EditorConfig,
        catalog: PluginCatalog,
        engine: Arc<dyn ScriptEngine>,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let locale = match &config.locale {
            Some(tag) => Locale::new(tag.as_str()),
            None => Locale::from_env(),
        };
        tracing::info!("Using locale {}", locale);

        let keymap = match load_keymap(config.keymap.as_deref()) {
            Ok(keymap) => {
                for index in keymap.unreachable() {
                    let mapping = &keymap.mappings()[index];
                    tracing::warn!(
                        "Keymap entry {} can never fire, {} is bound earlier",
                        mapping.action.describe(),
                        mapping.combo
                    );
                }
                Some(keymap)
            }
            Err(e) => {
                tracing::warn!("Keymap not loaded: {}", e);
                ui.show_error("Keymap", &e.to_string());
                None
            }
        };

        let editor = Arc::new(Editor::new(ui).with_locale(locale));
        let dispatcher = Dispatcher::new(editor.clone(), keymap);
        let plugins = PluginManager::new(catalog).with_policy(config.duplicate_plugins);
        let scripts = ScriptManager::new(engine, config.script_workers)?;

        Ok(Self {
            editor,
            dispatcher,
            plugins,
            scripts,
        })
    }

    /// Built-in plugins and the compiled-in script engine
    pub fn with_defaults(
        ui: Arc<dyn HostUi>,
        config: &EditorConfig,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        Self::new(
            ui,
            config,
            PluginCatalog::builtin(),
            crate::scripts::default_engine(),
        )
    }

    pub fn editor(&self) -> &Arc<Editor> {
        &self.editor
    }

    /// The API handed to extensions
    pub fn api(&self) -> Arc<dyn EditorApi> {
        self.editor.clone()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    pub fn scripts(&self) -> &ScriptManager {
        &self.scripts
    }

    pub fn handle_key(&self, event: &KeyEvent) -> Dispatch {
        self.dispatcher.handle_key(event)
    }

    /// Load a plugin by identifier, showing any failure to the user
    pub fn load_plugin(&self, id: &str) -> Result<Option<Arc<dyn Plugin>>, PluginLoadError> {
        self.plugins.load(id, self.api()).inspect_err(|e| {
            tracing::error!("{}", e);
            self.editor.ui().show_error("Plugin", &e.to_string());
        })
    }

    /// Queue a script file, showing load failures to the user
    pub fn load_script(&self, path: &Path) -> Result<ScriptTicket, ScriptLoadError> {
        self.scripts.load(path, self.api()).inspect_err(|e| {
            tracing::error!("{}", e);
            self.editor.ui().show_error("Script", &e.to_string());
        })
    }

    /// Load configured plugins then queue configured scripts
    ///
    /// Failures are reported and skipped. Returned tickets belong to the
    /// scripts that were queued.
    pub fn load_startup_extensions(&self, config: &EditorConfig) -> Vec<ScriptTicket> {
        for id in &config.plugins {
            let _ = self.load_plugin(id);
        }
        config
            .scripts
            .iter()
            .filter_map(|path| self.load_script(path).ok())
            .collect()
    }

    /// Plugin display names in the editor's locale, then script names
    pub fn extension_names(&self) -> Vec<String> {
        let locale = self.editor.locale();
        self.plugins
            .plugins()
            .iter()
            .map(|plugin| plugin.name(&locale))
            .chain(self.scripts.scripts().into_iter().map(|script| script.name))
            .collect()
    }

    /// Replace the buffer with a file's content
    pub fn open(&self, path: &Path) -> Result<(), FileError> {
        let text = io::load_file(path).inspect_err(|e| {
            self.editor.ui().show_error("Open", &e.to_string());
        })?;
        self.editor.set_text(&text);
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), FileError> {
        io::save_file(path, &self.editor.text()).inspect_err(|e| {
            self.editor.ui().show_error("Save", &e.to_string());
        })
    }
}
