//! Command-line argument parsing for the editor
//!
//! Supports:
//! - Opening a file
//! - Choosing a keymap file and locale
//! - Loading extra plugins and scripts at startup

use clap::Parser;
use std::path::PathBuf;

use crate::config::EditorConfig;

/// A small extensible text editor
#[derive(Parser, Debug)]
#[command(
    name = "plume",
    version,
    about = "A small text editor with keymaps, plugins and scripts"
)]
pub struct CliArgs {
    /// File to open
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Keymap file (overrides the config file and the default keymap)
    #[arg(long, value_name = "PATH")]
    pub keymap: Option<PathBuf>,

    /// Plugin to load at startup, e.g. plume.FindPlugin (repeatable)
    #[arg(long = "plugin", value_name = "ID")]
    pub plugins: Vec<String>,

    /// Script to run at startup (repeatable)
    #[arg(long = "script", value_name = "PATH")]
    pub scripts: Vec<PathBuf>,

    /// Locale tag such as en-US or fr-FR
    #[arg(long, value_name = "TAG")]
    pub locale: Option<String>,
}

/// Configuration derived from CLI arguments and the config file
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// File to open, if any
    pub file: Option<PathBuf>,
    /// Effective editor settings
    pub editor: EditorConfig,
}

impl CliArgs {
    /// Merge CLI arguments over the loaded config
    ///
    /// Single values replace the config's; plugins and scripts given on the
    /// command line load after the configured ones.
    pub fn into_config(self, mut editor: EditorConfig) -> StartupConfig {
        if self.keymap.is_some() {
            editor.keymap = self.keymap;
        }
        if self.locale.is_some() {
            editor.locale = self.locale;
        }
        editor.plugins.extend(self.plugins);
        editor.scripts.extend(self.scripts);

        StartupConfig {
            file: self.file,
            editor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_args_keep_config() {
        let args = CliArgs::parse_from(["plume"]);
        let mut config = EditorConfig::default();
        config.locale = Some("de".to_string());

        let startup = args.into_config(config.clone());
        assert!(startup.file.is_none());
        assert_eq!(startup.editor, config);
    }

    #[test]
    fn test_cli_overrides_single_values() {
        let args = CliArgs::parse_from([
            "plume",
            "notes.txt",
            "--keymap",
            "my.keymap",
            "--locale",
            "fr-FR",
        ]);
        let mut config = EditorConfig::default();
        config.keymap = Some(PathBuf::from("config.keymap"));

        let startup = args.into_config(config);
        assert_eq!(startup.file, Some(PathBuf::from("notes.txt")));
        assert_eq!(startup.editor.keymap, Some(PathBuf::from("my.keymap")));
        assert_eq!(startup.editor.locale.as_deref(), Some("fr-FR"));
    }

    #[test]
    fn test_cli_extensions_append() {
        let args = CliArgs::parse_from([
            "plume",
            "--plugin",
            "plume.FindPlugin",
            "--script",
            "a.js",
            "--script",
            "b.js",
        ]);
        let mut config = EditorConfig::default();
        config.plugins = vec!["plume.DatePlugin".to_string()];

        let startup = args.into_config(config);
        assert_eq!(
            startup.editor.plugins,
            vec!["plume.DatePlugin".to_string(), "plume.FindPlugin".to_string()]
        );
        assert_eq!(
            startup.editor.scripts,
            vec![PathBuf::from("a.js"), PathBuf::from("b.js")]
        );
    }
}
