//! Editor configuration
//!
//! Stores user preferences in `~/.config/plume/config.yaml`:
//!
//! ```yaml
//! keymap: /home/me/my.keymap
//! locale: fr-FR
//! script_workers: 4
//! duplicate_plugins: ignore   # or: error
//! plugins:
//!   - plume.DatePlugin
//! scripts:
//!   - /home/me/scripts/emoji.js
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::plugins::DuplicatePolicy;

/// Editor configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Keymap file; `None` uses the user keymap or the embedded default
    #[serde(default)]
    pub keymap: Option<PathBuf>,

    /// Locale tag such as `en-US`; `None` reads the environment
    #[serde(default)]
    pub locale: Option<String>,

    /// Size of the script worker pool
    #[serde(default = "default_script_workers")]
    pub script_workers: usize,

    /// What loading an already-loaded plugin does
    #[serde(default)]
    pub duplicate_plugins: DuplicatePolicy,

    /// Plugin identifiers loaded at startup
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Script files loaded at startup
    #[serde(default)]
    pub scripts: Vec<PathBuf>,
}

fn default_script_workers() -> usize {
    4
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            keymap: None,
            locale: None,
            script_workers: default_script_workers(),
            duplicate_plugins: DuplicatePolicy::default(),
            plugins: Vec::new(),
            scripts: Vec::new(),
        }
    }
}

impl EditorConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse config from YAML text, missing fields take their defaults
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        let mut config: Self = serde_yaml::from_str(content)?;
        if config.script_workers == 0 {
            tracing::warn!("script_workers must be at least 1, using 1");
            config.script_workers = 1;
        }
        Ok(config)
    }
}
