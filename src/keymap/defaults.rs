//! Default keymap for the editor
//!
//! The default keymap ships embedded in the binary. A user keymap at
//! `~/.config/plume/default.keymap`, or a path given explicitly, replaces it.

use std::path::Path;

use super::binding::KeyMapping;
use super::config::{load_keymap_file, parse_keymap, KeymapError};
use super::keymap::Keymap;

/// Default keymap embedded at compile time
const DEFAULT_KEYMAP: &str = include_str!("../../default.keymap");

/// Get the embedded default keymap text
pub fn get_default_keymap_text() -> &'static str {
    DEFAULT_KEYMAP
}

/// Parse the embedded default keymap
pub fn default_mappings() -> Vec<KeyMapping> {
    match parse_keymap(DEFAULT_KEYMAP) {
        Ok(mappings) => mappings,
        Err(e) => {
            tracing::warn!("Failed to parse embedded keymap: {}", e);
            Vec::new()
        }
    }
}

/// Load the keymap to use at startup
///
/// Source order (the first that exists is used, there is no merging):
/// 1. `explicit`, when given
/// 2. The user keymap in the config directory
/// 3. The embedded default keymap
///
/// An explicit path that cannot be read is an error rather than a fallback.
pub fn load_keymap(explicit: Option<&Path>) -> Result<Keymap, KeymapError> {
    if let Some(path) = explicit {
        let mappings = load_keymap_file(path)?;
        tracing::info!(
            "Loaded keymap from {} ({} mappings)",
            path.display(),
            mappings.len()
        );
        return Ok(Keymap::with_mappings(mappings));
    }

    if let Some(user_path) = crate::config_paths::keymap_file() {
        if user_path.exists() {
            let mappings = load_keymap_file(&user_path)?;
            tracing::info!(
                "Loaded user keymap from {} ({} mappings)",
                user_path.display(),
                mappings.len()
            );
            return Ok(Keymap::with_mappings(mappings));
        }
    }

    let mappings = parse_keymap(DEFAULT_KEYMAP)?;
    tracing::info!("Loaded embedded default keymap ({} mappings)", mappings.len());
    Ok(Keymap::with_mappings(mappings))
}
