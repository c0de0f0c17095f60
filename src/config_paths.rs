//! Where plume keeps its files
//!
//! Everything lives in one directory:
//! - Unix/macOS: `$XDG_CONFIG_HOME/plume/` or `~/.config/plume/`
//! - Windows: `%APPDATA%\plume\`
//!
//! ```text
//! plume/
//! ├── config.yaml      editor settings
//! ├── default.keymap   user keymap, replaces the embedded one
//! └── logs/            plume.log.YYYY-MM-DD
//! ```

use std::io;
use std::path::PathBuf;

const APP_DIR: &str = "plume";

/// Prefix of the daily log files
pub const LOG_FILE_NAME: &str = "plume.log";

/// The plume config directory, if the platform has one
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let base = std::env::var_os("APPDATA").map(PathBuf::from);

    #[cfg(not(target_os = "windows"))]
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

    base.map(|dir| dir.join(APP_DIR))
}

pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// User keymap, used when no keymap is configured explicitly
pub fn keymap_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("default.keymap"))
}

pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// Create the logs directory (and its parents) if needed
pub fn ensure_logs_dir() -> io::Result<PathBuf> {
    let dir = logs_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory"))?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
