//! Reading and writing documents (UTF-8)

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Maximum file size in bytes (50 MB)
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Cannot open directory: {}", .0.display())]
    IsDirectory(PathBuf),

    #[error("{} is too large ({size_mb:.1} MB, max 50 MB)", .path.display())]
    TooLarge { path: PathBuf, size_mb: f64 },

    #[error("{} is not valid UTF-8 text", .0.display())]
    NotUtf8(PathBuf),

    #[error("Error accessing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn classify(path: &Path, e: std::io::Error) -> FileError {
    match e.kind() {
        ErrorKind::NotFound => FileError::NotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => FileError::PermissionDenied(path.to_path_buf()),
        ErrorKind::InvalidData => FileError::NotUtf8(path.to_path_buf()),
        _ => FileError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    }
}

/// Read a text file after checking it is a regular file of sane size
pub fn load_file(path: &Path) -> Result<String, FileError> {
    let metadata = fs::metadata(path).map_err(|e| classify(path, e))?;

    if metadata.is_dir() {
        return Err(FileError::IsDirectory(path.to_path_buf()));
    }

    if metadata.len() > MAX_FILE_SIZE {
        return Err(FileError::TooLarge {
            path: path.to_path_buf(),
            size_mb: metadata.len() as f64 / (1024.0 * 1024.0),
        });
    }

    let text = fs::read_to_string(path).map_err(|e| classify(path, e))?;
    tracing::info!("Opened {} ({} bytes)", path.display(), text.len());
    Ok(text)
}

/// Write `text` as UTF-8, replacing the file
pub fn save_file(path: &Path, text: &str) -> Result<(), FileError> {
    fs::write(path, text).map_err(|e| classify(path, e))?;
    tracing::info!("Saved {} ({} bytes)", path.display(), text.len());
    Ok(())
}
