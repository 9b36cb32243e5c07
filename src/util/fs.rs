//! Path helpers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// `mkdir -p`.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("failed to create directory {}", path.display()))
}

/// Write `contents` to `path`, creating missing parent directories.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent)?,
        _ => {}
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Absolute form of `path`, without resolving symlinks. Falls back to the
/// input if the current directory cannot be read.
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// `path` if absolute, otherwise `base/path`.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
