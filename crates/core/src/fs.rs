//! Filesystem utilities

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::trace;

/// Check if a path is an existing directory
pub fn is_directory(path: &Path) -> bool {
    path.is_dir()
}

/// Normalize an extension filter so both "txt" and ".txt" match `*.txt`
pub fn normalize_extension(extension: &str) -> &str {
    extension.trim_start_matches('.')
}

/// List regular files directly under `dir` whose extension matches `extension`
///
/// The result is sorted by path so callers see a stable processing order.
/// Subdirectories are not descended into.
pub fn list_files_with_extension(dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let wanted = normalize_extension(extension);
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == wanted);
        if matches {
            trace!("matched file: {}", path.display());
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
