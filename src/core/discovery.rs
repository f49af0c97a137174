//! Recursive discovery of request-definition files under a root directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use regex::Regex;

/// Default pattern for request-definition files.
pub const DEFAULT_FILE_PATTERN: &str = r"\.http$";

/// A discovered file: the path to open plus the label shown in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Path relative to the scan root, `/`-separated.
    pub display: String,
}

/// Walk `root` recursively and collect files whose relative path matches
/// `pattern`. Entries within a directory are visited in lexical order.
///
/// The root itself must be readable; unreadable subdirectories are skipped.
/// Symlinked directories are not descended into.
pub fn discover(root: &Path, pattern: &Regex) -> io::Result<Vec<FileEntry>> {
    let mut found = Vec::new();
    let metadata = fs::metadata(root)?;
    if !metadata.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotADirectory,
            format!("{} is not a directory", root.display()),
        ));
    }
    walk(root, root, pattern, &mut found, true)?;
    debug!("Discovered {} files under {}", found.len(), root.display());
    Ok(found)
}

fn walk(
    root: &Path,
    dir: &Path,
    pattern: &Regex,
    found: &mut Vec<FileEntry>,
    is_root: bool,
) -> io::Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if !is_root => {
            warn!("Skipping unreadable directory {}: {}", dir.display(), e);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let mut children: Vec<(PathBuf, fs::FileType)> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_type().ok().map(|ft| (e.path(), ft)))
        .collect();
    children.sort_by(|a, b| a.0.cmp(&b.0));

    // DirEntry::file_type does not follow links
    for (path, file_type) in children {
        if file_type.is_dir() {
            walk(root, &path, pattern, found, false)?;
            continue;
        }
        if file_type.is_symlink() && path.is_dir() {
            debug!("Not following directory link {}", path.display());
            continue;
        }
        let display = relative_label(root, &path);
        if pattern.is_match(&display) {
            found.push(FileEntry { path, display });
        }
    }
    Ok(())
}

fn relative_label(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
