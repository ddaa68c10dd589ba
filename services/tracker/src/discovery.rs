//! Source Discovery
//!
//! Walks the working tree for source files and reads them into memory. Anything
//! that cannot be listed or read is skipped with a warning; a bad file never
//! aborts a run.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// A source file that was read successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

/// Recursively collects files ending in `.{extension}` under `root`, skipping
/// directories whose name is listed in `skip_dirs`. Results are sorted.
pub fn find_sources(root: &Path, extension: &str, skip_dirs: &[String]) -> Vec<PathBuf> {
    let skipped = |entry: &DirEntry| {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && skip_dirs
                .iter()
                .any(|skip| entry.file_name().to_str() == Some(skip.as_str()))
    };

    let mut found = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            if skipped(e) {
                debug!(dir = %e.path().display(), "Skipping directory");
                return false;
            }
            true
        })
    {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_file()
                    && path.extension().and_then(|s| s.to_str()) == Some(extension)
                {
                    found.push(entry.into_path());
                }
            }
            Err(e) => warn!(error = %e, "Skipping unreadable entry"),
        }
    }

    found.sort();
    found
}

/// Reads every path, dropping the ones that cannot be read as UTF-8 text.
pub fn read_sources(paths: &[PathBuf]) -> Vec<SourceFile> {
    paths
        .iter()
        .filter_map(|path| match fs::read_to_string(path) {
            Ok(text) => Some(SourceFile {
                path: path.clone(),
                text,
            }),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                None
            }
        })
        .collect()
}
