//! Workspace source discovery.

use colored::*;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Source files discovered in one workspace, bucketed by language.
///
/// Headers are collected for reporting only; they are never compiled.
#[derive(Debug, Default, Clone)]
pub struct SourceSet {
    pub cpp: Vec<PathBuf>,
    pub c: Vec<PathBuf>,
    pub headers: Vec<PathBuf>,
}

impl SourceSet {
    /// Number of files the pipeline will actually compile.
    pub fn compilable_count(&self) -> usize {
        self.cpp.len() + self.c.len()
    }
}

fn is_pruned(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    match entry.file_name().to_str() {
        // Hidden directories (covers the .lumos output tree), stray build
        // directories and package metadata are never descended into.
        Some(name) => name.starts_with('.') || name == "build" || name == "node_modules",
        None => false,
    }
}

/// Recursively collect the compilable sources under `workspace_root`.
///
/// Traversal order is sorted by file name at every level, so two scans of an
/// unchanged tree always produce identical buckets. An unreadable
/// subdirectory is reported and skipped; it never aborts the scan.
pub fn scan(workspace_root: &Path) -> SourceSet {
    let mut sources = SourceSet::default();

    let walker = WalkDir::new(workspace_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_pruned(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!("{} Skipping unreadable path: {}", "!".yellow(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => continue,
        };

        match ext.as_str() {
            "cpp" | "ino" => sources.cpp.push(path.to_path_buf()),
            "c" => sources.c.push(path.to_path_buf()),
            "h" | "hpp" => sources.headers.push(path.to_path_buf()),
            _ => {}
        }
    }

    sources
}
