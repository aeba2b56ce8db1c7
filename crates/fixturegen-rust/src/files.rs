//! Rust source file collection.
//!
//! Files are returned in sorted path order so unit ids, and with them the
//! generated output, are stable across runs.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{HostResult, RustHostError};

/// One source file, relative to the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Relative path with `/` separators.
    pub rel_path: String,
    pub content: String,
}

/// Collect `.rs` files under `root`.
///
/// Skips hidden directories and `target/`.
pub fn collect_rust_files(root: &Path) -> HostResult<Vec<SourceFile>> {
    collect_rust_files_excluding(root, &[])
}

/// Collect `.rs` files under `root`, skipping anything under `exclude`.
pub fn collect_rust_files_excluding(
    root: &Path,
    exclude: &[PathBuf],
) -> HostResult<Vec<SourceFile>> {
    if !root.is_dir() {
        return Err(RustHostError::SourceNotFound {
            path: root.display().to_string(),
        });
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            let hidden = entry.depth() > 0 && name.starts_with('.');
            let excluded = exclude.iter().any(|ex| entry.path().starts_with(ex));
            !hidden && name != "target" && !excluded
        });

    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "rs") {
            continue;
        }
        let rel_path = match path.strip_prefix(root) {
            Ok(p) => p,
            Err(_) => continue,
        };
        let content = fs::read_to_string(path).map_err(|source| RustHostError::Io {
            path: path.display().to_string(),
            source,
        })?;
        files.push(SourceFile {
            rel_path: slash_path(rel_path),
            content,
        });
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}

/// Module path of a file relative to the crate's source root.
///
/// `lib.rs` and `main.rs` are the crate root; `a/mod.rs` and `a.rs` are
/// `crate::a`.
pub fn module_path_for(rel_path: &str) -> String {
    let trimmed = rel_path.strip_suffix(".rs").unwrap_or(rel_path);
    let mut segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
    match segments.last() {
        Some(&"mod") => {
            segments.pop();
        }
        Some(&"lib") | Some(&"main") if segments.len() == 1 => {
            segments.pop();
        }
        _ => {}
    }
    let mut path = String::from("crate");
    for segment in segments {
        path.push_str("::");
        path.push_str(segment);
    }
    path
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// Tests
// ============================================================================
