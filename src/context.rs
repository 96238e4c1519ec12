//! Project context scanning.
//!
//! Produces the manifest that grounds generation in the real project layout:
//! one line per directory or source file beneath the project root.
//!
//! ```text
//! [DIR] src
//! [FILE] src/app.ts
//! [DIR] src/pages
//! [FILE] src/pages/login.tsx
//! ```
//!
//! Entries appear in the order the filesystem enumerates them. Dependency and
//! version-control directories are pruned along with everything below them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{ForgeError, ForgeResult};

/// Directories never descended into
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "target",
    "dist",
    "build",
    ".next",
    "coverage",
];

/// File extensions treated as source files
pub const DEFAULT_SOURCE_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "mjs", "cjs", "json", "html", "css", "py", "vue", "svelte",
];

/// Marker for directory lines
pub const DIR_MARKER: &str = "[DIR]";

/// Marker for file lines
pub const FILE_MARKER: &str = "[FILE]";

/// What to prune and what to keep while scanning
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory names excluded from the manifest together with their subtree
    pub excluded_dirs: Vec<String>,
    /// Paths relative to the root excluded together with their subtree
    pub excluded_paths: Vec<PathBuf>,
    /// Recognized source extensions, without the leading dot
    pub extensions: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            excluded_paths: Vec::new(),
            extensions: DEFAULT_SOURCE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScanOptions {
    pub fn exclude(mut self, dir: impl Into<String>) -> Self {
        self.excluded_dirs.push(dir.into());
        self
    }

    pub fn exclude_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded_paths.push(path.into());
        self
    }

    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extensions.push(ext.into());
        self
    }

    fn is_excluded(&self, root: &Path, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }

        let by_name = entry
            .file_name()
            .to_str()
            .map(|name| self.excluded_dirs.iter().any(|d| d == name))
            .unwrap_or(false);

        by_name
            || entry
                .path()
                .strip_prefix(root)
                .map(|rel| self.excluded_paths.iter().any(|p| p == rel))
                .unwrap_or(false)
    }

    fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// Scan a project root with the default options
pub fn scan_project(root: &Path) -> ForgeResult<String> {
    scan_project_with(root, &ScanOptions::default())
}

/// Scan a project root, returning the newline-joined manifest.
///
/// Fails with `ForgeError::ProjectRoot` when the root is missing or cannot be
/// listed. Unreadable entries further down are skipped with a warning.
pub fn scan_project_with(root: &Path, options: &ScanOptions) -> ForgeResult<String> {
    // Surface a missing or unreadable root before walking
    fs::read_dir(root).map_err(|e| ForgeError::ProjectRoot {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut lines = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !options.is_excluded(root, entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry during scan: {}", e);
                continue;
            }
        };

        let relative = match entry.path().strip_prefix(root) {
            Ok(rel) => display_path(rel),
            Err(_) => continue,
        };

        if entry.file_type().is_dir() {
            lines.push(format!("{} {}", DIR_MARKER, relative));
        } else if entry.file_type().is_file() && options.is_source_file(entry.path()) {
            lines.push(format!("{} {}", FILE_MARKER, relative));
        }
    }

    debug!("Scanned {} entries under {}", lines.len(), root.display());
    Ok(lines.join("\n"))
}

/// Render a relative path with `/` separators on every platform
fn display_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_extension_match() {
        let options = ScanOptions::default();
        assert!(options.is_source_file(Path::new("a/b/login.spec.ts")));
        assert!(options.is_source_file(Path::new("index.HTML")));
        assert!(!options.is_source_file(Path::new("logo.png")));
        assert!(!options.is_source_file(Path::new("Makefile")));
    }

    #[test]
    fn test_display_path_uses_forward_slashes() {
        let path: std::path::PathBuf = ["src", "pages", "home.tsx"].iter().collect();
        assert_eq!(display_path(&path), "src/pages/home.tsx");
    }

    #[test]
    fn test_options_builder() {
        let options = ScanOptions::default().exclude("vendor").extension("rb");
        assert!(options.excluded_dirs.iter().any(|d| d == "vendor"));
        assert!(options.is_source_file(Path::new("app.rb")));
    }

    #[test]
    fn test_excluded_path_prunes_only_that_subtree() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("e2e/generated/playwright")).unwrap();
        fs::write(dir.path().join("e2e/generated/playwright/generated.spec.ts"), "").unwrap();
        fs::write(dir.path().join("e2e/login.spec.ts"), "").unwrap();

        let options = ScanOptions::default().exclude_path("e2e/generated");
        let manifest = scan_project_with(dir.path(), &options).unwrap();

        assert!(manifest.contains("[FILE] e2e/login.spec.ts"));
        assert!(!manifest.contains("generated"));
    }
}
