use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{MigrateError, Result};

const HIDDEN_MARKER: char = '.';

/// Which files a walk should yield.
#[derive(Debug, Clone)]
pub struct FileFilter {
    pub extensions: Vec<&'static str>,
    pub skip_hidden: bool,
    pub recursive: bool,
    /// Paths relative to the root that start with any of these are ignored.
    pub exclude_prefixes: Vec<PathBuf>,
}

impl FileFilter {
    /// `.html` and `.htm`, recursive, hidden directories skipped.
    pub fn html() -> Self {
        FileFilter {
            extensions: vec!["html", "htm"],
            skip_hidden: true,
            recursive: true,
            exclude_prefixes: Vec::new(),
        }
    }

    pub fn html_only() -> Self {
        FileFilter {
            extensions: vec!["html"],
            ..Self::html()
        }
    }

    pub fn top_level(mut self) -> Self {
        self.recursive = false;
        self
    }

    pub fn excluding<I, P>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.exclude_prefixes.extend(prefixes.into_iter().map(Into::into));
        self
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    fn is_excluded(&self, root: &Path, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        if self.skip_hidden
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with(HIDDEN_MARKER))
                .unwrap_or(false)
        {
            return true;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            return false;
        };
        self.exclude_prefixes.iter().any(|p| rel.starts_with(p))
    }
}

/// List the files under `root` that pass `filter`, in traversal order.
///
/// The order is whatever the filesystem yields and is not sorted. A missing
/// root and any error below it abort the walk.
pub fn discover(root: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(MigrateError::MissingRoot {
            path: root.to_path_buf(),
        });
    }

    let mut walker = WalkDir::new(root);
    if !filter.recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| !filter.is_excluded(root, e))
    {
        let entry = entry.map_err(|source| MigrateError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && filter.matches_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
