use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use encoding_rs::UTF_8;
use regex::Regex;
use tracing::debug;

use crate::encoding::decode;
use crate::error::{MigrateError, Result};

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").unwrap());

/// One HTML file held in memory between a read and a write.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub content: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Document {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| MigrateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let (content, encoding) = decode(bytes).ok_or_else(|| MigrateError::Undecodable {
            path: path.to_path_buf(),
        })?;
        if encoding != UTF_8 {
            debug!(path = %path.display(), encoding = encoding.name(), "decoded legacy page");
        }
        Ok(Document::new(path, content))
    }

    pub fn write(&self) -> Result<()> {
        self.write_to(&self.path)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let map = |source| MigrateError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(map)?;
        }
        fs::write(path, &self.content).map_err(map)
    }

    /// Directory relative references are resolved against.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    pub fn title(&self) -> Option<String> {
        TITLE_RE
            .captures(&self.content)
            .map(|caps| caps[1].trim().to_string())
            .filter(|t| !t.is_empty())
    }
}
