use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::config::MigrateConfig;
use crate::discover::{discover, FileFilter};
use crate::document::Document;
use crate::error::{MigrateError, Result};
use crate::pipeline::{for_each_file, Outcome, PassTracker, Pipeline, RunStats};

static BODY_INNER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*)</body\s*>").unwrap());

/// The site template with one title and one content placeholder.
#[derive(Debug, Clone)]
pub struct Layout {
    template: String,
    title_placeholder: String,
    content_placeholder: String,
}

impl Layout {
    pub fn load(path: &Path, cfg: &MigrateConfig) -> Result<Self> {
        let template = fs::read_to_string(path).map_err(|source| MigrateError::Layout {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_template(template, cfg))
    }

    pub fn from_template(template: impl Into<String>, cfg: &MigrateConfig) -> Self {
        Layout {
            template: template.into(),
            title_placeholder: cfg.title_placeholder.clone(),
            content_placeholder: cfg.content_placeholder.clone(),
        }
    }

    /// Verbatim substitution of the first occurrence of each placeholder,
    /// title before content.
    pub fn render(&self, title: &str, content: &str) -> String {
        self.template
            .replacen(&self.title_placeholder, title, 1)
            .replacen(&self.content_placeholder, content, 1)
    }
}

/// Inner text of `<body>`, or the whole document when there is none.
pub fn body_content(html: &str) -> &str {
    BODY_INNER_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(html)
}

/// Clean one page and wrap it in the layout. Returns the rendered page.
pub fn migrate_document(
    doc: &Document,
    layout: &Layout,
    cfg: &MigrateConfig,
    tracker: &mut PassTracker,
) -> String {
    let title = doc.title().unwrap_or_else(|| cfg.default_title.clone());
    let mut cleaned = doc.clone();
    Pipeline::clean().apply(&mut cleaned, cfg, tracker);
    layout.render(&title, body_content(&cleaned.content))
}

pub fn output_path(cfg: &MigrateConfig, source: &Path) -> Option<PathBuf> {
    source.file_name().map(|name| cfg.output_root.join(name))
}

pub fn run(cfg: &MigrateConfig) -> Result<(RunStats, PassTracker)> {
    let layout = Layout::load(&cfg.layout_path, cfg)?;
    let filter = FileFilter::html().excluding(cfg.exclude_prefixes.iter().map(PathBuf::from));
    let files = discover(&cfg.source_root, &filter)?;
    info!(count = files.len(), root = %cfg.source_root.display(), "found source pages");

    fs::create_dir_all(&cfg.output_root).map_err(|source| MigrateError::Write {
        path: cfg.output_root.clone(),
        source,
    })?;

    let mut stats = RunStats::default();
    let mut tracker = PassTracker::new();
    for_each_file(&files, &mut stats, |path| {
        let Some(target) = output_path(cfg, path) else {
            return Ok(Outcome::Skipped);
        };
        let doc = Document::read(path)?;
        let page = Document::new(target.clone(), migrate_document(&doc, &layout, cfg, &mut tracker));
        page.write()?;
        debug!(from = %path.display(), to = %target.display(), bytes = page.content.len(), "migrated");
        println!("Migrated: {} -> {}", path.display(), target.display());
        Ok(Outcome::Changed)
    });
    Ok((stats, tracker))
}
