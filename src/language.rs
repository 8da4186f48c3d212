use std::fmt;
use std::fs;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::config::MigrateConfig;
use crate::discover::{discover, FileFilter};
use crate::document::Document;
use crate::error::{MigrateError, Result};
use crate::pipeline::{for_each_file, Outcome, RunStats};

const CHINESE_MARKERS: &[&str] = &[
    "cht", "zh", "chinese", "why", "duty", "gaogen", "變語音", "視頻", "中文",
];
const ENGLISH_MARKERS: &[&str] = &[
    "en", "english", "western", "russian", "french", "german", "italian", "japanese",
];
const MULTILINGUAL_MARKERS: &[&str] = &["ch-en", "multilingual", "indexchen", "bbch"];

static HAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{Han}").unwrap());
static ENGLISH_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:the|and|dna|science|origin|species|human|book|chapter|guide)\b").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageLabel {
    Chinese,
    English,
    Multilingual,
    Other,
}

impl LanguageLabel {
    pub const ALL: [LanguageLabel; 4] = [
        LanguageLabel::English,
        LanguageLabel::Chinese,
        LanguageLabel::Multilingual,
        LanguageLabel::Other,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            LanguageLabel::Chinese => "chinese",
            LanguageLabel::English => "english",
            LanguageLabel::Multilingual => "multilingual",
            LanguageLabel::Other => "other",
        }
    }
}

impl fmt::Display for LanguageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

fn has_marker(file_name: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| file_name.contains(m))
}

/// Ordered rule cascade, first match wins: filename markers (Chinese,
/// English, multilingual), then any Han code point in the content, then
/// common English words.
pub fn classify(file_name: &str, content: &str) -> LanguageLabel {
    let name = file_name.to_lowercase();
    if has_marker(&name, CHINESE_MARKERS) || HAN_RE.is_match(&name) {
        return LanguageLabel::Chinese;
    }
    if has_marker(&name, ENGLISH_MARKERS) {
        return LanguageLabel::English;
    }
    if has_marker(&name, MULTILINGUAL_MARKERS) {
        return LanguageLabel::Multilingual;
    }
    if HAN_RE.is_match(content) {
        return LanguageLabel::Chinese;
    }
    if ENGLISH_WORD_RE.is_match(content) {
        return LanguageLabel::English;
    }
    LanguageLabel::Other
}

/// Move each top-level page of the output root into its language directory.
pub fn run(cfg: &MigrateConfig) -> Result<RunStats> {
    for label in LanguageLabel::ALL {
        let dir = cfg.output_root.join(label.dir_name());
        fs::create_dir_all(&dir).map_err(|source| MigrateError::Write { path: dir, source })?;
    }

    let files = discover(&cfg.output_root, &FileFilter::html_only().top_level())?;
    info!(count = files.len(), "sorting pages by language");

    let mut stats = RunStats::default();
    for_each_file(&files, &mut stats, |path| {
        let doc = Document::read(path)?;
        let Some(name) = doc.file_name() else {
            return Ok(Outcome::Skipped);
        };
        let label = classify(name, &doc.content);
        let target = cfg.output_root.join(label.dir_name()).join(name);
        fs::rename(path, &target).map_err(|source| MigrateError::Move {
            from: path.to_path_buf(),
            to: target.clone(),
            source,
        })?;
        println!("Moved: {} -> {}/", name, label);
        Ok(Outcome::Changed)
    });
    Ok(stats)
}
