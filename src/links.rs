use std::collections::HashSet;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::config::MigrateConfig;
use crate::discover::{discover, FileFilter};
use crate::document::Document;
use crate::error::Result;
use crate::pipeline::{for_each_file, Outcome, RunStats};
use crate::resolve::{anchor_hrefs, is_external, resolve, strip_query_and_fragment, LinkRecord};

const BROKEN_MARKER_OPEN: &str = r#"<span style="color:red" title="Broken link">"#;
const BROKEN_MARKER_CLOSE: &str = "</span>";
const PAGE_SUFFIX: &str = ".html";

static ANCHOR_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</a\s*>").unwrap());
static ANCHOR_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<a[\s>]").unwrap());

/// Basenames of every page in the discovered set. Directories are ignored,
/// so `a/index.html` and `b/index.html` are the same entry.
#[derive(Debug, Default)]
pub struct LinkIndex {
    names: HashSet<String>,
}

impl LinkIndex {
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Self {
        let names = paths
            .iter()
            .filter_map(|p| p.as_ref().file_name())
            .filter_map(|n| n.to_str())
            .map(str::to_string)
            .collect();
        LinkIndex { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

fn broken_target(doc: &Document, href: &str, index: &LinkIndex) -> Option<PathBuf> {
    if is_external(href) || !strip_query_and_fragment(href).ends_with(PAGE_SUFFIX) {
        return None;
    }
    let target = resolve(doc.dir(), href)?;
    let name = target.file_name().and_then(|n| n.to_str())?;
    (!index.contains(name)).then_some(target)
}

/// Close tag owned by the anchor opened at `tag`: the next `</a>`, unless
/// another anchor opens first.
fn owned_close(html: &str, tag: &Range<usize>) -> Option<Range<usize>> {
    let close = ANCHOR_CLOSE_RE.find_at(html, tag.end)?;
    match ANCHOR_OPEN_RE.find_at(html, tag.end) {
        Some(open) if open.start() < close.start() => None,
        _ => Some(close.range()),
    }
}

/// Replace every broken `.html` anchor with an inert red marker.
///
/// The opening tag (and its href) is lost; the anchor's own `</a>` becomes
/// `</span>`. An anchor left unclosed keeps no close tag, so the next anchor's
/// `</a>` is never taken. Returns the broken links in document order.
pub fn check_document(doc: &mut Document, index: &LinkIndex) -> Vec<LinkRecord> {
    let broken: Vec<_> = anchor_hrefs(&doc.content)
        .into_iter()
        .filter_map(|r| broken_target(doc, &r.value, index).map(|target| (r, target)))
        .collect();
    let closes: Vec<_> = broken
        .iter()
        .map(|(reference, _)| owned_close(&doc.content, &reference.tag))
        .collect();

    // Back to front, so earlier byte ranges stay valid.
    for ((reference, _), close) in broken.iter().zip(closes).rev() {
        if let Some(close) = close {
            doc.content.replace_range(close, BROKEN_MARKER_CLOSE);
        }
        doc.content.replace_range(reference.tag.clone(), BROKEN_MARKER_OPEN);
    }

    broken
        .into_iter()
        .map(|(reference, target)| LinkRecord {
            source: doc.path.clone(),
            raw: reference.value,
            target: Some(target),
        })
        .collect()
}

pub fn print_report(broken: &[LinkRecord]) {
    if broken.is_empty() {
        println!("No broken links found.");
        return;
    }
    println!("Broken links found:");
    for link in broken {
        println!("In {}: {}", link.source.display(), link.raw);
    }
}

pub fn run(cfg: &MigrateConfig) -> Result<(RunStats, Vec<LinkRecord>)> {
    let files = discover(&cfg.output_root, &FileFilter::html_only())?;
    let index = LinkIndex::from_paths(&files);
    info!(count = files.len(), "checking links");

    let mut stats = RunStats::default();
    let mut broken = Vec::new();
    for_each_file(&files, &mut stats, |path| {
        let mut doc = Document::read(path)?;
        let found = check_document(&mut doc, &index);
        if found.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        doc.write()?;
        broken.extend(found);
        Ok(Outcome::Changed)
    });
    print_report(&broken);
    Ok((stats, broken))
}
