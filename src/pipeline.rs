use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::MigrateConfig;
use crate::document::Document;
use crate::error::Result;
use crate::passes::Pass;

/// A fixed, ordered list of passes.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    pub name: &'static str,
    pub passes: &'static [Pass],
}

impl Pipeline {
    /// Legacy markup cleanup run by `clean_and_migrate`.
    pub const fn clean() -> Self {
        Pipeline {
            name: "clean",
            passes: &[
                Pass::StripProcessingInstructions,
                Pass::StripStyles,
                Pass::StripLegacyMetadata,
                Pass::StripOfficeMarkup,
                Pass::StripDeprecatedElements,
                Pass::StripListComments,
                Pass::CollapseEmptyParagraphs,
                Pass::ConvertTableLayout,
                Pass::EnsureImageAlt,
                Pass::NormalizeCharset,
                Pass::CollapseBlankLines,
            ],
        }
    }

    pub const fn styling() -> Self {
        Pipeline {
            name: "styling",
            passes: &[
                Pass::RemoveDeadCssLinks,
                Pass::StripStyleBlocks,
                Pass::EnsureViewport,
                Pass::EnsureStylesheet,
                Pass::EnsureScript,
                Pass::EnsureDoctype,
                Pass::WrapLayoutGrid,
            ],
        }
    }

    /// Charset declarations only, for pages transcoded to UTF-8.
    pub const fn encoding() -> Self {
        Pipeline {
            name: "encoding",
            passes: &[Pass::NormalizeCharset],
        }
    }

    pub const fn minify() -> Self {
        Pipeline {
            name: "minify",
            passes: &[Pass::Minify],
        }
    }

    /// Run every pass over the document in order. Returns whether the
    /// content changed.
    pub fn apply(&self, doc: &mut Document, cfg: &MigrateConfig, tracker: &mut PassTracker) -> bool {
        let original_len = doc.content.len();
        let mut changed = false;
        for &pass in self.passes {
            let before = doc.content.len();
            let next = pass.apply(&doc.content, cfg).into_owned();
            let pass_changed = next != doc.content;
            if pass_changed {
                doc.content = next;
                changed = true;
            }
            tracker.record(pass, before, doc.content.len(), pass_changed);
        }
        debug!(
            path = %doc.path.display(),
            pipeline = self.name,
            before = original_len,
            after = doc.content.len(),
            changed,
            "pipeline applied"
        );
        changed
    }
}

/// Per-pass byte totals across every document a pipeline touched.
#[derive(Debug, Default)]
pub struct PassTracker {
    metrics: Vec<PassMetric>,
}

#[derive(Debug, Clone)]
pub struct PassMetric {
    pub pass: Pass,
    pub documents: usize,
    pub changed: usize,
    pub before: usize,
    pub after: usize,
}

impl PassTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pass: Pass, before: usize, after: usize, changed: bool) {
        let idx = match self.metrics.iter().position(|m| m.pass == pass) {
            Some(idx) => idx,
            None => {
                self.metrics.push(PassMetric {
                    pass,
                    documents: 0,
                    changed: 0,
                    before: 0,
                    after: 0,
                });
                self.metrics.len() - 1
            }
        };
        let metric = &mut self.metrics[idx];
        metric.documents += 1;
        metric.changed += usize::from(changed);
        metric.before += before;
        metric.after += after;
    }

    pub fn metrics(&self) -> &[PassMetric] {
        &self.metrics
    }

    pub fn print(&self) {
        if self.metrics.is_empty() {
            return;
        }
        println!("\nPer-pass totals:");
        for m in &self.metrics {
            println!(
                "  {:<30} changed {:>4}/{:<4} bytes {} -> {} (removed {})",
                m.pass.name(),
                m.changed,
                m.documents,
                m.before,
                m.after,
                m.before.saturating_sub(m.after)
            );
        }
    }
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Unchanged,
    Skipped,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub scanned: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: Vec<PathBuf>,
}

impl RunStats {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Changed => self.changed += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    pub fn print(&self) {
        println!(
            "\nFiles: {} scanned, {} changed, {} unchanged, {} skipped, {} failed",
            self.scanned,
            self.changed,
            self.unchanged,
            self.skipped,
            self.failed.len()
        );
        for path in &self.failed {
            println!("  failed: {}", path.display());
        }
    }
}

/// Visit every file, isolating failures: an error on one file is logged and
/// counted, and the walk moves on.
pub fn for_each_file<F>(files: &[PathBuf], stats: &mut RunStats, mut visit: F)
where
    F: FnMut(&Path) -> Result<Outcome>,
{
    for path in files {
        stats.scanned += 1;
        match visit(path) {
            Ok(outcome) => stats.record(outcome),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping file");
                stats.failed.push(path.clone());
            }
        }
    }
}
