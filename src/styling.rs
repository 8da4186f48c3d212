use std::path::Path;

use tracing::{info, warn};

use crate::config::MigrateConfig;
use crate::discover::{discover, FileFilter};
use crate::document::Document;
use crate::error::Result;
use crate::pipeline::{for_each_file, Outcome, PassTracker, Pipeline, RunStats};

/// Bring one page onto the shared stylesheet, script and layout grid.
///
/// Pages that already reference the canonical stylesheet are left alone.
pub fn style_document(doc: &mut Document, cfg: &MigrateConfig, tracker: &mut PassTracker) -> Outcome {
    if doc.content.contains(cfg.stylesheet_path.as_str()) {
        return Outcome::Skipped;
    }
    if Pipeline::styling().apply(doc, cfg, tracker) {
        Outcome::Changed
    } else {
        Outcome::Unchanged
    }
}

pub fn run(cfg: &MigrateConfig) -> Result<(RunStats, PassTracker)> {
    let mut files = Vec::new();
    for root in &cfg.styling_roots {
        if !root.is_dir() {
            warn!(root = %root.display(), "content directory missing, skipping");
            continue;
        }
        files.extend(discover(root, &FileFilter::html())?);
    }
    println!("Found {} HTML files to process\n", files.len());
    info!(count = files.len(), "applying styling");

    let mut stats = RunStats::default();
    let mut tracker = PassTracker::new();
    for_each_file(&files, &mut stats, |path: &Path| {
        let mut doc = Document::read(path)?;
        let outcome = style_document(&mut doc, cfg, &mut tracker);
        match outcome {
            Outcome::Skipped => println!("✓ {} - Already has modern CSS", path.display()),
            Outcome::Changed => {
                doc.write()?;
                println!("✓ {} - Updated with modern styling", path.display());
            }
            Outcome::Unchanged => {}
        }
        Ok(outcome)
    });
    Ok((stats, tracker))
}
