use tracing::info;

use crate::config::MigrateConfig;
use crate::discover::{discover, FileFilter};
use crate::document::Document;
use crate::error::Result;
use crate::pipeline::{for_each_file, Outcome, PassTracker, Pipeline, RunStats};

/// Minify every page under the output root in place.
pub fn run(cfg: &MigrateConfig) -> Result<(RunStats, PassTracker)> {
    let files = discover(&cfg.output_root, &FileFilter::html_only())?;
    info!(count = files.len(), "minifying pages");

    let mut stats = RunStats::default();
    let mut tracker = PassTracker::new();
    for_each_file(&files, &mut stats, |path| {
        let mut doc = Document::read(path)?;
        if !Pipeline::minify().apply(&mut doc, cfg, &mut tracker) {
            return Ok(Outcome::Unchanged);
        }
        doc.write()?;
        println!("Minified: {}", path.display());
        Ok(Outcome::Changed)
    });
    Ok((stats, tracker))
}
