use std::fs;

use itertools::Itertools;
use tracing::{debug, info};

use crate::config::MigrateConfig;
use crate::discover::{discover, FileFilter};
use crate::document::Document;
use crate::error::{MigrateError, Result};
use crate::pipeline::{for_each_file, Outcome, RunStats};
use crate::resolve::{image_srcs, is_external, resolve, ImageRecord};

/// Copy every local image the document references into the images directory
/// and point the document at the copies.
///
/// Targets are keyed by basename, so two images with the same file name
/// overwrite each other. References that do not resolve to an existing file
/// are returned with `target: None` and left as written.
pub fn extract_images(doc: &mut Document, cfg: &MigrateConfig) -> Result<Vec<ImageRecord>> {
    let sources: Vec<String> = image_srcs(&doc.content)
        .into_iter()
        .map(|r| r.value)
        .filter(|src| !is_external(src) && !src.starts_with(cfg.images_url.as_str()))
        .unique()
        .collect();

    let dir = doc.dir().to_path_buf();
    let mut records = Vec::with_capacity(sources.len());
    for raw in sources {
        let target = resolve(&dir, &raw).filter(|p| p.is_file());
        let name = target
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(str::to_string);
        if let (Some(from), Some(name)) = (&target, name) {
            fs::create_dir_all(&cfg.images_dir).map_err(|source| MigrateError::Write {
                path: cfg.images_dir.clone(),
                source,
            })?;
            let to = cfg.images_dir.join(&name);
            fs::copy(from, &to).map_err(|source| MigrateError::Copy {
                from: from.clone(),
                to: to.clone(),
                source,
            })?;
            let url = cfg.image_url(&name);
            doc.content = doc.content.replace(&raw, &url);
            println!("Copied: {} -> {}", raw, url);
        } else {
            debug!(path = %doc.path.display(), src = %raw, "image not found, reference kept");
        }
        records.push(ImageRecord {
            source: doc.path.clone(),
            raw,
            target,
        });
    }
    Ok(records)
}

pub fn run(cfg: &MigrateConfig) -> Result<RunStats> {
    let files = discover(&cfg.output_root, &FileFilter::html_only())?;
    info!(count = files.len(), dest = %cfg.images_dir.display(), "extracting images");

    let mut stats = RunStats::default();
    for_each_file(&files, &mut stats, |path| {
        let mut doc = Document::read(path)?;
        let records = extract_images(&mut doc, cfg)?;
        if records.iter().all(|r| r.target.is_none()) {
            return Ok(Outcome::Unchanged);
        }
        doc.write()?;
        Ok(Outcome::Changed)
    });
    Ok(stats)
}
