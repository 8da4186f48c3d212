//! Relocation of Word `<page>_files` asset folders.
//!
//! Word saves the images of `Page.htm` under `Page_files/`. Each such folder
//! is emptied into `<page_assets_dir>/<slug>/` and the pages named after it
//! are pointed at the new location.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::MigrateConfig;
use crate::discover::{discover, FileFilter};
use crate::document::Document;
use crate::error::{MigrateError, Result};
use crate::pipeline::{for_each_file, Outcome, RunStats};
use crate::utils::{relative_display, slugify};

const ASSET_DIR_SUFFIX: &str = "_files";

/// Every `*_files` directory under `root`, outermost only.
pub fn asset_folders(root: &Path, page_assets: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(MigrateError::MissingRoot {
            path: root.to_path_buf(),
        });
    }
    let mut folders = Vec::new();
    let mut walker = WalkDir::new(root).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|source| MigrateError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || entry.path().starts_with(page_assets) {
            walker.skip_current_dir();
            continue;
        }
        if name.len() > ASSET_DIR_SUFFIX.len() && name.ends_with(ASSET_DIR_SUFFIX) {
            folders.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }
    Ok(folders)
}

/// Move the children of `from` into `to`, leaving existing targets alone,
/// then drop `from` if it ended up empty. Returns how many entries moved.
fn move_children(from: &Path, to: &Path) -> Result<usize> {
    fs::create_dir_all(to).map_err(|source| MigrateError::Write {
        path: to.to_path_buf(),
        source,
    })?;
    let entries = fs::read_dir(from).map_err(|source| MigrateError::Read {
        path: from.to_path_buf(),
        source,
    })?;

    let mut moved = 0;
    for entry in entries {
        let entry = entry.map_err(|source| MigrateError::Read {
            path: from.to_path_buf(),
            source,
        })?;
        let target = to.join(entry.file_name());
        if target.exists() {
            println!("[skip] {} already exists", target.display());
            continue;
        }
        fs::rename(entry.path(), &target).map_err(|source| MigrateError::Move {
            from: entry.path(),
            to: target.clone(),
            source,
        })?;
        moved += 1;
    }

    if let Err(e) = fs::remove_dir(from) {
        debug!(path = %from.display(), error = %e, "asset folder left in place");
    }
    Ok(moved)
}

/// Point `<folder>/…` and `<folder>\…` references at `prefix`.
pub fn rewrite_references(doc: &mut Document, folder_name: &str, prefix: &str) -> bool {
    let rewritten = doc
        .content
        .replace(&format!("{folder_name}/"), prefix)
        .replace(&format!("{folder_name}\\"), prefix);
    if rewritten == doc.content {
        return false;
    }
    doc.content = rewritten;
    true
}

pub fn run(cfg: &MigrateConfig) -> Result<(RunStats, usize)> {
    let root = &cfg.source_root;
    let page_assets = root.join(&cfg.page_assets_dir);
    let folders = asset_folders(root, &page_assets)?;
    let pages = discover(root, &FileFilter::html())?;
    info!(folders = folders.len(), pages = pages.len(), "relocating page assets");

    let assets_prefix = cfg
        .page_assets_dir
        .to_string_lossy()
        .replace('\\', "/")
        .trim_end_matches('/')
        .to_string();

    let mut stats = RunStats::default();
    let mut pages_updated = 0;
    for_each_file(&folders, &mut stats, |folder| {
        let Some(folder_name) = folder.file_name().and_then(|n| n.to_str()) else {
            return Ok(Outcome::Skipped);
        };
        let base = &folder_name[..folder_name.len() - ASSET_DIR_SUFFIX.len()];
        let slug = slugify(base);
        if slug.is_empty() {
            warn!(folder = %folder.display(), "no usable slug, folder left in place");
            return Ok(Outcome::Skipped);
        }

        let dest = page_assets.join(&slug);
        println!(
            "[move] {} -> {}",
            relative_display(root, folder),
            relative_display(root, &dest)
        );
        move_children(folder, &dest)?;

        let prefix = format!("{assets_prefix}/{slug}/");
        let owners = pages.iter().filter(|p| {
            p.file_stem().and_then(|s| s.to_str()) == Some(base)
        });
        for page in owners {
            let mut doc = Document::read(page)?;
            if rewrite_references(&mut doc, folder_name, &prefix) {
                doc.write()?;
                pages_updated += 1;
                println!("[update] {}", relative_display(root, page));
            }
        }
        Ok(Outcome::Changed)
    });

    println!(
        "\nComplete! Moved {} asset folder(s). Updated {} HTML file(s).",
        stats.changed, pages_updated
    );
    Ok((stats, pages_updated))
}
