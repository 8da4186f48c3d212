//! Conversion of legacy Chinese pages to UTF-8.
//!
//! Word saved most of the site as GB2312 or GBK. GB18030 is a superset of
//! both, so one decoder covers every legacy page.

use std::fs;
use std::path::PathBuf;

use encoding_rs::{Encoding, GB18030, UTF_8};
use tracing::{debug, info};

use crate::config::MigrateConfig;
use crate::discover::{discover, FileFilter};
use crate::document::Document;
use crate::error::{MigrateError, Result};
use crate::pipeline::{for_each_file, Outcome, PassTracker, Pipeline, RunStats};

/// Decode page bytes as UTF-8, falling back to GB18030. Returns the text and
/// the encoding that read it cleanly, or `None` when neither does.
pub fn decode(bytes: Vec<u8>) -> Option<(String, &'static Encoding)> {
    let bytes = match String::from_utf8(bytes) {
        Ok(text) => return Some((text, UTF_8)),
        Err(e) => e.into_bytes(),
    };
    let (text, had_errors) = GB18030.decode_without_bom_handling(&bytes);
    if had_errors {
        return None;
    }
    Some((text.into_owned(), GB18030))
}

/// Rewrite every legacy-encoded source page as UTF-8 and update its charset
/// declaration. Pages already in UTF-8 only get the declaration fixed.
pub fn run(cfg: &MigrateConfig) -> Result<(RunStats, PassTracker)> {
    let filter = FileFilter::html().excluding(cfg.exclude_prefixes.iter().map(PathBuf::from));
    let files = discover(&cfg.source_root, &filter)?;
    info!(count = files.len(), root = %cfg.source_root.display(), "checking page encodings");

    let mut stats = RunStats::default();
    let mut tracker = PassTracker::new();
    for_each_file(&files, &mut stats, |path| {
        let bytes = fs::read(path).map_err(|source| MigrateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let (content, encoding) = decode(bytes).ok_or_else(|| MigrateError::Undecodable {
            path: path.to_path_buf(),
        })?;
        let transcoded = encoding != UTF_8;
        let mut doc = Document::new(path, content);
        let declared = Pipeline::encoding().apply(&mut doc, cfg, &mut tracker);
        if !transcoded && !declared {
            debug!(path = %path.display(), "already utf-8");
            return Ok(Outcome::Unchanged);
        }
        doc.write()?;
        println!("Fixed: {} (was {})", path.display(), encoding.name());
        Ok(Outcome::Changed)
    });
    Ok((stats, tracker))
}
