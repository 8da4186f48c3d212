//! Batch migration of a Word-exported HTML site onto a modern static layout.
//!
//! Each binary under `src/bin` runs one step of the build sequence over the
//! filesystem; the steps share the pass library and pipeline runner here.

pub mod assets;
pub mod config;
pub mod discover;
pub mod document;
pub mod encoding;
pub mod error;
pub mod images;
pub mod language;
pub mod links;
pub mod migrate;
pub mod minify;
pub mod passes;
pub mod pipeline;
pub mod resolve;
pub mod sitemap;
pub mod styling;
pub mod utils;

pub use config::MigrateConfig;
pub use document::Document;
pub use error::{MigrateError, Result};
pub use passes::Pass;
pub use pipeline::{PassTracker, Pipeline, RunStats};
