use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = MigrateError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("root directory {path:?} does not exist or is not a directory")]
    MissingRoot { path: PathBuf },

    #[error("failed to walk {root:?}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path:?} is neither UTF-8 nor GB18030")]
    Undecodable { path: PathBuf },

    #[error("failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy {from:?} to {to:?}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move {from:?} to {to:?}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("layout template {path:?} could not be loaded")]
    Layout {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to render sitemap: {0}")]
    Sitemap(String),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
