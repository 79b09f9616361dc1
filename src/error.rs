use std::path::PathBuf;
use thiserror::Error;

/// Conditions that abort a split before any chapter is processed.
#[derive(Error, Debug)]
pub enum SplitError {
    #[error("File not found - {}", path.display())]
    NotFound { path: PathBuf },

    #[error("{source:#}")]
    Open {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("No top-level chapters (level 1) found.")]
    NoChapters { path: PathBuf },

    #[error("Cannot create directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SplitError>;
