//! Error types for the library seams.
//!
//! The binary works with `anyhow`; these typed errors are what the
//! converter, the record store and the pipeline hand back.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to stage original in {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("file name of {0} is not valid UTF-8")]
    FileName(PathBuf),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid table name: {0:?}")]
    InvalidTable(String),
    #[error("no movie with id {0}")]
    NotFound(i64),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("folder '{}' not found", .0.display())]
    MissingDirectory(PathBuf),
    #[error(transparent)]
    Store(#[from] StoreError),
}
