//! Asset pipeline errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or materializing assets.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset source `{0}` not found")]
    SourceNotFound(PathBuf),

    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("there is no `{0}` filter")]
    UnknownFilter(String),

    #[error("there is no `{0}` asset to reference")]
    UnknownAsset(String),

    #[error("invalid input pattern `{0}`")]
    InvalidInput(String),

    #[error("target path `{0}` escapes the output directory")]
    InvalidTargetPath(String),

    #[error("filter `{filter}` failed on `{target}`")]
    Filter {
        filter: String,
        target: String,
        #[source]
        source: FilterError,
    },

    #[error("`assetic.formulae_cache_dir` is not configured")]
    CacheNotConfigured,

    #[error("cache directory `{0}` is not a directory")]
    CacheDir(PathBuf),
}

/// Failure reported by a single filter.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FilterError {
    message: String,
}

impl FilterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
