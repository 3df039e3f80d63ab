use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the toolkit. Every error aborts the current
/// invocation; there is no retry or partial-result salvage.
#[derive(Debug, Error)]
pub enum Error {
    #[error("source image not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("no image results for query: {0:?}")]
    EmptySearch(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
