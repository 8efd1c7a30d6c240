//! Error types for page fetches and item downloads.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure to obtain a listing page. Always fatal to the walk.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("listing request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("listing request returned {0}")]
    Status(StatusCode),

    #[error("listing response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("listing response contained no listing")]
    Empty,
}

/// Failure to persist a single item.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The media host answered with a non-success status.
    #[error("{status}")]
    Remote { status: StatusCode },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that end a walk early.
#[derive(Error, Debug)]
pub enum WalkError {
    #[error(transparent)]
    Page(#[from] PageError),

    #[error("cannot store download: {0}")]
    Io(#[from] std::io::Error),
}
