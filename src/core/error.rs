//! Error types for the hexworld crate

use thiserror::Error;

use crate::streaming::StreamError;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl Error {
    /// True when the error is an out-of-world-bounds lookup rather than a failure
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Error::Stream(e) if e.is_out_of_bounds())
    }
}
