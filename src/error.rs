//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, image codec, JPEG encoder and detector errors, and provides
//! semantic variants for argument validation and cancelled searches.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JPEG encoder error: {0}")]
    Jpeg(#[from] jpeg_encoder::EncodingError),

    #[error("Detector error: {0}")]
    Detector(String),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Crop search cancelled after {evaluated} candidates")]
    Cancelled { evaluated: u64 },

    #[error("External error: {0}")]
    External(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::External(e.to_string())
    }

    pub fn invalid(arg: &'static str, value: impl ToString) -> Self {
        Error::InvalidArgument {
            arg,
            value: value.to_string(),
        }
    }
}
