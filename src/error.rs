//! Error taxonomy for the extraction pipeline.
//!
//! Only input errors (bad image data, unreachable OCR engine, broken catalog)
//! surface as `Err`. Recognition degradation and validation failures are
//! absorbed by the pipeline and show up as empty fields on the parsed record.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("input is not an image: {0}")]
    NotAnImage(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OCR engine failure: {0}")]
    Ocr(String),

    #[error("catalog error: {0}")]
    Catalog(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
