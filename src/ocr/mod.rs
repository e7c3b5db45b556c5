//! External OCR capability boundary.
//!
//! The pipeline treats OCR as a black box: hand it a pixel buffer and some
//! hints, get best-effort text back. Latency is unspecified, so every
//! invocation is an async suspension point and the retry loop keeps the call
//! count bounded.

pub mod tesseract;

pub use tesseract::TesseractEngine;

use image::{ImageBuffer, Rgba};

use crate::error::Result;

/// Character set and language hints passed to the engine.
#[derive(Clone, Debug)]
pub struct OcrHints {
    /// Language codes in engine priority order
    pub languages: Vec<String>,
    /// Characters the engine must never emit
    pub char_blacklist: String,
}

impl Default for OcrHints {
    fn default() -> Self {
        Self {
            languages: vec!["jpn".to_string(), "eng".to_string()],
            // Circled and full-width digits get confused with stat values.
            char_blacklist: "①②③④⑤⑥⑦⑧⑨⑩⑪⑫⑬⑭⑮⑯⑰⑱⑲⑳０１２３４５６７８９".to_string(),
        }
    }
}

/// Best-effort text recognition over a raster buffer.
pub trait OcrEngine: Send + Sync {
    fn recognize(
        &self,
        img: ImageBuffer<Rgba<u8>, Vec<u8>>,
        hints: OcrHints,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}
