//! Gear Screenshot Scanner
//!
//! Extracts structured equipment stat records from game screenshots: crops
//! the item regions, enhances them for OCR, recognizes the text with an
//! external OCR engine, and parses the noisy output into typed records.
//! Item identity is recovered by matching the icon crop against catalog
//! reference icons.

pub mod catalog;
pub mod config;
pub mod error;
pub mod item;
pub mod ocr;
pub mod pipeline;
pub mod vocab;

pub use catalog::Catalog;
pub use config::ScanConfig;
pub use error::{Result, ScanError};
pub use item::{CostTier, Item, StatEntry};
pub use pipeline::{Orchestrator, ScanEvent, SlotResult};
pub use vocab::LabelVocabulary;
