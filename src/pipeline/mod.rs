//! The extraction pipeline, stage by stage: crop, enhance, clean, parse,
//! validate, retry, icon match, and the orchestrator that wires them up.

pub mod clean;
pub mod crop;
pub mod enhance;
pub mod icon_match;
pub mod orchestrate;
pub mod parse;
pub mod retry;
pub mod validate;

pub use clean::clean_text;
pub use crop::{crop_region, CropSpec, IconRegions, PixelRect, SlotRegions};
pub use enhance::enhance;
pub use icon_match::{best_match, diff_score, IconMatch, MatchCandidate};
pub use orchestrate::{Orchestrator, ScanEvent, ScanHandle, SlotResult};
pub use parse::OcrParser;
pub use retry::{AttemptParams, RetryOutcome, RetrySettings};
pub use validate::{check, FieldError, SelfCheck};
