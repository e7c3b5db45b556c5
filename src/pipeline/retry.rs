//! Bounded validate-and-retry loop over one slot.
//!
//! Each attempt runs Enhance → OCR → Clean → Parse → Validate with the
//! current contrast. On a failed self-check the contrast steps down by a
//! fixed amount and the same crop is re-enhanced; once the floor is reached
//! the current record is accepted as best effort. This bounds the OCR call
//! count per slot to a small constant.

use image::{ImageBuffer, Rgba};

use crate::config::FilterParams;
use crate::error::Result;
use crate::item::{Item, UNIDENTIFIED_SENTINEL};
use crate::ocr::{OcrEngine, OcrHints};
use crate::pipeline::clean::clean_text;
use crate::pipeline::enhance::enhance;
use crate::pipeline::parse::OcrParser;
use crate::pipeline::validate::{self, SelfCheck};
use crate::vocab::LabelVocabulary;

/// Retry bounds, taken from configuration.
#[derive(Clone, Copy, Debug)]
pub struct RetrySettings {
    /// Contrast of the first attempt
    pub start_contrast: f32,
    /// Lowest contrast tried before accepting best effort
    pub floor: f32,
    /// Contrast decrement per failed attempt
    pub step: f32,
}

/// Per-slot pipeline inputs that stay fixed across attempts.
#[derive(Clone, Copy, Debug)]
pub struct AttemptParams {
    pub filters: FilterParams,
    pub scale: u32,
    /// Blank the badge corner before OCR (multi-item slot crops)
    pub mask_corner: bool,
    /// Prefix the sentinel lines: slot crops carry no name/cost lines
    pub prepend_sentinel: bool,
}

/// Outcome of the retry loop: the accepted record plus how it was reached.
#[derive(Clone, Debug)]
pub struct RetryOutcome {
    pub item: Item,
    pub self_check: SelfCheck,
    pub attempts: u32,
    pub final_contrast: f32,
}

/// Runs the retry loop over one cropped region.
///
/// OCR engine failures propagate; recognition garbage does not (it parses
/// to empty fields and drives another attempt).
pub async fn run<E: OcrEngine>(
    engine: &E,
    crop: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    params: AttemptParams,
    settings: RetrySettings,
    vocab: &LabelVocabulary,
    hints: &OcrHints,
) -> Result<RetryOutcome> {
    let parser = OcrParser::new(vocab);
    let mut contrast = settings.start_contrast;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let filters = FilterParams {
            contrast,
            ..params.filters
        };
        let enhanced = enhance(crop, &filters, params.scale, params.mask_corner);
        let raw = engine.recognize(enhanced, hints.clone()).await?;
        let mut text = clean_text(&raw);
        if params.prepend_sentinel {
            text = format!("{UNIDENTIFIED_SENTINEL}\nNone\n{text}");
        }

        let item = parser.parse(&text);
        let self_check = validate::check(&item, vocab);

        if self_check.valid || contrast <= settings.floor {
            if !self_check.valid {
                tracing::debug!(
                    attempts,
                    errors = self_check.errors.len(),
                    "contrast floor reached, accepting best effort"
                );
            }
            return Ok(RetryOutcome {
                item,
                self_check,
                attempts,
                final_contrast: contrast,
            });
        }

        tracing::debug!(
            attempts,
            contrast,
            errors = self_check.errors.len(),
            "self-check failed, stepping contrast down"
        );
        contrast -= settings.step;
    }
}
