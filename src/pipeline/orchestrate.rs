//! Drives the full extraction across a screenshot.
//!
//! Narrow screenshots hold a single item card and go through one retry-loop
//! run. Wide ones hold the character header plus five item slots: the
//! character and weapon names are resolved against the catalog while the
//! five slots each run their own retry loop and icon match. Every resolved
//! piece is dispatched as an event on a channel; slot completions arrive in
//! no particular order and consumers must key on the slot index.

use image::{ImageBuffer, Rgba};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::catalog::Catalog;
use crate::config::ScanConfig;
use crate::item::Item;
use crate::ocr::{OcrEngine, OcrHints};
use crate::pipeline::clean::clean_text;
use crate::pipeline::crop::crop_region;
use crate::pipeline::enhance::enhance;
use crate::pipeline::icon_match;
use crate::pipeline::retry::{self, AttemptParams, RetrySettings};
use crate::vocab::LabelVocabulary;

type RgbaBuffer = ImageBuffer<Rgba<u8>, Vec<u8>>;

/// Completion events dispatched by a scan.
#[derive(Clone, Debug)]
pub enum ScanEvent {
    /// One item slot finished (best effort, possibly with empty fields)
    Slot(SlotResult),
    /// The character shown on the screenshot was recognized
    Character { name: String },
    /// The equipped weapon was recognized
    Weapon { name: String },
}

#[derive(Clone, Debug)]
pub struct SlotResult {
    pub slot_index: usize,
    pub item: Item,
}

/// Handle over the in-flight tasks of one scan. Aborting prevents stale
/// completions from a superseded screenshot overwriting newer state.
pub struct ScanHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl ScanHandle {
    /// Cancels every task still running for this scan.
    pub fn abort(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }

    /// Waits for all tasks to finish (aborted tasks count as finished).
    pub async fn join(self) {
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

/// The extraction orchestrator. Holds the read-only collaborators shared by
/// every slot task.
pub struct Orchestrator<E> {
    engine: Arc<E>,
    catalog: Arc<Catalog>,
    vocab: Arc<LabelVocabulary>,
    config: Arc<ScanConfig>,
    hints: OcrHints,
}

impl<E: OcrEngine + 'static> Orchestrator<E> {
    pub fn new(engine: Arc<E>, catalog: Arc<Catalog>, config: ScanConfig) -> Self {
        Self {
            engine,
            catalog,
            vocab: Arc::new(LabelVocabulary::default()),
            config: Arc::new(config),
            hints: OcrHints::default(),
        }
    }

    pub fn with_vocabulary(mut self, vocab: LabelVocabulary) -> Self {
        self.vocab = Arc::new(vocab);
        self
    }

    fn retry_settings(&self) -> RetrySettings {
        RetrySettings {
            start_contrast: self.config.filters.contrast,
            floor: self.config.contrast_floor,
            step: self.config.contrast_step,
        }
    }

    /// Starts a scan over one screenshot. Returns the event receiver and a
    /// handle for cancellation; the channel closes once every task is done.
    pub fn scan(&self, img: RgbaBuffer) -> (mpsc::Receiver<ScanEvent>, ScanHandle) {
        let (tx, rx) = mpsc::channel(16);
        let tasks = if img.width() > self.config.multi_width_threshold {
            self.spawn_multi_item(Arc::new(img), tx)
        } else {
            vec![self.spawn_single_item(img, tx)]
        };
        (rx, ScanHandle { tasks })
    }

    /// Single-item screenshot: the whole image is the item card. No icon
    /// matching, no name/weapon regions.
    fn spawn_single_item(&self, img: RgbaBuffer, tx: mpsc::Sender<ScanEvent>) -> JoinHandle<()> {
        let engine = self.engine.clone();
        let vocab = self.vocab.clone();
        let config = self.config.clone();
        let hints = self.hints.clone();
        let settings = self.retry_settings();

        tokio::spawn(async move {
            let params = AttemptParams {
                filters: config.filters,
                scale: config.name_scale,
                mask_corner: false,
                prepend_sentinel: false,
            };
            let item = match retry::run(&*engine, &img, params, settings, &vocab, &hints).await {
                Ok(outcome) => outcome.item,
                Err(e) => {
                    tracing::warn!("single-item OCR failed: {e}");
                    Item::new()
                }
            };
            let _ = tx
                .send(ScanEvent::Slot(SlotResult {
                    slot_index: 0,
                    item,
                }))
                .await;
        })
    }

    /// Multi-item screenshot: name/weapon resolution plus five slot tasks,
    /// all independent.
    fn spawn_multi_item(
        &self,
        img: Arc<RgbaBuffer>,
        tx: mpsc::Sender<ScanEvent>,
    ) -> Vec<JoinHandle<()>> {
        let mut tasks = Vec::with_capacity(7);

        tasks.push(self.spawn_header_task(
            img.clone(),
            tx.clone(),
            self.config.name_region,
            self.catalog.character_names(),
            |name| ScanEvent::Character { name },
        ));
        tasks.push(self.spawn_header_task(
            img.clone(),
            tx.clone(),
            self.config.weapon_region,
            self.catalog.weapon_names(),
            |name| ScanEvent::Weapon { name },
        ));

        for slot in 0..5 {
            tasks.push(self.spawn_slot_task(img.clone(), tx.clone(), slot));
        }

        tasks
    }

    /// OCRs a header region (character or weapon name) and resolves it
    /// against the catalog name list.
    fn spawn_header_task(
        &self,
        img: Arc<RgbaBuffer>,
        tx: mpsc::Sender<ScanEvent>,
        region: crate::pipeline::crop::CropSpec,
        names: Vec<String>,
        to_event: fn(String) -> ScanEvent,
    ) -> JoinHandle<()> {
        let engine = self.engine.clone();
        let config = self.config.clone();
        let hints = self.hints.clone();

        tokio::spawn(async move {
            let rect = region.to_rect(img.width(), img.height());
            let crop = crop_region(&img, &rect);
            let filters = crate::config::FilterParams {
                sharpen: 0.0,
                ..config.filters
            };
            let enhanced = enhance(&crop, &filters, config.name_scale, false);
            let raw = match engine.recognize(enhanced, hints).await {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!("header OCR failed: {e}");
                    return;
                }
            };
            let cleaned = clean_text(&raw);
            let first_line = cleaned.lines().next().unwrap_or("");
            if let Some(name) = resolve_catalog_name(first_line, &names) {
                let _ = tx.send(to_event(name)).await;
            } else {
                tracing::debug!("no catalog name matched {first_line:?}");
            }
        })
    }

    /// Full per-slot pipeline: retry loop, then icon identity resolution.
    fn spawn_slot_task(
        &self,
        img: Arc<RgbaBuffer>,
        tx: mpsc::Sender<ScanEvent>,
        slot: usize,
    ) -> JoinHandle<()> {
        let engine = self.engine.clone();
        let catalog = self.catalog.clone();
        let vocab = self.vocab.clone();
        let config = self.config.clone();
        let hints = self.hints.clone();
        let settings = self.retry_settings();

        tokio::spawn(async move {
            let (w, h) = img.dimensions();
            let rect = config.slot_regions.to_rect(slot, w, h);
            let crop = crop_region(&img, &rect);
            let params = AttemptParams {
                filters: config.filters,
                scale: config.slot_scale,
                mask_corner: true,
                prepend_sentinel: true,
            };

            let mut item = match retry::run(&*engine, &crop, params, settings, &vocab, &hints).await
            {
                Ok(outcome) => {
                    if !outcome.self_check.valid {
                        tracing::info!(
                            slot,
                            errors = ?outcome.self_check.errors,
                            "slot accepted with self-check errors"
                        );
                    }
                    outcome.item
                }
                Err(e) => {
                    tracing::warn!(slot, "slot OCR failed: {e}");
                    Item::new()
                }
            };

            let icon_rect = config.icon_regions.to_rect(slot, w, h);
            let icon_crop = crop_region(&img, &icon_rect);
            let timeout = Duration::from_millis(config.icon_load_timeout_ms);
            match icon_match::resolve_identity(&mut item, &icon_crop, &catalog, timeout).await {
                Some(matched) => {
                    tracing::debug!(slot, id = %matched.id, score = matched.score, "icon resolved")
                }
                None => tracing::debug!(slot, "icon unresolved, identity left empty"),
            }

            let _ = tx
                .send(ScanEvent::Slot(SlotResult {
                    slot_index: slot,
                    item,
                }))
                .await;
        })
    }
}

/// Finds a catalog name containing the recognized fragment, progressively
/// shortening the fragment from the end and then from the start; OCR often
/// prepends or appends noise around the actual name.
pub fn resolve_catalog_name(raw: &str, names: &[String]) -> Option<String> {
    let chars: Vec<char> = raw.trim().chars().collect();
    if chars.is_empty() {
        return None;
    }
    // Single-character fragments match far too much; require two unless the
    // input itself is a single character.
    let min_len = 2.min(chars.len());

    for end in (min_len..=chars.len()).rev() {
        let fragment: String = chars[..end].iter().collect();
        if let Some(name) = names.iter().find(|name| name.contains(&fragment)) {
            return Some(name.clone());
        }
    }
    for start in 1..=chars.len() - min_len {
        let fragment: String = chars[start..].iter().collect();
        if let Some(name) = names.iter().find(|name| name.contains(&fragment)) {
            return Some(name.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_exact_name() {
        let catalog = names(&["漂泊者", "散華", "忌炎"]);
        assert_eq!(
            resolve_catalog_name("散華", &catalog),
            Some("散華".to_string())
        );
    }

    #[test]
    fn test_resolve_strips_trailing_noise() {
        let catalog = names(&["漂泊者", "散華"]);
        assert_eq!(
            resolve_catalog_name("漂泊者ノイズ", &catalog),
            Some("漂泊者".to_string())
        );
    }

    #[test]
    fn test_resolve_strips_leading_noise() {
        let catalog = names(&["漂泊者", "散華"]);
        assert_eq!(
            resolve_catalog_name("ゴミ漂泊者", &catalog),
            Some("漂泊者".to_string())
        );
    }

    #[test]
    fn test_resolve_fragment_inside_longer_name() {
        let catalog = names(&["浩境の粛清"]);
        assert_eq!(
            resolve_catalog_name("境の粛", &catalog),
            Some("浩境の粛清".to_string())
        );
    }

    #[test]
    fn test_resolve_no_match() {
        let catalog = names(&["漂泊者"]);
        assert_eq!(resolve_catalog_name("全然違う", &catalog), None);
        assert_eq!(resolve_catalog_name("", &catalog), None);
    }
}
