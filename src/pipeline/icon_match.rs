//! Item identity resolution by icon similarity.
//!
//! The icon crop is compared against every catalog reference icon of the
//! inferred cost tier (or all tiers when the tier is unknown). References
//! are loaded concurrently; the decision joins on all of them, and the
//! minimum pixel-difference score wins. Failed or timed-out loads just drop
//! out of the candidate set; zero survivors means the identity stays
//! unresolved, which is a degraded result, not an error.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba};
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::catalog::{Catalog, CatalogItem};
use crate::item::{CostTier, Item};

type RgbaBuffer = ImageBuffer<Rgba<u8>, Vec<u8>>;

/// One reference icon under consideration. Transient: built from the
/// catalog per resolution, never persisted.
#[derive(Clone, Debug)]
pub struct MatchCandidate {
    pub id: String,
    pub icon_path: PathBuf,
    pub cost: CostTier,
}

impl MatchCandidate {
    pub fn from_catalog_item(item: &CatalogItem) -> Self {
        Self {
            id: item.id.clone(),
            icon_path: item.icon_path.clone(),
            cost: item.cost,
        }
    }
}

/// The winning candidate and its difference score.
#[derive(Clone, Debug)]
pub struct IconMatch {
    pub id: String,
    pub score: u64,
}

/// Sum of absolute per-channel differences over all pixels (RGB only).
/// Lower is more similar; identical images score 0. Both buffers must share
/// dimensions.
pub fn diff_score(a: &RgbaBuffer, b: &RgbaBuffer) -> u64 {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    a.pixels()
        .zip(b.pixels())
        .map(|(pa, pb)| {
            (0..3)
                .map(|c| (pa[c] as i64 - pb[c] as i64).unsigned_abs())
                .sum::<u64>()
        })
        .sum()
}

/// Loads every candidate concurrently, scores it against the crop, and
/// returns the minimum-score candidate. `load_timeout` bounds each load so
/// one wedged file cannot stall the slot forever.
pub async fn best_match(
    crop: &RgbaBuffer,
    candidates: &[MatchCandidate],
    load_timeout: Duration,
) -> Option<IconMatch> {
    let (crop_w, crop_h) = crop.dimensions();
    if candidates.is_empty() || crop_w == 0 || crop_h == 0 {
        return None;
    }

    let mut tasks: JoinSet<Option<(usize, u64)>> = JoinSet::new();
    for (index, candidate) in candidates.iter().enumerate() {
        let path = candidate.icon_path.clone();
        let crop = crop.clone();
        tasks.spawn(async move {
            let load = tokio::task::spawn_blocking(move || -> Option<u64> {
                let reference = image::open(&path).ok()?.to_rgba8();
                let resized = imageops::resize(&reference, crop_w, crop_h, FilterType::Triangle);
                Some(diff_score(&crop, &resized))
            });
            match tokio::time::timeout(load_timeout, load).await {
                Ok(Ok(Some(score))) => Some((index, score)),
                Ok(Ok(None)) | Ok(Err(_)) => None,
                Err(_) => {
                    tracing::warn!("reference icon load timed out");
                    None
                }
            }
        });
    }

    // Join on all loads before deciding.
    let mut best: Option<(usize, u64)> = None;
    while let Some(joined) = tasks.join_next().await {
        if let Ok(Some((index, score))) = joined {
            match best {
                Some((_, best_score)) if score >= best_score => {}
                _ => best = Some((index, score)),
            }
        }
    }

    best.map(|(index, score)| IconMatch {
        id: candidates[index].id.clone(),
        score,
    })
}

/// Builds the candidate list for a tier and resolves the identity, then
/// back-fills the record from the matching catalog entry. Leaves the record
/// untouched when nothing matched.
pub async fn resolve_identity(
    item: &mut Item,
    icon_crop: &RgbaBuffer,
    catalog: &Catalog,
    load_timeout: Duration,
) -> Option<IconMatch> {
    let candidates: Vec<MatchCandidate> = catalog
        .items_by_cost(item.cost)
        .into_iter()
        .map(MatchCandidate::from_catalog_item)
        .collect();

    let matched = best_match(icon_crop, &candidates, load_timeout).await?;

    if let Some(entry) = catalog.item_by_id(&matched.id) {
        item.id = entry.id.clone();
        item.name = entry.name.clone();
        item.element_type = entry.element.clone();
        item.cost = entry.cost;
        item.apply_cost_defaults();
    }

    Some(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn solid(w: u32, h: u32, rgb: [u8; 3]) -> RgbaBuffer {
        ImageBuffer::from_pixel(w, h, Rgba([rgb[0], rgb[1], rgb[2], 255]))
    }

    #[test]
    fn test_diff_score_zero_for_identical() {
        let a = solid(16, 16, [120, 40, 200]);
        assert_eq!(diff_score(&a, &a.clone()), 0);
    }

    #[test]
    fn test_diff_score_counts_channel_deltas() {
        let a = solid(2, 2, [10, 10, 10]);
        let b = solid(2, 2, [11, 10, 12]);
        // (1 + 0 + 2) per pixel, 4 pixels
        assert_eq!(diff_score(&a, &b), 12);
    }

    #[tokio::test]
    async fn test_identical_reference_beats_distractors() {
        let dir = tempdir().unwrap();
        let target = solid(32, 32, [200, 30, 30]);
        let distractor = solid(32, 32, [30, 30, 200]);

        let target_path = dir.path().join("target.png");
        let distractor_path = dir.path().join("distractor.png");
        target.save(&target_path).unwrap();
        distractor.save(&distractor_path).unwrap();

        let candidates = vec![
            MatchCandidate {
                id: "distractor".to_string(),
                icon_path: distractor_path,
                cost: CostTier::Four,
            },
            MatchCandidate {
                id: "target".to_string(),
                icon_path: target_path,
                cost: CostTier::Four,
            },
        ];

        let matched = best_match(&target, &candidates, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(matched.id, "target");
        assert_eq!(matched.score, 0);
    }

    #[tokio::test]
    async fn test_unreadable_candidates_drop_out() {
        let dir = tempdir().unwrap();
        let target = solid(16, 16, [0, 255, 0]);
        let good_path = dir.path().join("good.png");
        target.save(&good_path).unwrap();

        let candidates = vec![
            MatchCandidate {
                id: "missing".to_string(),
                icon_path: dir.path().join("does_not_exist.png"),
                cost: CostTier::One,
            },
            MatchCandidate {
                id: "good".to_string(),
                icon_path: good_path,
                cost: CostTier::One,
            },
        ];

        let matched = best_match(&target, &candidates, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(matched.id, "good");
    }

    #[tokio::test]
    async fn test_no_loadable_candidates_is_degraded_not_error() {
        let dir = tempdir().unwrap();
        let crop = solid(16, 16, [1, 2, 3]);
        let candidates = vec![MatchCandidate {
            id: "missing".to_string(),
            icon_path: dir.path().join("nope.png"),
            cost: CostTier::Four,
        }];
        assert!(
            best_match(&crop, &candidates, Duration::from_secs(1))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_resolve_identity_backfills_record() {
        let dir = tempdir().unwrap();
        let icon = solid(24, 24, [250, 250, 10]);
        let icon_path = dir.path().join("390070051.png");
        icon.save(&icon_path).unwrap();

        let catalog: Catalog = serde_json::from_str(&format!(
            r#"{{
                "items": [{{
                    "id": "390070051",
                    "name": "鳴鐘の亀",
                    "element": "凝縮",
                    "cost": "4",
                    "icon_path": {:?}
                }}]
            }}"#,
            icon_path
        ))
        .unwrap();

        let mut item = Item::new();
        item.cost = CostTier::Four;
        let matched = resolve_identity(&mut item, &icon, &catalog, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(matched.score, 0);
        assert_eq!(item.id, "390070051");
        assert_eq!(item.name, "鳴鐘の亀");
        assert_eq!(item.element_type.as_deref(), Some("凝縮"));
        // Tier defaults re-applied after identity resolution
        assert_eq!(item.main_status_2.value, "150");
    }
}
