//! Pipeline configuration.
//!
//! Loaded from a JSON file with per-field defaults, so a partial config file
//! only overrides what it names. The config is passed by value into the
//! orchestrator at construction; there is no process-wide instance.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::pipeline::crop::{CropSpec, IconRegions, SlotRegions};

/// Parameters of the enhancement filter chain.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FilterParams {
    /// Gaussian blur radius in pixels; 0 disables
    pub blur: f32,
    /// Sharpen kernel strength; 0 disables
    pub sharpen: f32,
    /// Linear contrast, signed, 0 = no-op
    pub contrast: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            blur: 0.0,
            sharpen: 1.5,
            contrast: 0.0,
        }
    }
}

/// Complete extraction configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Character-name region of a multi-item screenshot
    #[serde(default = "default_name_region")]
    pub name_region: CropSpec,
    /// Weapon-name region of a multi-item screenshot
    #[serde(default = "default_weapon_region")]
    pub weapon_region: CropSpec,
    /// The five item-slot stat regions
    #[serde(default = "default_slot_regions")]
    pub slot_regions: SlotRegions,
    /// The five item-icon regions
    #[serde(default = "default_icon_regions")]
    pub icon_regions: IconRegions,
    /// Enhancement defaults; `contrast` is the retry starting point
    #[serde(default)]
    pub filters: FilterParams,
    /// Contrast value at which the retry loop gives up and accepts best effort
    #[serde(default = "default_contrast_floor")]
    pub contrast_floor: f32,
    /// Contrast decrement applied per failed attempt
    #[serde(default = "default_contrast_step")]
    pub contrast_step: f32,
    /// Upscale factor for name/weapon crops (and single-item screenshots)
    #[serde(default = "default_name_scale")]
    pub name_scale: u32,
    /// Upscale factor for the smaller slot crops
    #[serde(default = "default_slot_scale")]
    pub slot_scale: u32,
    /// Screenshots wider than this hold five slots; narrower ones hold one item
    #[serde(default = "default_multi_width_threshold")]
    pub multi_width_threshold: u32,
    /// Bound on each reference-icon load during identity resolution
    #[serde(default = "default_icon_load_timeout_ms")]
    pub icon_load_timeout_ms: u64,
    /// Enables extra per-attempt logging
    #[serde(default)]
    pub debug: bool,
}

fn default_name_region() -> CropSpec {
    CropSpec {
        x: 0.02,
        y: 0.015,
        width: 0.22,
        height: 0.05,
    }
}

fn default_weapon_region() -> CropSpec {
    CropSpec {
        x: 0.66,
        y: 0.015,
        width: 0.22,
        height: 0.05,
    }
}

fn default_slot_regions() -> SlotRegions {
    SlotRegions {
        x: [0.033, 0.227, 0.420, 0.614, 0.807],
        bottom_margin: 0.03,
        width: 0.163,
        height: 0.3,
    }
}

fn default_icon_regions() -> IconRegions {
    IconRegions {
        x: [0.015, 0.209, 0.402, 0.596, 0.789],
        y: 0.603,
        width: 0.094,
        height: 0.167,
    }
}

fn default_contrast_floor() -> f32 {
    -50.0
}

fn default_contrast_step() -> f32 {
    25.0
}

fn default_name_scale() -> u32 {
    2
}

fn default_slot_scale() -> u32 {
    3
}

fn default_multi_width_threshold() -> u32 {
    1000
}

fn default_icon_load_timeout_ms() -> u64 {
    5000
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            name_region: default_name_region(),
            weapon_region: default_weapon_region(),
            slot_regions: default_slot_regions(),
            icon_regions: default_icon_regions(),
            filters: FilterParams::default(),
            contrast_floor: default_contrast_floor(),
            contrast_step: default_contrast_step(),
            name_scale: default_name_scale(),
            slot_scale: default_slot_scale(),
            multi_width_threshold: default_multi_width_threshold(),
            icon_load_timeout_ms: default_icon_load_timeout_ms(),
            debug: false,
        }
    }
}

impl ScanConfig {
    /// Loads configuration from a JSON file, falling back to defaults when
    /// the file is missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(config) => {
                        tracing::info!("config loaded from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("failed to parse {}: {e}. Using defaults.", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("failed to read {}: {e}. Using defaults.", path.display());
                }
            }
        } else {
            tracing::info!("{} not found. Using default config.", path.display());
        }
        ScanConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_sane() {
        let config = ScanConfig::default();
        assert_eq!(config.contrast_floor, -50.0);
        assert_eq!(config.contrast_step, 25.0);
        assert_eq!(config.multi_width_threshold, 1000);
        assert!(config.slot_scale > config.name_scale);
        // Slots are laid out left to right
        let xs = config.slot_regions.x;
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_partial_config_uses_defaults_for_rest() {
        let config: ScanConfig = serde_json::from_str(r#"{"contrast_floor": -75.0}"#).unwrap();
        assert_eq!(config.contrast_floor, -75.0);
        assert_eq!(config.contrast_step, 25.0);
        assert_eq!(config.name_scale, 2);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ScanConfig::load_or_default(Path::new("does/not/exist.json"));
        assert_eq!(config.multi_width_threshold, 1000);
    }
}
