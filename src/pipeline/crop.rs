//! Ratio-based region cropping.
//!
//! All regions are described as fractions of the source image dimensions so
//! they survive resolution changes. Slot regions are anchored to the bottom
//! edge of the screenshot; name/weapon regions to the top-left. Width and
//! height are floored before the origin is computed, so the resulting
//! rectangle never exceeds the source bounds.

use image::{ImageBuffer, Rgba};
use serde::{Deserialize, Serialize};

/// A rectangle in relative coordinates (0.0 to 1.0), anchored to the
/// top-left corner.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CropSpec {
    /// X position of top-left corner (fraction of width)
    pub x: f32,
    /// Y position of top-left corner (fraction of height)
    pub y: f32,
    /// Width as fraction of image width
    pub width: f32,
    /// Height as fraction of image height
    pub height: f32,
}

impl CropSpec {
    /// Converts to pixel coordinates, clamped to the image bounds.
    pub fn to_rect(&self, img_width: u32, img_height: u32) -> PixelRect {
        let crop_w = (self.width * img_width as f32) as u32;
        let crop_h = (self.height * img_height as f32) as u32;
        let x = ((self.x * img_width as f32) as u32).min(img_width);
        let y = ((self.y * img_height as f32) as u32).min(img_height);
        PixelRect {
            x,
            y,
            width: crop_w.min(img_width - x),
            height: crop_h.min(img_height - y),
        }
    }
}

/// The five item-slot regions of a multi-item screenshot. The slots share
/// width, height and bottom margin; only the x origin differs per slot.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SlotRegions {
    /// Per-slot x origin (fraction of width), left to right
    pub x: [f32; 5],
    /// Gap between the region and the bottom edge (fraction of height)
    pub bottom_margin: f32,
    pub width: f32,
    pub height: f32,
}

impl SlotRegions {
    /// Pixel rectangle for one slot, anchored to the bottom edge:
    /// `y = height - crop_height - margin_height`.
    pub fn to_rect(&self, slot: usize, img_width: u32, img_height: u32) -> PixelRect {
        let crop_w = (self.width * img_width as f32) as u32;
        let crop_h = (self.height * img_height as f32) as u32;
        let margin_h = (self.bottom_margin * img_height as f32) as u32;
        let x = ((self.x[slot] * img_width as f32) as u32).min(img_width);
        let y = img_height.saturating_sub(crop_h).saturating_sub(margin_h);
        PixelRect {
            x,
            y,
            width: crop_w.min(img_width - x),
            height: crop_h.min(img_height - y),
        }
    }
}

/// The five icon regions, one inside each item slot. Top-anchored.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct IconRegions {
    /// Per-slot x origin (fraction of width), left to right
    pub x: [f32; 5],
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl IconRegions {
    pub fn to_rect(&self, slot: usize, img_width: u32, img_height: u32) -> PixelRect {
        CropSpec {
            x: self.x[slot],
            y: self.y,
            width: self.width,
            height: self.height,
        }
        .to_rect(img_width, img_height)
    }
}

/// A rectangle in absolute pixel coordinates, guaranteed within the image
/// it was computed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Crops a sub-region from an image.
pub fn crop_region(
    img: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    rect: &PixelRect,
) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
    image::imageops::crop_imm(img, rect.x, rect.y, rect.width, rect.height).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_spec_to_rect() {
        let spec = CropSpec {
            x: 0.1,
            y: 0.25,
            width: 0.5,
            height: 0.1,
        };
        let rect = spec.to_rect(100, 200);
        assert_eq!(
            rect,
            PixelRect {
                x: 10,
                y: 50,
                width: 50,
                height: 20
            }
        );
    }

    #[test]
    fn test_crop_spec_clamps_to_bounds() {
        let spec = CropSpec {
            x: 0.9,
            y: 0.9,
            width: 0.5,
            height: 0.5,
        };
        let rect = spec.to_rect(100, 100);
        assert_eq!(rect.x + rect.width, 100);
        assert_eq!(rect.y + rect.height, 100);
    }

    #[test]
    fn test_slot_rect_bottom_anchored() {
        let slots = SlotRegions {
            x: [0.0, 0.2, 0.4, 0.6, 0.8],
            bottom_margin: 0.03,
            width: 0.163,
            height: 0.3,
        };
        let rect = slots.to_rect(0, 2000, 1000);
        // y = 1000 - 300 - 30
        assert_eq!(rect.y, 670);
        assert_eq!(rect.height, 300);
        assert_eq!(rect.width, 326);
    }

    #[test]
    fn test_slot_rects_stay_within_bounds() {
        let slots = SlotRegions {
            x: [0.033, 0.227, 0.420, 0.614, 0.807],
            bottom_margin: 0.03,
            width: 0.163,
            height: 0.3,
        };
        // Exercise awkward dimensions where flooring matters
        for &(w, h) in &[(1u32, 1u32), (7, 13), (1280, 720), (1999, 1081), (3840, 2160)] {
            for slot in 0..5 {
                let rect = slots.to_rect(slot, w, h);
                assert!(rect.x + rect.width <= w, "{}x{} slot {}", w, h, slot);
                assert!(rect.y + rect.height <= h, "{}x{} slot {}", w, h, slot);
            }
        }
    }

    #[test]
    fn test_oversized_ratios_stay_within_bounds() {
        let spec = CropSpec {
            x: 0.5,
            y: 0.5,
            width: 2.0,
            height: 2.0,
        };
        let rect = spec.to_rect(640, 480);
        assert!(rect.x + rect.width <= 640);
        assert!(rect.y + rect.height <= 480);
    }

    #[test]
    fn test_crop_region_content() {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_fn(100, 200, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let rect = PixelRect {
            x: 10,
            y: 50,
            width: 50,
            height: 20,
        };
        let cropped = crop_region(&img, &rect);
        assert_eq!(cropped.dimensions(), (50, 20));
        assert_eq!(cropped.get_pixel(0, 0)[0], 10);
        assert_eq!(cropped.get_pixel(0, 0)[1], 50);
    }
}
