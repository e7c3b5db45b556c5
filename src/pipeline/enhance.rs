//! Legibility filters applied to a crop before OCR.
//!
//! The chain runs in a fixed order: integer upscale (with Gaussian blur in
//! the same step), optional corner mask, sharpen convolution, linear
//! contrast remap. Game UI text is thin and low-contrast against a busy
//! background; upscaling plus a mild sharpen is what makes Tesseract read it
//! at all.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba};

use crate::config::FilterParams;

/// Fraction of the buffer blanked in the top-left corner to hide the slot
/// badge overlay, which OCR otherwise reads as garbage.
const CORNER_MASK_WIDTH: f32 = 0.46;
const CORNER_MASK_HEIGHT: f32 = 0.36;

/// 3x3 sharpening kernel, scaled by the configured strength.
const SHARPEN_KERNEL: [i32; 9] = [0, -1, 0, -1, 5, -1, 0, -1, 0];

type RgbaBuffer = ImageBuffer<Rgba<u8>, Vec<u8>>;

/// Runs the full enhancement chain over a cropped region.
///
/// `scale` is the integer upscale factor (2 for name crops, 3 for the small
/// slot crops). `mask_corner` blanks the badge corner and is only set for
/// slot crops of multi-item screenshots.
pub fn enhance(crop: &RgbaBuffer, params: &FilterParams, scale: u32, mask_corner: bool) -> RgbaBuffer {
    let scale = scale.max(1);
    let (w, h) = crop.dimensions();
    let mut buffer = imageops::resize(crop, w * scale, h * scale, FilterType::Triangle);

    if params.blur > 0.0 {
        buffer = imageops::blur(&buffer, params.blur);
    }

    if mask_corner {
        fill_corner(&mut buffer);
    }

    if params.sharpen > 0.0 {
        buffer = sharpen(&buffer, params.sharpen);
    }

    if params.contrast != 0.0 {
        apply_contrast(&mut buffer, params.contrast);
    }

    buffer
}

/// Paints the top-left corner solid black.
fn fill_corner(img: &mut RgbaBuffer) {
    let (w, h) = img.dimensions();
    let mask_w = (w as f32 * CORNER_MASK_WIDTH) as u32;
    let mask_h = (h as f32 * CORNER_MASK_HEIGHT) as u32;
    for y in 0..mask_h.min(h) {
        for x in 0..mask_w.min(w) {
            img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
        }
    }
}

/// Convolves each color channel with the sharpening kernel scaled by
/// `strength`, clamping to [0, 255]. Border pixels are left untouched.
fn sharpen(img: &RgbaBuffer, strength: f32) -> RgbaBuffer {
    let (w, h) = img.dimensions();
    let mut output = img.clone();
    if w < 3 || h < 3 {
        return output;
    }

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut pixel = *img.get_pixel(x, y);
            for c in 0..3 {
                let mut sum = 0i32;
                let mut k = 0;
                for ky in 0..3u32 {
                    for kx in 0..3u32 {
                        let sample = img.get_pixel(x + kx - 1, y + ky - 1)[c];
                        sum += sample as i32 * SHARPEN_KERNEL[k];
                        k += 1;
                    }
                }
                pixel[c] = (sum as f32 * strength).clamp(0.0, 255.0) as u8;
            }
            output.put_pixel(x, y, pixel);
        }
    }

    output
}

/// Remaps each color channel with the standard linear contrast curve:
/// `factor = (259(c + 255)) / (255(259 - c))`, `out = factor*(in-128)+128`.
fn apply_contrast(img: &mut RgbaBuffer, contrast: f32) {
    let factor = (259.0 * (contrast + 255.0)) / (255.0 * (259.0 - contrast));
    for pixel in img.pixels_mut() {
        for c in 0..3 {
            let v = pixel[c] as f32;
            pixel[c] = (factor * (v - 128.0) + 128.0).clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, value: u8) -> RgbaBuffer {
        ImageBuffer::from_pixel(w, h, Rgba([value, value, value, 255]))
    }

    #[test]
    fn test_enhance_upscales_by_integer_factor() {
        let crop = solid(10, 20, 128);
        let out = enhance(&crop, &FilterParams::default(), 3, false);
        assert_eq!(out.dimensions(), (30, 60));
    }

    #[test]
    fn test_corner_mask_blanks_top_left() {
        let crop = solid(100, 100, 200);
        let params = FilterParams {
            blur: 0.0,
            sharpen: 0.0,
            contrast: 0.0,
        };
        let out = enhance(&crop, &params, 1, true);
        // Inside the 46% x 36% mask
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(45, 35)[0], 0);
        // Outside it
        assert_eq!(out.get_pixel(50, 50)[0], 200);
        assert_eq!(out.get_pixel(99, 0)[0], 200);
    }

    #[test]
    fn test_sharpen_is_identity_on_flat_regions() {
        // Kernel sums to 1, so a uniform image at strength 1.0 is unchanged.
        let img = solid(10, 10, 100);
        let out = sharpen(&img, 1.0);
        assert_eq!(out.get_pixel(5, 5)[0], 100);
    }

    #[test]
    fn test_sharpen_amplifies_edges() {
        let mut img = solid(9, 9, 50);
        img.put_pixel(4, 4, Rgba([200, 200, 200, 255]));
        let out = sharpen(&img, 1.0);
        // Center pops up, neighbours get pulled down
        assert!(out.get_pixel(4, 4)[0] > 200);
        assert!(out.get_pixel(3, 4)[0] < 50);
    }

    #[test]
    fn test_contrast_pushes_channels_apart() {
        let mut img = solid(4, 4, 0);
        img.put_pixel(0, 0, Rgba([100, 100, 100, 255]));
        img.put_pixel(1, 0, Rgba([160, 160, 160, 255]));
        apply_contrast(&mut img, 50.0);
        assert!(img.get_pixel(0, 0)[0] < 100);
        assert!(img.get_pixel(1, 0)[0] > 160);
    }

    #[test]
    fn test_contrast_midpoint_fixed() {
        let mut img = solid(2, 2, 128);
        apply_contrast(&mut img, 80.0);
        assert_eq!(img.get_pixel(0, 0)[0], 128);
    }

    #[test]
    fn test_zero_params_leave_pixels_unchanged() {
        let crop = solid(20, 20, 77);
        let params = FilterParams {
            blur: 0.0,
            sharpen: 0.0,
            contrast: 0.0,
        };
        let out = enhance(&crop, &params, 2, false);
        assert_eq!(out.get_pixel(10, 10)[0], 77);
    }
}
