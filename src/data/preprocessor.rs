// ============================================================
// Layer 4: Image Preprocessor
// ============================================================
// Turns decoded images into NormalizedImage and back.
//
// Forward direction (before training):
//   1. Resize to img_rows × img_cols (bilinear)
//   2. Optionally mirror left-right (data augmentation)
//   3. Convert to RGB or grayscale depending on `channels`
//   4. Scale every 8-bit value to [-1, 1]: v / 127.5 - 1
//   5. Lay the result out channel-first (CHW), the order
//      Burn's Conv2d expects
//
// Reverse direction (for sample grids and translations):
//   0.5 * v + 0.5, clamped to [0, 1], times 255.
//   Grayscale images are replicated into all three channels.
//
// Reference: image crate documentation (DynamicImage, imageops)

use anyhow::{Context, Result};
use image::{imageops::FilterType, DynamicImage, Rgb, RgbImage};
use std::path::Path;

use crate::domain::image::NormalizedImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePreprocessor {
    rows:     usize,
    cols:     usize,
    channels: usize,
}

impl ImagePreprocessor {
    pub fn new(rows: usize, cols: usize, channels: usize) -> Self {
        Self { rows, cols, channels }
    }

    /// Decode, resize and normalise one image file
    pub fn load(&self, path: &Path, flip: bool) -> Result<NormalizedImage> {
        let img = image::open(path)
            .with_context(|| format!("Cannot decode image '{}'", path.display()))?;
        Ok(self.preprocess(&img, flip))
    }

    pub fn preprocess(&self, img: &DynamicImage, flip: bool) -> NormalizedImage {
        let (w, h) = (self.cols, self.rows);
        let resized = img.resize_exact(w as u32, h as u32, FilterType::Triangle);
        let resized = if flip { resized.fliph() } else { resized };

        let mut pixels = vec![0.0f32; self.channels * h * w];
        if self.channels == 1 {
            for (x, y, p) in resized.to_luma8().enumerate_pixels() {
                pixels[y as usize * w + x as usize] = NormalizedImage::normalize(p[0]);
            }
        } else {
            for (x, y, p) in resized.to_rgb8().enumerate_pixels() {
                let (x, y) = (x as usize, y as usize);
                for c in 0..3 {
                    pixels[(c * h + y) * w + x] = NormalizedImage::normalize(p[c]);
                }
            }
        }

        NormalizedImage::new(self.channels, h, w, pixels)
    }

    /// Convert a [-1, 1] image back to displayable 8-bit RGB
    pub fn to_rgb(img: &NormalizedImage) -> RgbImage {
        let to_u8 = |v: f32| (NormalizedImage::denormalize(v) * 255.0).round() as u8;
        RgbImage::from_fn(img.width as u32, img.height as u32, |x, y| {
            let (x, y) = (x as usize, y as usize);
            if img.channels >= 3 {
                Rgb([to_u8(img.at(0, y, x)), to_u8(img.at(1, y, x)), to_u8(img.at(2, y, x))])
            } else {
                let v = to_u8(img.at(0, y, x));
                Rgb([v, v, v])
            }
        })
    }
}
