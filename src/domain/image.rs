// ============================================================
// Layer 3: Image Domain Types
// ============================================================
// The two image domains a CycleGAN translates between, the
// dataset splits they are read from, and the framework-free
// representation of one preprocessed image.
//
// A dataset on disk looks like:
//
//   datasets/apple2orange/
//     trainA/   ← domain A training images (apples)
//     trainB/   ← domain B training images (oranges)
//     testA/    ← held-out domain A images used for samples
//     testB/
//
// Reference: Zhu et al. (2017) Unpaired Image-to-Image Translation

use serde::{Deserialize, Serialize};
use std::fmt;

/// One side of the translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    A,
    B,
}

impl Domain {
    /// The domain a generator starting from `self` translates into
    pub fn opposite(self) -> Self {
        match self {
            Domain::A => Domain::B,
            Domain::B => Domain::A,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::A => write!(f, "A"),
            Domain::B => write!(f, "B"),
        }
    }
}

/// Which half of the dataset to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn from_testing(is_testing: bool) -> Self {
        if is_testing { Split::Test } else { Split::Train }
    }

    /// Folder name for a domain in this split, e.g. `trainA` or `testB`
    pub fn folder(self, domain: Domain) -> String {
        match self {
            Split::Train => format!("train{domain}"),
            Split::Test  => format!("test{domain}"),
        }
    }
}

/// A single image after resizing and normalisation.
///
/// Pixels are stored channel-first (CHW) as f32 in [-1, 1],
/// which is the range the generator's tanh output lives in.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    pub channels: usize,
    pub height:   usize,
    pub width:    usize,
    /// Flat CHW buffer of length channels * height * width
    pub pixels:   Vec<f32>,
}

impl NormalizedImage {
    pub fn new(channels: usize, height: usize, width: usize, pixels: Vec<f32>) -> Self {
        debug_assert_eq!(pixels.len(), channels * height * width);
        Self { channels, height, width, pixels }
    }

    /// Map a raw 8-bit intensity into [-1, 1]
    pub fn normalize(value: u8) -> f32 {
        value as f32 / 127.5 - 1.0
    }

    /// Map a [-1, 1] value back to [0, 1] for display.
    /// Values outside the range are clamped.
    pub fn denormalize(value: f32) -> f32 {
        (0.5 * value + 0.5).clamp(0.0, 1.0)
    }

    /// (channels, height, width)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.channels, self.height, self.width)
    }

    /// Read one value at channel `c`, row `y`, column `x`
    pub fn at(&self, c: usize, y: usize, x: usize) -> f32 {
        self.pixels[(c * self.height + y) * self.width + x]
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_names() {
        assert_eq!(Split::Train.folder(Domain::A), "trainA");
        assert_eq!(Split::Test.folder(Domain::B),  "testB");
        assert_eq!(Split::from_testing(true), Split::Test);
    }

    #[test]
    fn test_opposite_domain() {
        assert_eq!(Domain::A.opposite(), Domain::B);
        assert_eq!(Domain::B.opposite().opposite(), Domain::B);
    }

    #[test]
    fn test_normalize_range() {
        assert_eq!(NormalizedImage::normalize(0), -1.0);
        assert!((NormalizedImage::normalize(255) - 1.0).abs() < 1e-6);
        // 0.5 * x + 0.5 undoes the normalisation
        assert!((NormalizedImage::denormalize(-1.0)).abs() < 1e-6);
        assert_eq!(NormalizedImage::denormalize(3.0), 1.0);
    }

    #[test]
    fn test_chw_indexing() {
        // 2 channels, 1 row, 2 columns
        let img = NormalizedImage::new(2, 1, 2, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(img.at(0, 0, 1), 0.2);
        assert_eq!(img.at(1, 0, 0), 0.3);
        assert_eq!(img.shape(), (2, 1, 2));
    }
}
