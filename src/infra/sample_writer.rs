// ============================================================
// Layer 6: Sample Grid Writer
// ============================================================
// Saves the periodic translation samples as one PNG:
//
//             Original   Translated   Reconstructed
//   row A     A          g_AB(A)      g_BA(g_AB(A))
//   row B     B          g_BA(B)      g_AB(g_BA(B))
//
// Cells are laid out on a white canvas with a small margin.
// File: <images_dir>/<dataset_name>/<epoch>_<batch>.png
//
// Reference: image crate documentation (imageops::replace)

use anyhow::{bail, Context, Result};
use image::{imageops, Rgb, RgbImage};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const COLUMN_TITLES: [&str; 3] = ["Original", "Translated", "Reconstructed"];

const MARGIN: u32 = 4;

pub struct SampleWriter {
    dir: PathBuf,
}

impl SampleWriter {
    pub fn new(images_dir: impl AsRef<Path>, dataset_name: &str) -> Self {
        Self { dir: images_dir.as_ref().join(dataset_name) }
    }

    pub fn path_for(&self, epoch: usize, batch: usize) -> PathBuf {
        self.dir.join(format!("{epoch}_{batch}.png"))
    }

    /// Write one grid; every row must have the same number of equally sized cells.
    pub fn save(&self, epoch: usize, batch: usize, rows: &[Vec<RgbImage>]) -> Result<PathBuf> {
        let grid = compose_grid(rows)?;

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create sample directory '{}'", self.dir.display()))?;
        let path = self.path_for(epoch, batch);
        grid.save(&path)
            .with_context(|| format!("Cannot write sample grid '{}'", path.display()))?;

        tracing::debug!("Sample grid ({}) saved to '{}'", COLUMN_TITLES.join(" | "), path.display());
        Ok(path)
    }
}

/// Tile equally sized images into a rows × cols grid
pub fn compose_grid(rows: &[Vec<RgbImage>]) -> Result<RgbImage> {
    let Some(first) = rows.first().and_then(|r| r.first()) else {
        bail!("Cannot compose an empty sample grid");
    };
    let (w, h) = first.dimensions();
    let cols = rows[0].len();

    for row in rows {
        if row.len() != cols {
            bail!("Sample grid rows have different lengths");
        }
        if row.iter().any(|img| img.dimensions() != (w, h)) {
            bail!("Sample grid cells must all be {w}x{h}");
        }
    }

    let n_rows = rows.len() as u32;
    let n_cols = cols as u32;
    let mut canvas = RgbImage::from_pixel(
        n_cols * w + (n_cols + 1) * MARGIN,
        n_rows * h + (n_rows + 1) * MARGIN,
        Rgb([255, 255, 255]),
    );

    for (r, row) in rows.iter().enumerate() {
        for (c, img) in row.iter().enumerate() {
            let x = MARGIN + c as u32 * (w + MARGIN);
            let y = MARGIN + r as u32 * (h + MARGIN);
            imageops::replace(&mut canvas, img, x as i64, y as i64);
        }
    }
    Ok(canvas)
}
