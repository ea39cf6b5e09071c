// ============================================================
// Layer 4: Image Folder Loader
// ============================================================
// Reads an unpaired two-domain dataset from disk:
//
//   <data_dir>/<dataset_name>/trainA/*.png|jpg
//   <data_dir>/<dataset_name>/trainB/*
//   <data_dir>/<dataset_name>/testA/*
//   <data_dir>/<dataset_name>/testB/*
//
// load_batch (one epoch):
//   n_batches = min(|trainA|, |trainB|) / batch_size
//   Draw n_batches * batch_size files from each domain WITHOUT
//   replacement, then decode them lazily, batch by batch, so
//   only one batch of images lives in memory at a time.
//   The epoch gets its own RNG, seeded from the loader's, so
//   samples can be drawn while the epoch is still running.
//   Each (A, B) pair is mirrored together with probability 0.5.
//
// load_data (samples):
//   Draw batch_size files WITH replacement from one domain.
//   Training images may be mirrored, test images never are.
//
// Reference: rand crate documentation (SliceRandom)
//            Rust Book §13 (Iterators)

use anyhow::{bail, Result};
use burn::data::dataset::Dataset;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::path::{Path, PathBuf};

use crate::data::{dataset::ImageFolder, preprocessor::ImagePreprocessor};
use crate::domain::image::{Domain, NormalizedImage, Split};
use crate::domain::traits::{BatchIter, ImageSource, PairedBatch};

/// Loads one named dataset from a directory of image folders.
/// Implements the ImageSource trait from Layer 3.
pub struct ImageFolderLoader {
    /// <data_dir>/<dataset_name>
    root:         PathBuf,
    preprocessor: ImagePreprocessor,
    rng:          StdRng,
}

impl ImageFolderLoader {
    pub fn new(
        data_dir:     impl AsRef<Path>,
        dataset_name: &str,
        preprocessor: ImagePreprocessor,
        seed:         u64,
    ) -> Self {
        Self {
            root: data_dir.as_ref().join(dataset_name),
            preprocessor,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn folder(&self, split: Split, domain: Domain) -> Result<ImageFolder> {
        ImageFolder::open(self.root.join(split.folder(domain)))
    }

    /// Number of full batches an epoch of `load_batch(batch_size)` yields
    pub fn n_batches(&self, batch_size: usize) -> Result<usize> {
        if batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        let a = self.folder(Split::Train, Domain::A)?;
        let b = self.folder(Split::Train, Domain::B)?;
        Ok(a.len().min(b.len()) / batch_size)
    }
}

impl ImageSource for ImageFolderLoader {
    fn load_batch(&mut self, batch_size: usize) -> Result<BatchIter> {
        let n_batches = self.n_batches(batch_size)?;
        let total     = n_batches * batch_size;

        let folder_a = self.folder(Split::Train, Domain::A)?;
        let folder_b = self.folder(Split::Train, Domain::B)?;
        let paths_a  = sample_without_replacement(folder_a.paths(), total, &mut self.rng);
        let paths_b  = sample_without_replacement(folder_b.paths(), total, &mut self.rng);

        tracing::debug!(
            "Epoch plan: {} batches of {} from {} A / {} B images",
            n_batches, batch_size, folder_a.len(), folder_b.len()
        );

        Ok(Box::new(PairedBatches {
            paths_a,
            paths_b,
            batch_size,
            n_batches,
            next: 0,
            preprocessor: self.preprocessor,
            rng:          StdRng::seed_from_u64(self.rng.gen()),
        }))
    }

    fn load_data(
        &mut self,
        domain:     Domain,
        batch_size: usize,
        is_testing: bool,
    ) -> Result<Vec<NormalizedImage>> {
        let folder = self.folder(Split::from_testing(is_testing), domain)?;
        if folder.is_empty() {
            bail!("No images found in '{}'", folder.dir().display());
        }

        let mut images = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            // with replacement: the same file may be drawn twice
            let idx  = self.rng.gen_range(0..folder.len());
            let flip = !is_testing && self.rng.gen::<f64>() > 0.5;
            images.push(self.preprocessor.load(&folder.paths()[idx], flip)?);
        }
        Ok(images)
    }
}

/// Pick `count` distinct paths in random order
fn sample_without_replacement(paths: &[PathBuf], count: usize, rng: &mut StdRng) -> Vec<PathBuf> {
    let mut picked: Vec<PathBuf> = paths.choose_multiple(rng, count).cloned().collect();
    picked.shuffle(rng);
    picked
}

// ─── PairedBatches ────────────────────────────────────────────────────────────
// Lazily decodes one epoch.
struct PairedBatches {
    paths_a:      Vec<PathBuf>,
    paths_b:      Vec<PathBuf>,
    batch_size:   usize,
    n_batches:    usize,
    next:         usize,
    preprocessor: ImagePreprocessor,
    rng:          StdRng,
}

impl PairedBatches {
    fn read(&mut self, index: usize) -> Result<PairedBatch> {
        let start = index * self.batch_size;
        let mut a = Vec::with_capacity(self.batch_size);
        let mut b = Vec::with_capacity(self.batch_size);

        for i in start..start + self.batch_size {
            let flip = self.rng.gen::<f64>() > 0.5;
            a.push(self.preprocessor.load(&self.paths_a[i], flip)?);
            b.push(self.preprocessor.load(&self.paths_b[i], flip)?);
        }
        Ok(PairedBatch { a, b })
    }
}

impl Iterator for PairedBatches {
    type Item = Result<PairedBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.n_batches {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.read(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.n_batches - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for PairedBatches {}
