// ============================================================
// Layer 3: Core Traits (Abstractions)
// ============================================================
// The training loop and the sampler only ever talk to an
// ImageSource. The folder-backed loader in Layer 4 is one
// implementation; tests use an in-memory one.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::image::{Domain, NormalizedImage};

/// One training step's worth of unpaired images.
/// `a[i]` and `b[i]` are unrelated; they only share a batch.
#[derive(Debug, Clone)]
pub struct PairedBatch {
    pub a: Vec<NormalizedImage>,
    pub b: Vec<NormalizedImage>,
}

impl PairedBatch {
    pub fn len(&self) -> usize {
        self.a.len().min(self.b.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An epoch of paired batches. `len()` is the number of batches left.
/// The iterator owns its state, so the source stays usable mid-epoch.
pub type BatchIter = Box<dyn ExactSizeIterator<Item = Result<PairedBatch>>>;

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Anything that can feed two image domains to the trainer.
pub trait ImageSource {
    /// Start a new epoch of training batches of `batch_size` images per domain.
    /// Every batch is full; leftover images that do not fill one are skipped.
    fn load_batch(&mut self, batch_size: usize) -> Result<BatchIter>;

    /// Draw `batch_size` random images of one domain, from the test split
    /// when `is_testing` is set.
    fn load_data(
        &mut self,
        domain:     Domain,
        batch_size: usize,
        is_testing: bool,
    ) -> Result<Vec<NormalizedImage>>;
}
