// ============================================================
// Layer 2: Translate Use Case
// ============================================================
// Loads the latest generators from a checkpoint directory and
// translates one image file:
//
//   Step 1: Read train_config.json and rebuild the generators
//   Step 2: Load the latest generator weights
//   Step 3: Resize + normalise the input, translate, write PNG

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::domain::image::Domain;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::translator::Translator;

type InferBackend = burn::backend::Wgpu;

pub struct TranslateUseCase {
    checkpoint_dir: PathBuf,
}

impl TranslateUseCase {
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self { checkpoint_dir: checkpoint_dir.into() }
    }

    /// Translate `input` out of domain `from` and save the result as `output`
    pub fn execute(&self, input: &Path, output: &Path, from: Domain) -> Result<()> {
        let ckpt_manager = CheckpointManager::new(&self.checkpoint_dir)?;
        let device       = burn::backend::wgpu::WgpuDevice::default();
        let translator   = Translator::<InferBackend>::from_checkpoint(&ckpt_manager, device)?;
        translator.translate_file(input, output, from)
    }
}
