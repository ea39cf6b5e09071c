// ============================================================
// Layer 5: Translator
// ============================================================
// Loads trained generators from a checkpoint directory and
// translates single images in either direction.
use anyhow::{Context, Result};
use burn::prelude::*;
use std::path::Path;

use crate::data::{batcher::ImageBatcher, preprocessor::ImagePreprocessor};
use crate::domain::image::{Domain, NormalizedImage};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::CycleGenerators;

pub struct Translator<B: Backend> {
    generators:   CycleGenerators<B>,
    preprocessor: ImagePreprocessor,
    batcher:      ImageBatcher<B>,
}

impl<B: Backend> Translator<B> {
    pub fn new(generators: CycleGenerators<B>, preprocessor: ImagePreprocessor, device: B::Device) -> Self {
        Self { generators, preprocessor, batcher: ImageBatcher::new(device) }
    }

    /// Rebuild the generators from train_config.json and load the latest weights.
    /// Dropout is switched off for inference.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let cfg   = ckpt_manager.load_config()?;
        let epoch = ckpt_manager.require_latest_epoch()?;

        let model_cfg  = cfg.model_config().with_dropout(0.0);
        let generators = ckpt_manager.load_generators(
            model_cfg.init_generators::<B>(&device), epoch, &device,
        )?;
        tracing::info!("Generators loaded from checkpoint of epoch {}", epoch);

        Ok(Self::new(generators, cfg.preprocessor(), device))
    }

    pub fn translate_image(&self, img: &NormalizedImage, from: Domain) -> Result<NormalizedImage> {
        let x = self.batcher.batch(std::slice::from_ref(img))?;
        let y = self.generators.translate(from, x);
        ImageBatcher::<B>::unbatch(y)?
            .into_iter()
            .next()
            .context("Generator returned an empty batch")
    }

    /// Read `input`, translate it out of domain `from`, write a PNG to `output`
    pub fn translate_file(&self, input: &Path, output: &Path, from: Domain) -> Result<()> {
        let img = self.preprocessor.load(input, false)?;
        let out = self.translate_image(&img, from)?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        ImagePreprocessor::to_rgb(&out)
            .save(output)
            .with_context(|| format!("Cannot write '{}'", output.display()))?;

        tracing::info!(
            "Translated '{}' ({} → {}) into '{}'",
            input.display(), from, from.opposite(), output.display()
        );
        Ok(())
    }
}
