// ============================================================
// Layer 6: Checkpoint Manager
// ============================================================
// Saves and restores network weights using Burn's CompactRecorder.
//
// What gets saved after every epoch:
//   1. Generator weights (g_AB and g_BA in one record)
//   2. Discriminator weights, one record each for d_A and d_B
//   3. latest_epoch.json : which epoch was last saved
//
// And once, before training starts:
//   4. train_config.json : image size, channels and filter
//      counts, needed to rebuild the networks before the
//      weights can be loaded into them
//
// Burn's CompactRecorder:
//   - Serialises parameters to MessagePack, half precision
//   - Type-safe: loading fails if the architecture doesn't match
//
// File naming convention:
//   checkpoints/
//     generators_epoch_0.mpk   ← g_AB + g_BA after epoch 0
//     d_a_epoch_0.mpk
//     d_b_epoch_0.mpk
//     ...
//     latest_epoch.json        ← number of the latest epoch
//     train_config.json        ← run hyperparameters
//     metrics.csv              ← written by MetricsLogger
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Record, Recorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::{discriminator::PatchDiscriminator, model::CycleGenerators};

const LATEST_EPOCH: &str = "latest_epoch.json";
const TRAIN_CONFIG: &str = "train_config.json";

/// Manages saving and loading of CycleGAN checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save all three trainable units for `epoch` and move the latest pointer.
    pub fn save_epoch<B: Backend>(
        &self,
        generators: &CycleGenerators<B>,
        d_a:        &PatchDiscriminator<B>,
        d_b:        &PatchDiscriminator<B>,
        epoch:      usize,
    ) -> Result<()> {
        self.record(generators.clone().into_record(), "generators", epoch)?;
        self.record(d_a.clone().into_record(), "d_a", epoch)?;
        self.record(d_b.clone().into_record(), "d_b", epoch)?;

        // Written last: the pointer only ever names a complete checkpoint
        let latest_path = self.dir.join(LATEST_EPOCH);
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write '{}'", latest_path.display()))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    fn record<B: Backend, R: Record<B>>(
        &self,
        record: R,
        stem:   &str,
        epoch:  usize,
    ) -> Result<()> {
        // Path without extension: the recorder adds it
        let path = self.path_for(stem, epoch);
        Recorder::<B>::record(&CompactRecorder::new(), record, path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;
        Ok(())
    }

    fn path_for(&self, stem: &str, epoch: usize) -> PathBuf {
        self.dir.join(format!("{stem}_epoch_{epoch}"))
    }

    /// Load generator weights saved at `epoch`.
    /// `generators` must have the architecture the checkpoint was saved with.
    pub fn load_generators<B: Backend>(
        &self,
        generators: CycleGenerators<B>,
        epoch:      usize,
        device:     &B::Device,
    ) -> Result<CycleGenerators<B>> {
        let path = self.path_for("generators", epoch);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load generators '{}'. Have you trained the model first?",
                    path.display())
            })?;
        Ok(generators.load_record(record))
    }

    /// Load one discriminator (`which` is "d_a" or "d_b") saved at `epoch`
    pub fn load_discriminator<B: Backend>(
        &self,
        discriminator: PatchDiscriminator<B>,
        which:         &str,
        epoch:         usize,
        device:        &B::Device,
    ) -> Result<PatchDiscriminator<B>> {
        let path = self.path_for(which, epoch);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load discriminator '{}'", path.display()))?;
        Ok(discriminator.load_record(record))
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(TRAIN_CONFIG);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the configuration a checkpoint was trained with.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(TRAIN_CONFIG);
        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'translate'.",
                    path.display()
                )
            })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config in '{}'", path.display()))
    }

    /// Latest completed epoch, or None when nothing has been saved yet.
    pub fn latest_epoch(&self) -> Result<Option<usize>> {
        let path = self.dir.join(LATEST_EPOCH);
        if !path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        Ok(Some(serde_json::from_str::<usize>(s.trim())?))
    }

    /// Like `latest_epoch`, but a missing checkpoint is an error.
    pub fn require_latest_epoch(&self) -> Result<usize> {
        self.latest_epoch()?.with_context(|| {
            format!(
                "No checkpoint found in '{}'. Have you run 'train' first?",
                self.dir.display()
            )
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::CycleGanConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_latest_epoch_missing_is_none() {
        let tmp  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path().join("ckpt")).unwrap();
        assert_eq!(ckpt.latest_epoch().unwrap(), None);
        assert!(ckpt.require_latest_epoch().is_err());
    }

    #[test]
    fn test_config_round_trip() {
        let tmp  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path()).unwrap();
        let cfg  = TrainConfig { dataset_name: "horse2zebra".into(), gf: 8, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();

        let loaded = ckpt.load_config().unwrap();
        assert_eq!(loaded.dataset_name, "horse2zebra");
        assert_eq!(loaded.gf, 8);
    }

    #[test]
    fn test_save_and_restore_weights() {
        let tmp    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(tmp.path()).unwrap();
        let device = Default::default();
        let cfg    = CycleGanConfig::new(16, 16, 3).with_gf(2).with_df(2);

        let gens = cfg.init_generators::<TestBackend>(&device);
        let d_a  = cfg.init_discriminator::<TestBackend>(&device);
        let d_b  = cfg.init_discriminator::<TestBackend>(&device);
        ckpt.save_epoch(&gens, &d_a, &d_b, 3).unwrap();
        assert_eq!(ckpt.latest_epoch().unwrap(), Some(3));

        // fresh random weights, then overwrite them from disk
        let x = Tensor::<TestBackend, 4>::random(
            [1, 3, 16, 16],
            burn::tensor::Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let restored = ckpt
            .load_generators(cfg.init_generators::<TestBackend>(&device), 3, &device)
            .unwrap();
        let expected: Vec<f32> = gens.g_ab.forward(x.clone()).into_data().to_vec().unwrap();
        let actual:   Vec<f32> = restored.g_ab.forward(x).into_data().to_vec().unwrap();
        for (e, a) in expected.iter().zip(actual.iter()) {
            // CompactRecorder stores half precision
            assert!((e - a).abs() < 5e-2);
        }

        assert!(ckpt
            .load_discriminator(cfg.init_discriminator::<TestBackend>(&device), "d_b", 3, &device)
            .is_ok());
        assert!(ckpt
            .load_discriminator(cfg.init_discriminator::<TestBackend>(&device), "d_b", 4, &device)
            .is_err());
    }
}
