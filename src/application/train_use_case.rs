// ============================================================
// Layer 2: TrainUseCase
// ============================================================
// Orchestrates a full CycleGAN training run in order:
//
//   Step 1: Validate the configuration      (Layer 2)
//   Step 2: Open the two-domain dataset     (Layer 4 - data)
//   Step 3: Write network summaries         (Layer 6 - infra)
//   Step 4: Save config next to checkpoints (Layer 6 - infra)
//   Step 5: Run the training loop           (Layer 5 - ml)
//
// Reference: Rust Book §9 (Error Handling)
//            Burn Book §5 (Training)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::data::{loader::ImageFolderLoader, preprocessor::ImagePreprocessor};
use crate::domain::{architecture::ArchitectureSpec, loss_weights::LossWeights};
use crate::infra::{checkpoint::CheckpointManager, visual::write_network_summaries};
use crate::ml::{model::CycleGanConfig, trainer::run_training};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved next to the checkpoints and reloaded
// by `translate`. Missing fields in a JSON file fall back to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub dataset_name:    String,
    pub data_dir:        String,
    pub checkpoint_dir:  String,
    pub images_dir:      String,
    pub visual_dir:      String,
    pub img_rows:        usize,
    pub img_cols:        usize,
    pub channels:        usize,
    /// Filters in the first generator layer
    pub gf:              usize,
    /// Filters in the first discriminator layer
    pub df:              usize,
    pub lambda_cycle:    f64,
    pub lambda_id:       f64,
    pub lr:              f64,
    pub beta_1:          f64,
    pub epochs:          usize,
    pub batch_size:      usize,
    /// Write a sample grid every this many batches
    pub sample_interval: usize,
    pub dropout:         f64,
    pub seed:            u64,
    /// Continue from the latest checkpoint in checkpoint_dir
    pub resume:          bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        let weights = LossWeights::from_cycle(10.0);
        Self {
            dataset_name:    "apple2orange".to_string(),
            data_dir:        "datasets".to_string(),
            checkpoint_dir:  "checkpoints".to_string(),
            images_dir:      "images".to_string(),
            visual_dir:      "visual".to_string(),
            img_rows:        128,
            img_cols:        128,
            channels:        3,
            gf:              32,
            df:              64,
            lambda_cycle:    weights.cycle,
            lambda_id:       weights.identity,
            lr:              0.0002,
            beta_1:          0.5,
            epochs:          200,
            batch_size:      1,
            sample_interval: 200,
            dropout:         0.0,
            seed:            42,
            resume:          false,
        }
    }
}

impl TrainConfig {
    /// Read a (possibly partial) config from a JSON file
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    /// Reject configurations the networks cannot be built or trained with
    pub fn validate(&self) -> Result<()> {
        if self.dataset_name.trim().is_empty() {
            bail!("dataset_name must not be empty");
        }
        for (name, size) in [("img_rows", self.img_rows), ("img_cols", self.img_cols)] {
            if size == 0 || size % 16 != 0 {
                bail!("{name} must be a positive multiple of 16 (four stride-2 layers), got {size}");
            }
        }
        if self.channels != 1 && self.channels != 3 {
            bail!("channels must be 1 or 3, got {}", self.channels);
        }
        for (name, value) in [
            ("gf", self.gf),
            ("df", self.df),
            ("epochs", self.epochs),
            ("batch_size", self.batch_size),
            ("sample_interval", self.sample_interval),
        ] {
            if value == 0 {
                bail!("{name} must be at least 1");
            }
        }
        if !self.lr.is_finite() || self.lr <= 0.0 {
            bail!("lr must be a finite positive number, got {}", self.lr);
        }
        if !(0.0..1.0).contains(&self.beta_1) {
            bail!("beta_1 must be in [0, 1), got {}", self.beta_1);
        }
        if !(0.0..1.0).contains(&self.dropout) {
            bail!("dropout must be in [0, 1), got {}", self.dropout);
        }
        for (name, value) in [("lambda_cycle", self.lambda_cycle), ("lambda_id", self.lambda_id)] {
            if !value.is_finite() || value < 0.0 {
                bail!("{name} must be a finite non-negative number, got {value}");
            }
        }
        Ok(())
    }

    pub fn model_config(&self) -> CycleGanConfig {
        CycleGanConfig::new(self.img_rows, self.img_cols, self.channels)
            .with_gf(self.gf)
            .with_df(self.df)
            .with_dropout(self.dropout)
    }

    pub fn architecture_spec(&self) -> ArchitectureSpec {
        ArchitectureSpec {
            img_rows: self.img_rows,
            img_cols: self.img_cols,
            channels: self.channels,
            gf:       self.gf,
            df:       self.df,
            dropout:  self.dropout,
        }
    }

    pub fn loss_weights(&self) -> LossWeights {
        LossWeights::new(self.lambda_cycle, self.lambda_id)
    }

    pub fn preprocessor(&self) -> ImagePreprocessor {
        ImagePreprocessor::new(self.img_rows, self.img_cols, self.channels)
    }

    /// Discriminator output size: (rows / 16, cols / 16)
    pub fn disc_patch(&self) -> (usize, usize) {
        self.architecture_spec().disc_patch()
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Validate before anything touches the disk or the GPU ─────
        cfg.validate()?;

        // ── Step 2: Open the dataset ─────────────────────────────────────────
        let mut loader = ImageFolderLoader::new(
            &cfg.data_dir, &cfg.dataset_name, cfg.preprocessor(), cfg.seed,
        );
        let n_batches = loader.n_batches(cfg.batch_size)?;
        tracing::info!(
            "Dataset '{}': {} batches of {} per epoch",
            cfg.dataset_name, n_batches, cfg.batch_size
        );
        if n_batches == 0 {
            bail!(
                "Dataset '{}' has fewer than {} images in trainA or trainB",
                cfg.dataset_name, cfg.batch_size
            );
        }

        let (patch_h, patch_w) = cfg.disc_patch();
        tracing::info!("Discriminator output: {}x{} patches", patch_h, patch_w);

        // ── Step 3: Network summaries ────────────────────────────────────────
        write_network_summaries(&cfg.visual_dir, &cfg.architecture_spec(), &cfg.loss_weights())?;

        // ── Step 4: Save config for translate / resume ───────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt_manager.save_config(cfg)?;

        // ── Step 5: Train (Layer 5) ──────────────────────────────────────────
        let summary = run_training(cfg, &mut loader, &ckpt_manager)?;
        tracing::info!(
            "Trained {} epochs ({} batches), {} sample grids written",
            summary.epochs_run, summary.batches_run, summary.samples.len()
        );
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.lambda_id, 1.0);
        assert_eq!(cfg.disc_patch(), (8, 8));
        assert_eq!(cfg.loss_weights().per_output(), [1.0, 1.0, 10.0, 10.0, 1.0, 1.0]);
        assert!(cfg.validate().is_ok());

        // smallest accepted size: the bottleneck is 1×1
        let smallest = TrainConfig { img_rows: 16, img_cols: 16, ..TrainConfig::default() };
        assert!(smallest.validate().is_ok());
        assert_eq!(smallest.disc_patch(), (1, 1));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad = [
            TrainConfig { img_rows: 100, ..TrainConfig::default() },
            TrainConfig { channels: 2, ..TrainConfig::default() },
            TrainConfig { batch_size: 0, ..TrainConfig::default() },
            TrainConfig { lr: f64::NAN, ..TrainConfig::default() },
            TrainConfig { beta_1: 1.0, ..TrainConfig::default() },
            TrainConfig { dropout: -0.1, ..TrainConfig::default() },
            TrainConfig { lambda_cycle: -1.0, ..TrainConfig::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tmp  = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cfg.json");
        fs::write(&path, r#"{ "dataset_name": "facades", "img_rows": 256, "img_cols": 256 }"#).unwrap();

        let cfg = TrainConfig::load_json(&path).unwrap();
        assert_eq!(cfg.dataset_name, "facades");
        assert_eq!(cfg.disc_patch(), (16, 16));
        assert_eq!(cfg.gf, 32);
    }

    #[test]
    fn test_empty_dataset_fails_before_training() {
        let tmp = tempfile::tempdir().unwrap();
        for folder in ["trainA", "trainB"] {
            fs::create_dir_all(tmp.path().join("toy").join(folder)).unwrap();
        }
        let cfg = TrainConfig {
            dataset_name:   "toy".into(),
            data_dir:       tmp.path().display().to_string(),
            checkpoint_dir: tmp.path().join("ckpt").display().to_string(),
            ..TrainConfig::default()
        };
        let err = TrainUseCase::new(cfg).execute().unwrap_err();
        assert!(err.to_string().contains("fewer than"));
    }
}
