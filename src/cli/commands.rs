// ============================================================
// Layer 1: CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `translate`
// and all their configurable flags.
//
// Training flags are all optional: each one overrides the
// matching field of the base config, which is either the
// built-in default or the JSON file given with --config.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::train_use_case::TrainConfig;
use crate::domain::{image::Domain, loss_weights::LossWeights};

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a CycleGAN on an unpaired two-domain image dataset
    Train(TrainArgs),

    /// Translate one image with a trained checkpoint
    Translate(TranslateArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// JSON file with a (partial) training config to start from
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Dataset folder name under --data-dir [default: apple2orange]
    #[arg(long)]
    pub dataset_name: Option<String>,

    /// Directory holding the datasets [default: datasets]
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Directory for checkpoints, config and metrics.csv [default: checkpoints]
    #[arg(long)]
    pub checkpoint_dir: Option<String>,

    /// Directory for sample grids [default: images]
    #[arg(long)]
    pub images_dir: Option<String>,

    /// Directory for network summaries [default: visual]
    #[arg(long)]
    pub visual_dir: Option<String>,

    /// Image height after resizing, a multiple of 16 [default: 128]
    #[arg(long)]
    pub img_rows: Option<usize>,

    /// Image width after resizing, a multiple of 16 [default: 128]
    #[arg(long)]
    pub img_cols: Option<usize>,

    /// 3 for RGB, 1 for grayscale [default: 3]
    #[arg(long)]
    pub channels: Option<usize>,

    /// Filters in the first generator layer [default: 32]
    #[arg(long)]
    pub gf: Option<usize>,

    /// Filters in the first discriminator layer [default: 64]
    #[arg(long)]
    pub df: Option<usize>,

    /// Weight of the cycle-consistency loss [default: 10.0]
    #[arg(long)]
    pub lambda_cycle: Option<f64>,

    /// Weight of the identity loss [default: 0.1 * lambda-cycle]
    #[arg(long)]
    pub lambda_id: Option<f64>,

    /// Adam learning rate [default: 0.0002]
    #[arg(long)]
    pub lr: Option<f64>,

    /// Adam beta_1 [default: 0.5]
    #[arg(long)]
    pub beta_1: Option<f64>,

    /// Number of full passes through the dataset [default: 200]
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Images per domain in one training step [default: 1]
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Write a sample grid every N batches [default: 200]
    #[arg(long)]
    pub sample_interval: Option<usize>,

    /// Dropout rate in the generator's up-sampling blocks [default: 0.0]
    #[arg(long)]
    pub dropout: Option<f64>,

    /// Seed for data sampling and weight initialisation [default: 42]
    #[arg(long)]
    pub seed: Option<u64>,

    /// Continue from the latest checkpoint in --checkpoint-dir
    #[arg(long)]
    pub resume: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2;
/// the application layer never sees clap types.
impl TryFrom<TrainArgs> for TrainConfig {
    type Error = anyhow::Error;

    fn try_from(a: TrainArgs) -> Result<Self> {
        let mut cfg = match &a.config {
            Some(path) => TrainConfig::load_json(path)?,
            None       => TrainConfig::default(),
        };

        if let Some(v) = a.dataset_name    { cfg.dataset_name    = v; }
        if let Some(v) = a.data_dir        { cfg.data_dir        = v; }
        if let Some(v) = a.checkpoint_dir  { cfg.checkpoint_dir  = v; }
        if let Some(v) = a.images_dir      { cfg.images_dir      = v; }
        if let Some(v) = a.visual_dir      { cfg.visual_dir      = v; }
        if let Some(v) = a.img_rows        { cfg.img_rows        = v; }
        if let Some(v) = a.img_cols        { cfg.img_cols        = v; }
        if let Some(v) = a.channels        { cfg.channels        = v; }
        if let Some(v) = a.gf              { cfg.gf              = v; }
        if let Some(v) = a.df              { cfg.df              = v; }
        if let Some(v) = a.lr              { cfg.lr              = v; }
        if let Some(v) = a.beta_1          { cfg.beta_1          = v; }
        if let Some(v) = a.epochs          { cfg.epochs          = v; }
        if let Some(v) = a.batch_size      { cfg.batch_size      = v; }
        if let Some(v) = a.sample_interval { cfg.sample_interval = v; }
        if let Some(v) = a.dropout         { cfg.dropout         = v; }
        if let Some(v) = a.seed            { cfg.seed            = v; }

        // identity weight follows the cycle weight unless given explicitly
        if let Some(v) = a.lambda_cycle {
            let weights = LossWeights::from_cycle(v);
            cfg.lambda_cycle = weights.cycle;
            cfg.lambda_id    = weights.identity;
        }
        if let Some(v) = a.lambda_id {
            cfg.lambda_id = v;
        }

        cfg.resume |= a.resume;
        Ok(cfg)
    }
}

/// Which way to translate
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Domain A into domain B (g_AB)
    A2b,
    /// Domain B into domain A (g_BA)
    B2a,
}

impl Direction {
    /// The domain the input image belongs to
    pub fn source(self) -> Domain {
        match self {
            Direction::A2b => Domain::A,
            Direction::B2a => Domain::B,
        }
    }
}

/// All arguments for the `translate` command
#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// Image to translate
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the translated PNG
    #[arg(long)]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = Direction::A2b)]
    pub direction: Direction,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn train_args(argv: &[&str]) -> TrainArgs {
        let cli = Cli::try_parse_from(["cyclegan", "train"].iter().chain(argv)).unwrap();
        match cli.command {
            Commands::Train(args) => args,
            other => panic!("expected train, got {other:?}"),
        }
    }

    #[test]
    fn test_no_flags_gives_defaults() {
        let cfg = TrainConfig::try_from(train_args(&[])).unwrap();
        assert_eq!(cfg.dataset_name, "apple2orange");
        assert_eq!(cfg.sample_interval, 200);
        assert!(!cfg.resume);
    }

    #[test]
    fn test_lambda_id_follows_lambda_cycle() {
        let cfg = TrainConfig::try_from(train_args(&["--lambda-cycle", "5"])).unwrap();
        assert_eq!(cfg.lambda_id, 0.5);

        let cfg = TrainConfig::try_from(train_args(&["--lambda-cycle", "5", "--lambda-id", "2"])).unwrap();
        assert_eq!(cfg.lambda_id, 2.0);
    }

    #[test]
    fn test_flags_override_config_file() {
        let tmp  = tempfile::tempdir().unwrap();
        let path = tmp.path().join("run.json");
        std::fs::write(&path, r#"{ "dataset_name": "horse2zebra", "epochs": 5 }"#).unwrap();

        let cfg = TrainConfig::try_from(train_args(&[
            "--config", path.to_str().unwrap(), "--epochs", "7", "--resume",
        ]))
        .unwrap();
        assert_eq!(cfg.dataset_name, "horse2zebra");
        assert_eq!(cfg.epochs, 7);
        assert!(cfg.resume);
    }

    #[test]
    fn test_translate_direction() {
        let cli = Cli::try_parse_from([
            "cyclegan", "translate", "--input", "a.jpg", "--output", "b.png", "--direction", "b2a",
        ])
        .unwrap();
        match cli.command {
            Commands::Translate(args) => assert_eq!(args.direction.source(), Domain::B),
            other => panic!("expected translate, got {other:?}"),
        }
    }
}
