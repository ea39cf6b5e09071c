// ============================================================
// Layer 1: CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`     : trains a CycleGAN on datasets/<name>/
//   2. `translate` : loads a checkpoint and translates one image
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, TrainArgs, TranslateArgs};

use crate::application::train_use_case::TrainConfig;

#[derive(Parser, Debug)]
#[command(
    name = "cyclegan",
    version = "0.1.0",
    about = "Train a CycleGAN for unpaired image-to-image translation, then translate images."
)]
pub struct Cli {
    /// The subcommand to run (train or translate)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)     => Self::run_train(args),
            Commands::Translate(args) => Self::run_translate(args),
        }
    }

    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        let cfg = TrainConfig::try_from(args)?;
        tracing::info!(
            "Starting training on '{}' in: {}",
            cfg.dataset_name, cfg.data_dir
        );

        TrainUseCase::new(cfg).execute()?;

        println!("Training complete. Checkpoint saved.");
        Ok(())
    }

    fn run_translate(args: TranslateArgs) -> Result<()> {
        use crate::application::translate_use_case::TranslateUseCase;

        let use_case = TranslateUseCase::new(&args.checkpoint_dir);
        use_case.execute(&args.input, &args.output, args.direction.source())?;

        println!("Translated image written to {}", args.output.display());
        Ok(())
    }
}
