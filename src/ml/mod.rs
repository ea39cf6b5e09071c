// ============================================================
// Layer 5: ML / Model Layer (Burn)
// ============================================================
// This layer contains the networks and everything that runs
// them: building, training, sampling and translating.
//
// What's in this layer:
//
//   layers.rs        : 4×4 convolution with TensorFlow-style
//                      "same" padding, used by both networks
//
//   generator.rs     : U-Net generator (4 down, 3 up blocks
//                      with skip connections, tanh output)
//
//   discriminator.rs : PatchGAN discriminator producing one
//                      score per image patch
//
//   model.rs         : Network configuration, the generator
//                      pair and the combined forward pass
//
//   losses.rs        : MSE / MAE, patch accuracy and the
//                      six-term weighted generator objective
//
//   trainer.rs       : The alternating training loop with
//                      per-epoch checkpoints
//
//   sampler.rs       : Periodic A→B→A / B→A→B sample grids
//
//   translator.rs    : Loads a checkpoint and translates
//                      single images
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Zhu et al. (2017) Unpaired Image-to-Image Translation

/// Same-padded convolution
pub mod layers;

/// U-Net generator
pub mod generator;

/// PatchGAN discriminator
pub mod discriminator;

/// CycleGAN configuration and combined model
pub mod model;

/// Losses and metrics
pub mod losses;

/// Full training loop with checkpointing
pub mod trainer;

/// Sample grid generation during training
pub mod sampler;

/// Inference engine: loads a checkpoint and translates images
pub mod translator;
