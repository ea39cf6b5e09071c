// ============================================================
// Layer 4: Data Pipeline
// ============================================================
// This layer handles everything from image files on disk all
// the way to GPU-ready tensor batches.
//
// The pipeline flows in this order:
//
//   datasets/<name>/{trainA,trainB,testA,testB}
//       │
//       ▼
//   ImageFolder        → lists the image files of one folder
//       │
//       ▼
//   ImageFolderLoader  → samples files per epoch or per sample grid
//       │
//       ▼
//   ImagePreprocessor  → resize, mirror, scale to [-1, 1]
//       │
//       ▼
//   ImageBatcher       → stacks images into [N, C, H, W] tensors
//
// Each module is responsible for exactly one step.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Implements Burn's Dataset trait over one folder of images
pub mod dataset;

/// Decodes, resizes and normalises images
pub mod preprocessor;

/// Samples epochs and sample sets from a two-domain dataset
pub mod loader;

/// Stacks images into tensor batches and back
pub mod batcher;
