// ============================================================
// Layer 6: Infrastructure Layer
// ============================================================
// Handles everything a training run leaves behind on disk:
//
//   checkpoint.rs    : Saving and loading network weights
//                      with Burn's CompactRecorder, plus the
//                      TrainConfig as JSON so `translate` can
//                      rebuild the generators.
//
//   metrics.rs       : One CSV row per batch and the console
//                      progress line.
//
//   sample_writer.rs : Tiles sample translations into a PNG
//                      grid under images/<dataset>/.
//
//   visual.rs        : Plain-text network summaries under
//                      visual/.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Network checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Sample grid composition and PNG output
pub mod sample_writer;

/// Network summary files
pub mod visual;
