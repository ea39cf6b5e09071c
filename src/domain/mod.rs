// ============================================================
// Layer 3: Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define the core
// concepts of a CycleGAN run.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain data and arithmetic
//
// Keeping it pure means the shapes, weights and reports can
// be unit tested without building a single network.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Image domains, dataset splits and normalised images
pub mod image;

// The six weighted terms of the generator objective
pub mod loss_weights;

// Layer-by-layer summaries of the four networks
pub mod architecture;

// Core abstractions (traits) that other layers implement
pub mod traits;
