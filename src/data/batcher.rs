// ============================================================
// Layer 4: Image Batcher
// ============================================================
// Stacks NormalizedImages into one 4D tensor and splits
// tensors back into images.
//
//   Input:  N images, each C × H × W (flat CHW buffers)
//   Output: Tensor<B, 4> of shape [N, C, H, W]
//
// Because every buffer is already CHW, stacking is just
// concatenating the buffers in order and reshaping.
//
// Reference: Burn Book §4 (Batcher)

use anyhow::{anyhow, bail, Context, Result};
use burn::{prelude::*, tensor::TensorData};

use crate::domain::image::NormalizedImage;

/// Holds the target device so tensors are created on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// All images must share one shape.
    pub fn batch(&self, images: &[NormalizedImage]) -> Result<Tensor<B, 4>> {
        let first = images.first().context("Cannot batch an empty list of images")?;
        let (c, h, w) = first.shape();

        let mut flat = Vec::with_capacity(images.len() * c * h * w);
        for (i, img) in images.iter().enumerate() {
            if img.shape() != (c, h, w) {
                bail!(
                    "Image {} has shape {:?}, expected {:?}",
                    i, img.shape(), (c, h, w)
                );
            }
            flat.extend_from_slice(&img.pixels);
        }

        Ok(Tensor::<B, 4>::from_data(
            TensorData::new(flat, [images.len(), c, h, w]),
            &self.device,
        ))
    }

    /// Split a [N, C, H, W] tensor back into N images
    pub fn unbatch(tensor: Tensor<B, 4>) -> Result<Vec<NormalizedImage>> {
        let [_, c, h, w] = tensor.dims();
        let flat: Vec<f32> = tensor
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read image tensor: {e:?}"))?;

        Ok(flat
            .chunks(c * h * w)
            .map(|chunk| NormalizedImage::new(c, h, w, chunk.to_vec()))
            .collect())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn image(value: f32) -> NormalizedImage {
        NormalizedImage::new(3, 2, 2, vec![value; 12])
    }

    #[test]
    fn test_batch_shape_and_order() {
        let batcher = ImageBatcher::<TestBackend>::new(Default::default());
        let tensor  = batcher.batch(&[image(-1.0), image(0.5)]).unwrap();
        assert_eq!(tensor.dims(), [2, 3, 2, 2]);

        let images = ImageBatcher::<TestBackend>::unbatch(tensor).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[1].at(2, 1, 1), 0.5);
    }

    #[test]
    fn test_empty_batch_fails() {
        let batcher = ImageBatcher::<TestBackend>::new(Default::default());
        assert!(batcher.batch(&[]).is_err());
    }

    #[test]
    fn test_mismatched_shapes_fail() {
        let batcher = ImageBatcher::<TestBackend>::new(Default::default());
        let small   = NormalizedImage::new(3, 1, 1, vec![0.0; 3]);
        assert!(batcher.batch(&[image(0.0), small]).is_err());
    }
}
