// ============================================================
// Layer 5: Sample Images
// ============================================================
// Draws one test image per domain, runs both translation
// cycles and hands the six results to the SampleWriter:
//
//   A  →  g_AB(A)  →  g_BA(g_AB(A))
//   B  →  g_BA(B)  →  g_AB(g_BA(B))
//
// Runs on the inner (non-autodiff) backend via `.valid()`.

use anyhow::{Context, Result};
use burn::prelude::*;
use image::RgbImage;
use std::path::PathBuf;

use crate::data::{batcher::ImageBatcher, preprocessor::ImagePreprocessor};
use crate::domain::{image::Domain, traits::ImageSource};
use crate::infra::sample_writer::SampleWriter;
use crate::ml::model::CycleGenerators;

pub fn sample_images<B: Backend, S: ImageSource + ?Sized>(
    generators: &CycleGenerators<B>,
    source:     &mut S,
    writer:     &SampleWriter,
    epoch:      usize,
    batch:      usize,
    device:     &B::Device,
) -> Result<PathBuf> {
    let batcher = ImageBatcher::<B>::new(device.clone());

    let mut rows = Vec::with_capacity(2);
    for domain in [Domain::A, Domain::B] {
        let original = batcher.batch(&source.load_data(domain, 1, true)?)?;
        let translated    = generators.translate(domain, original.clone());
        let reconstructed = generators.translate(domain.opposite(), translated.clone());

        rows.push(vec![
            first_as_rgb(original)?,
            first_as_rgb(translated)?,
            first_as_rgb(reconstructed)?,
        ]);
    }

    writer.save(epoch, batch, &rows)
}

fn first_as_rgb<B: Backend>(t: Tensor<B, 4>) -> Result<RgbImage> {
    let images = ImageBatcher::<B>::unbatch(t)?;
    let first  = images.first().context("Sample batch is empty")?;
    Ok(ImagePreprocessor::to_rgb(first))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::NormalizedImage;
    use crate::domain::traits::BatchIter;
    use crate::ml::model::CycleGanConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    struct Flat;

    impl ImageSource for Flat {
        fn load_batch(&mut self, _: usize) -> Result<BatchIter> {
            Ok(Box::new(std::iter::empty()))
        }

        fn load_data(&mut self, _: Domain, n: usize, _: bool) -> Result<Vec<NormalizedImage>> {
            Ok(vec![NormalizedImage::new(1, 16, 16, vec![0.0; 256]); n])
        }
    }

    #[test]
    fn test_writes_two_by_three_grid() {
        let tmp    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let gens   = CycleGanConfig::new(16, 16, 1).with_gf(2).init_generators::<TestBackend>(&device);
        let writer = SampleWriter::new(tmp.path(), "flat");

        let path = sample_images(&gens, &mut Flat, &writer, 0, 200, &device).unwrap();
        assert!(path.ends_with("flat/0_200.png"));

        // three 16px cells across, two down, plus margins
        let (w, h) = image::open(&path).unwrap().to_rgb8().dimensions();
        assert!(w > 3 * 16 && h > 2 * 16 && w > h);
    }
}
