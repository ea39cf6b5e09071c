// ============================================================
// Layer 5: Training Loop
// ============================================================
// Alternates discriminator and generator updates, batch by batch.
//
// Per batch:
//   1. fake_B = g_AB(A), fake_A = g_BA(B), predicted on the inner
//      backend (no graph, no dropout) and lifted back as constants
//   2. d_A: one Adam step on (A, ones), one on (fake_A, zeros)
//      d_B: the same with B and fake_B
//   3. one Adam step on the generators against the six-term
//      combined objective; d_A and d_B are only read here
//   4. log the batch, write a sample grid every sample_interval
//
// After every epoch all three trainable units are checkpointed.
//
// Key Burn insight:
//   - Training uses MyBackend (Autodiff<Wgpu>) for gradients
//   - generators.valid() returns them on the inner backend,
//     which is what the sampler runs on (no graph, no dropout)
//   - GradientsParams::from_grads(grads, &module) keeps only the
//     gradients of that module's parameters, which is how the
//     discriminators stay frozen during the generator step
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam
//            Zhu et al. (2017) CycleGAN

use anyhow::{bail, Result};
use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::{path::PathBuf, time::Instant};

use crate::application::train_use_case::TrainConfig;
use crate::data::batcher::ImageBatcher;
use crate::domain::loss_weights::{DiscriminatorReport, GeneratorReport, LossWeights};
use crate::domain::traits::ImageSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{BatchMetrics, MetricsLogger},
    sample_writer::SampleWriter,
};
use crate::ml::{
    discriminator::PatchDiscriminator,
    losses::{mse, patch_accuracy, scalar, CycleLosses},
    model::CycleGenerators,
    sampler::sample_images,
};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

const ADAM_EPSILON: f32 = 1e-7;

/// What a finished run did
#[derive(Debug, Clone, Default)]
pub struct TrainingSummary {
    pub epochs_run:     usize,
    pub batches_run:    usize,
    pub last_d:         DiscriminatorReport,
    pub last_g:         Option<GeneratorReport>,
    pub samples:        Vec<PathBuf>,
}

pub fn run_training<S: ImageSource + ?Sized>(
    cfg:          &TrainConfig,
    source:       &mut S,
    ckpt_manager: &CheckpointManager,
) -> Result<TrainingSummary> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop::<MyBackend, S>(cfg, source, ckpt_manager, device)
}

pub fn train_loop<B: AutodiffBackend, S: ImageSource + ?Sized>(
    cfg:          &TrainConfig,
    source:       &mut S,
    ckpt_manager: &CheckpointManager,
    device:       B::Device,
) -> Result<TrainingSummary> {
    B::seed(cfg.seed);

    // ── Build networks ────────────────────────────────────────────────────────
    let model_cfg = cfg.model_config();
    let mut generators: CycleGenerators<B>   = model_cfg.init_generators(&device);
    let mut d_a:        PatchDiscriminator<B> = model_cfg.init_discriminator(&device);
    let mut d_b:        PatchDiscriminator<B> = model_cfg.init_discriminator(&device);

    let mut start_epoch = 0;
    if cfg.resume {
        match ckpt_manager.latest_epoch()? {
            Some(epoch) => {
                generators = ckpt_manager.load_generators(generators, epoch, &device)?;
                d_a = ckpt_manager.load_discriminator(d_a, "d_a", epoch, &device)?;
                d_b = ckpt_manager.load_discriminator(d_b, "d_b", epoch, &device)?;
                start_epoch = epoch + 1;
                tracing::info!("Resumed from checkpoint of epoch {}", epoch);
            }
            None => tracing::warn!("--resume set but no checkpoint found, starting fresh"),
        }
    }
    tracing::info!(
        "Networks ready: gf={}, df={}, image {}x{}x{}",
        cfg.gf, cfg.df, cfg.img_rows, cfg.img_cols, cfg.channels
    );

    // ── Adam, one per trainable unit ──────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let optim_cfg   = adam_config(cfg);
    let mut optim_d_a = optim_cfg.init();
    let mut optim_d_b = optim_cfg.init();
    let mut optim_g   = optim_cfg.init();

    let batcher = ImageBatcher::<B>::new(device.clone());
    let metrics = MetricsLogger::new(ckpt_manager.dir())?;
    tracing::info!("Logging batch metrics to '{}'", metrics.csv_path().display());
    let writer  = SampleWriter::new(&cfg.images_dir, &cfg.dataset_name);
    let weights = cfg.loss_weights();
    let (patch_h, patch_w) = model_cfg.disc_patch();

    let mut summary = TrainingSummary::default();
    let start_time  = Instant::now();

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in start_epoch..cfg.epochs {
        let batches   = source.load_batch(cfg.batch_size)?;
        let n_batches = batches.len();
        if n_batches == 0 {
            bail!("Epoch {epoch} has no full batch of {} images", cfg.batch_size);
        }

        for (batch_i, batch) in batches.enumerate() {
            let batch  = batch?;
            if batch.is_empty() {
                bail!("Epoch {epoch} batch {batch_i} holds no images");
            }
            let imgs_a = batcher.batch(&batch.a)?;
            let imgs_b = batcher.batch(&batch.b)?;

            // Adversarial ground truths
            let n     = batch.len();
            let valid = Tensor::<B, 4>::ones([n, 1, patch_h, patch_w], &device);
            let fake  = Tensor::<B, 4>::zeros([n, 1, patch_h, patch_w], &device);

            // ── Train discriminators ──────────────────────────────────────────
            let (fake_b, fake_a) = predict_fakes(&generators, imgs_a.clone(), imgs_b.clone());

            let (next, da_real) = discriminator_step(d_a, &mut optim_d_a, imgs_a.clone(), valid.clone(), cfg.lr);
            let (next, da_fake) = discriminator_step(next, &mut optim_d_a, fake_a, fake.clone(), cfg.lr);
            d_a = next;
            let (next, db_real) = discriminator_step(d_b, &mut optim_d_b, imgs_b.clone(), valid.clone(), cfg.lr);
            let (next, db_fake) = discriminator_step(next, &mut optim_d_b, fake_b, fake, cfg.lr);
            d_b = next;

            // total discriminator loss and accuracy
            let d_report = DiscriminatorReport::average(
                DiscriminatorReport::average(da_real, da_fake),
                DiscriminatorReport::average(db_real, db_fake),
            );

            // ── Train generators ──────────────────────────────────────────────
            let (next, g_report) = generator_step(
                generators, &mut optim_g, imgs_a, imgs_b, valid, &d_a, &d_b, &weights, cfg.lr,
            );
            generators = next;

            // ── Report ────────────────────────────────────────────────────────
            let row = BatchMetrics::new(epoch, batch_i, &d_report, &g_report, start_time.elapsed());
            println!("{}", row.progress_line(cfg.epochs, n_batches));
            metrics.log(&row)?;

            if !g_report.is_finite() {
                tracing::warn!("Non-finite generator loss at epoch {} batch {}", epoch, batch_i);
            }

            if batch_i % cfg.sample_interval == 0 {
                let path = sample_images(&generators.valid(), &mut *source, &writer, epoch, batch_i, &device)?;
                summary.samples.push(path);
            }

            summary.batches_run += 1;
            summary.last_d = d_report;
            summary.last_g = Some(g_report);
        }

        ckpt_manager.save_epoch(&generators, &d_a, &d_b, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
        summary.epochs_run += 1;
    }

    tracing::info!("Training complete!");
    Ok(summary)
}

pub fn adam_config(cfg: &TrainConfig) -> AdamConfig {
    AdamConfig::new()
        .with_beta_1(cfg.beta_1 as f32)
        .with_epsilon(ADAM_EPSILON)
}

/// g_AB(A) and g_BA(B) in inference mode, as constants of the training graph
fn predict_fakes<B: AutodiffBackend>(
    generators: &CycleGenerators<B>,
    imgs_a:     Tensor<B, 4>,
    imgs_b:     Tensor<B, 4>,
) -> (Tensor<B, 4>, Tensor<B, 4>) {
    let inference = generators.valid();
    let fake_b = inference.g_ab.forward(imgs_a.inner());
    let fake_a = inference.g_ba.forward(imgs_b.inner());
    (Tensor::from_inner(fake_b), Tensor::from_inner(fake_a))
}

/// One Adam step of both generators on the combined objective.
/// Only generator gradients are applied; `d_a` and `d_b` are read, never updated.
#[allow(clippy::too_many_arguments)]
fn generator_step<B, O>(
    generators: CycleGenerators<B>,
    optim:      &mut O,
    imgs_a:     Tensor<B, 4>,
    imgs_b:     Tensor<B, 4>,
    valid:      Tensor<B, 4>,
    d_a:        &PatchDiscriminator<B>,
    d_b:        &PatchDiscriminator<B>,
    weights:    &LossWeights,
    lr:         f64,
) -> (CycleGenerators<B>, GeneratorReport)
where
    B: AutodiffBackend,
    O: Optimizer<CycleGenerators<B>, B>,
{
    let output = generators.forward_combined(imgs_a.clone(), imgs_b.clone(), d_a, d_b);
    let losses = CycleLosses::compute(output, imgs_a, imgs_b, valid, weights);
    let report = losses.report();

    let grads = GradientsParams::from_grads(losses.total.backward(), &generators);
    (optim.step(lr, generators, grads), report)
}

/// One Adam step of a discriminator towards `target` (all ones or all zeros).
/// The report is measured before the update.
fn discriminator_step<B, O>(
    d:      PatchDiscriminator<B>,
    optim:  &mut O,
    images: Tensor<B, 4>,
    target: Tensor<B, 4>,
    lr:     f64,
) -> (PatchDiscriminator<B>, DiscriminatorReport)
where
    B: AutodiffBackend,
    O: Optimizer<PatchDiscriminator<B>, B>,
{
    let pred     = d.forward(images);
    let accuracy = patch_accuracy(pred.clone().detach(), target.clone());
    let loss     = mse(pred, target);
    let report   = DiscriminatorReport::new(scalar(loss.clone()), accuracy);

    let grads = GradientsParams::from_grads(loss.backward(), &d);
    (optim.step(lr, d, grads), report)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::{Domain, NormalizedImage};
    use crate::domain::traits::{BatchIter, PairedBatch};
    use crate::ml::model::CycleGanConfig;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray<f32>>;

    /// Fixed images held in memory, served in order
    struct MemorySource {
        a: Vec<NormalizedImage>,
        b: Vec<NormalizedImage>,
    }

    impl MemorySource {
        fn new(count: usize, size: usize) -> Self {
            let img = |v: f32| NormalizedImage::new(3, size, size, vec![v; 3 * size * size]);
            Self {
                a: (0..count).map(|i| img(-0.5 + 0.1 * i as f32)).collect(),
                b: (0..count).map(|i| img(0.5 - 0.1 * i as f32)).collect(),
            }
        }
    }

    impl ImageSource for MemorySource {
        fn load_batch(&mut self, batch_size: usize) -> Result<BatchIter> {
            let n = self.a.len().min(self.b.len()) / batch_size;
            let batches: Vec<Result<PairedBatch>> = (0..n)
                .map(|i| {
                    let range = i * batch_size..(i + 1) * batch_size;
                    Ok(PairedBatch { a: self.a[range.clone()].to_vec(), b: self.b[range].to_vec() })
                })
                .collect();
            Ok(Box::new(batches.into_iter()))
        }

        fn load_data(&mut self, domain: Domain, batch_size: usize, _: bool) -> Result<Vec<NormalizedImage>> {
            let pool = match domain {
                Domain::A => &self.a,
                Domain::B => &self.b,
            };
            Ok(pool.iter().cycle().take(batch_size).cloned().collect())
        }
    }

    fn tiny_config(root: &std::path::Path) -> TrainConfig {
        TrainConfig {
            dataset_name:    "memory".into(),
            checkpoint_dir:  root.join("ckpt").display().to_string(),
            images_dir:      root.join("images").display().to_string(),
            img_rows:        16,
            img_cols:        16,
            gf:              2,
            df:              2,
            epochs:          1,
            batch_size:      2,
            sample_interval: 1,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_one_epoch_produces_finite_losses() {
        let tmp  = tempfile::tempdir().unwrap();
        let cfg  = tiny_config(tmp.path());
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir).unwrap();
        let mut source = MemorySource::new(4, 16);

        let summary = train_loop::<TestBackend, _>(&cfg, &mut source, &ckpt, Default::default()).unwrap();

        assert_eq!(summary.epochs_run, 1);
        assert_eq!(summary.batches_run, 2);
        assert!(summary.last_g.unwrap().is_finite());
        assert!(summary.last_d.loss.is_finite());
        assert!((0.0..=1.0).contains(&summary.last_d.accuracy));

        // a sample grid per batch, a checkpoint, a CSV row per batch
        assert_eq!(summary.samples.len(), 2);
        assert!(tmp.path().join("images/memory/0_1.png").exists());
        assert_eq!(ckpt.latest_epoch().unwrap(), Some(0));
        let csv = std::fs::read_to_string(tmp.path().join("ckpt/metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_resume_continues_after_latest_epoch() {
        let tmp  = tempfile::tempdir().unwrap();
        let cfg  = TrainConfig { sample_interval: 100, ..tiny_config(tmp.path()) };
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir).unwrap();
        let mut source = MemorySource::new(2, 16);

        train_loop::<TestBackend, _>(&cfg, &mut source, &ckpt, Default::default()).unwrap();

        let resumed = TrainConfig { epochs: 3, resume: true, ..cfg };
        let summary = train_loop::<TestBackend, _>(&resumed, &mut source, &ckpt, Default::default()).unwrap();

        // epoch 0 was already done: only epochs 1 and 2 run
        assert_eq!(summary.epochs_run, 2);
        assert_eq!(ckpt.latest_epoch().unwrap(), Some(2));
    }

    #[test]
    fn test_discriminator_step_reports_before_update() {
        let device = Default::default();
        let cfg    = tiny_config(std::path::Path::new("unused")).model_config();
        let d      = cfg.init_discriminator::<TestBackend>(&device);
        let mut optim = AdamConfig::new().init();

        let images = Tensor::<TestBackend, 4>::zeros([1, 3, 16, 16], &device);
        let target = Tensor::<TestBackend, 4>::ones([1, 1, 1, 1], &device);
        let expected = scalar(mse(d.forward(images.clone()), target.clone()));

        let (_, report) = discriminator_step(d, &mut optim, images, target, 1e-3);
        assert!((report.loss - expected).abs() < 1e-6);
    }

    fn values(t: Tensor<TestBackend, 4>) -> Vec<f32> {
        t.into_data().to_vec().unwrap()
    }

    fn random_images(device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 4> {
        Tensor::random([2, 3, 16, 16], burn::tensor::Distribution::Uniform(-1.0, 1.0), device)
    }

    #[test]
    fn test_generator_step_leaves_discriminators_unchanged() {
        let device    = Default::default();
        let model_cfg = tiny_config(std::path::Path::new("unused")).model_config();
        let generators = model_cfg.init_generators::<TestBackend>(&device);
        let d_a = model_cfg.init_discriminator::<TestBackend>(&device);
        let d_b = model_cfg.init_discriminator::<TestBackend>(&device);
        let mut optim = adam_config(&TrainConfig::default()).init();

        let imgs_a = random_images(&device);
        let imgs_b = random_images(&device);
        let valid  = Tensor::<TestBackend, 4>::ones([2, 1, 1, 1], &device);

        let d_a_before = values(d_a.forward(imgs_a.clone()));
        let d_b_before = values(d_b.forward(imgs_b.clone()));
        let g_before   = values(generators.g_ab.forward(imgs_a.clone()));

        let (generators, report) = generator_step(
            generators, &mut optim, imgs_a.clone(), imgs_b.clone(), valid,
            &d_a, &d_b, &LossWeights::from_cycle(10.0), 1e-2,
        );

        assert!(report.is_finite());
        assert_eq!(values(d_a.forward(imgs_a.clone())), d_a_before);
        assert_eq!(values(d_b.forward(imgs_b)), d_b_before);

        let g_after = values(generators.g_ab.forward(imgs_a));
        assert!(g_after.iter().zip(&g_before).any(|(x, y)| (x - y).abs() > 1e-6));
    }

    #[test]
    fn test_fakes_are_predicted_without_dropout() {
        let device = Default::default();
        let generators = CycleGanConfig::new(16, 16, 3)
            .with_gf(2)
            .with_dropout(0.5)
            .init_generators::<TestBackend>(&device);
        let imgs_a = random_images(&device);
        let imgs_b = random_images(&device);

        let (b1, a1) = predict_fakes(&generators, imgs_a.clone(), imgs_b.clone());
        let (b2, a2) = predict_fakes(&generators, imgs_a, imgs_b);
        assert_eq!(values(b1), values(b2));
        assert_eq!(values(a1), values(a2));
    }

    #[test]
    fn test_adam_settings() {
        let cfg  = TrainConfig { beta_1: 0.5, ..TrainConfig::default() };
        let json = serde_json::to_value(adam_config(&cfg)).unwrap();
        assert!((json["epsilon"].as_f64().unwrap() - 1e-7).abs() < 1e-12);
        assert_eq!(json["beta_1"].as_f64().unwrap(), 0.5);
    }
}
