use burn::prelude::*;

use crate::domain::image::Domain;
use crate::ml::{
    discriminator::{PatchDiscriminator, PatchDiscriminatorConfig},
    generator::{UnetGenerator, UnetGeneratorConfig},
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally, so do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct CycleGanConfig {
    pub img_rows: usize,
    pub img_cols: usize,
    pub channels: usize,
    #[config(default = 32)]
    pub gf:       usize,
    #[config(default = 64)]
    pub df:       usize,
    #[config(default = 0.0)]
    pub dropout:  f64,
}

impl CycleGanConfig {
    pub fn generator(&self) -> UnetGeneratorConfig {
        UnetGeneratorConfig::new(self.channels)
            .with_filters(self.gf)
            .with_dropout(self.dropout)
    }

    pub fn discriminator(&self) -> PatchDiscriminatorConfig {
        PatchDiscriminatorConfig::new(self.channels).with_filters(self.df)
    }

    pub fn init_generators<B: Backend>(&self, device: &B::Device) -> CycleGenerators<B> {
        let g = self.generator();
        CycleGenerators::new(g.init(device), g.init(device))
    }

    pub fn init_discriminator<B: Backend>(&self, device: &B::Device) -> PatchDiscriminator<B> {
        self.discriminator().init(device)
    }

    /// Spatial size of the discriminator output: four stride-2 halvings
    pub fn disc_patch(&self) -> (usize, usize) {
        (self.img_rows / 16, self.img_cols / 16)
    }
}

/// Both generators. This is the only trainable part of the combined step;
/// the discriminators are passed in by reference and never updated there.
#[derive(Module, Debug)]
pub struct CycleGenerators<B: Backend> {
    /// A → B
    pub g_ab: UnetGenerator<B>,
    /// B → A
    pub g_ba: UnetGenerator<B>,
}

/// The six outputs of the combined model plus the two translations
/// they are built from.
pub struct CombinedOutput<B: Backend> {
    pub fake_a:     Tensor<B, 4>,
    pub fake_b:     Tensor<B, 4>,
    pub valid_a:    Tensor<B, 4>,
    pub valid_b:    Tensor<B, 4>,
    pub reconstr_a: Tensor<B, 4>,
    pub reconstr_b: Tensor<B, 4>,
    pub img_a_id:   Tensor<B, 4>,
    pub img_b_id:   Tensor<B, 4>,
}

impl<B: Backend> CycleGenerators<B> {
    pub fn new(g_ab: UnetGenerator<B>, g_ba: UnetGenerator<B>) -> Self {
        Self { g_ab, g_ba }
    }

    /// Translate images that belong to `from` into the opposite domain
    pub fn translate(&self, from: Domain, x: Tensor<B, 4>) -> Tensor<B, 4> {
        match from {
            Domain::A => self.g_ab.forward(x),
            Domain::B => self.g_ba.forward(x),
        }
    }

    pub fn forward_combined(
        &self,
        img_a: Tensor<B, 4>,
        img_b: Tensor<B, 4>,
        d_a:   &PatchDiscriminator<B>,
        d_b:   &PatchDiscriminator<B>,
    ) -> CombinedOutput<B> {
        let fake_b = self.g_ab.forward(img_a.clone());
        let fake_a = self.g_ba.forward(img_b.clone());

        let reconstr_a = self.g_ba.forward(fake_b.clone());
        let reconstr_b = self.g_ab.forward(fake_a.clone());

        // a generator fed an image already in its target domain should leave it alone
        let img_a_id = self.g_ba.forward(img_a);
        let img_b_id = self.g_ab.forward(img_b);

        let valid_a = d_a.forward(fake_a.clone());
        let valid_b = d_b.forward(fake_b.clone());

        CombinedOutput {
            fake_a, fake_b,
            valid_a, valid_b,
            reconstr_a, reconstr_b,
            img_a_id, img_b_id,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn tiny() -> CycleGanConfig {
        CycleGanConfig::new(16, 32, 3).with_gf(2).with_df(2)
    }

    #[test]
    fn test_disc_patch() {
        assert_eq!(CycleGanConfig::new(128, 128, 3).disc_patch(), (8, 8));
        assert_eq!(tiny().disc_patch(), (1, 2));
    }

    #[test]
    fn test_combined_output_shapes() {
        let device = Default::default();
        let cfg = tiny();
        let gens = cfg.init_generators::<TestBackend>(&device);
        let d_a  = cfg.init_discriminator::<TestBackend>(&device);
        let d_b  = cfg.init_discriminator::<TestBackend>(&device);

        let a = Tensor::<TestBackend, 4>::zeros([2, 3, 16, 32], &device);
        let b = Tensor::<TestBackend, 4>::ones([2, 3, 16, 32], &device);
        let out = gens.forward_combined(a, b, &d_a, &d_b);

        assert_eq!(out.valid_a.dims(), [2, 1, 1, 2]);
        assert_eq!(out.valid_b.dims(), [2, 1, 1, 2]);
        for t in [out.reconstr_a, out.reconstr_b, out.img_a_id, out.img_b_id, out.fake_a, out.fake_b] {
            assert_eq!(t.dims(), [2, 3, 16, 32]);
        }
    }

    #[test]
    fn test_translate_picks_generator() {
        let device = Default::default();
        let gens = tiny().init_generators::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 4>::ones([1, 3, 16, 32], &device);

        let via_a: Vec<f32> = gens.translate(Domain::A, x.clone()).into_data().to_vec().unwrap();
        let ab:    Vec<f32> = gens.g_ab.forward(x).into_data().to_vec().unwrap();
        assert_eq!(via_a, ab);
    }
}
