// ============================================================
// Layer 5: PatchGAN Discriminator
// ============================================================
// Scores overlapping patches of an image as real (1) or
// translated (0) instead of the whole image at once.
//
//   input   [N, C, H, W]
//   d1      [N,  df, H/2,  W/2]   no normalisation
//   d2      [N, 2df, H/4,  W/4]
//   d3      [N, 4df, H/8,  W/8]
//   d4      [N, 8df, H/16, W/16]
//   output  [N,   1, H/16, W/16]  4×4 conv stride 1, no activation
//
// Each block: 4×4 conv stride 2 → LeakyReLU(0.2) → SampleNorm.
// The raw scores are trained with mean squared error against
// all-ones (real) or all-zeros (fake) patch targets.
//
// Reference: Isola et al. (2017) §3.2.2 Markovian discriminator

use burn::{
    nn::{LeakyRelu, LeakyReluConfig},
    prelude::*,
};

use crate::ml::layers::{SameConv2d, SampleNorm};

const KERNEL: usize = 4;

#[derive(Config, Debug)]
pub struct PatchDiscriminatorConfig {
    pub channels: usize,
    /// Filters of the first block (df)
    #[config(default = 64)]
    pub filters:  usize,
}

impl PatchDiscriminatorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> PatchDiscriminator<B> {
        let f = self.filters;
        PatchDiscriminator {
            d1: DiscBlock::new([self.channels, f], false, device),
            d2: DiscBlock::new([f, 2 * f], true, device),
            d3: DiscBlock::new([2 * f, 4 * f], true, device),
            d4: DiscBlock::new([4 * f, 8 * f], true, device),
            validity: SameConv2d::new([8 * f, 1], KERNEL, 1, device),
        }
    }
}

#[derive(Module, Debug)]
pub struct DiscBlock<B: Backend> {
    conv: SameConv2d<B>,
    act:  LeakyRelu,
    norm: Option<SampleNorm<B>>,
}

impl<B: Backend> DiscBlock<B> {
    fn new(channels: [usize; 2], normalize: bool, device: &B::Device) -> Self {
        Self {
            conv: SameConv2d::new(channels, KERNEL, 2, device),
            act:  LeakyReluConfig::new().with_negative_slope(0.2).init(),
            norm: normalize.then(|| SampleNorm::new(channels[1], device)),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.act.forward(self.conv.forward(x));
        match &self.norm {
            Some(norm) => norm.forward(x),
            None => x,
        }
    }
}

#[derive(Module, Debug)]
pub struct PatchDiscriminator<B: Backend> {
    d1: DiscBlock<B>,
    d2: DiscBlock<B>,
    d3: DiscBlock<B>,
    d4: DiscBlock<B>,
    validity: SameConv2d<B>,
}

impl<B: Backend> PatchDiscriminator<B> {
    /// [N, C, H, W] → [N, 1, H/16, W/16] patch scores
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.d1.forward(x);
        let x = self.d2.forward(x);
        let x = self.d3.forward(x);
        let x = self.d4.forward(x);
        self.validity.forward(x)
    }
}
