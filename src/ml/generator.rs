// ============================================================
// Layer 5: U-Net Generator
// ============================================================
// Translates an image of one domain into the other domain.
// Shapes for a 128×128×3 input with gf = 32:
//
//   input         [N,   3, 128, 128]
//   down1  conv   [N,  32,  64,  64] ─────────────────────┐
//   down2  conv   [N,  64,  32,  32] ───────────────┐     │
//   down3  conv   [N, 128,  16,  16] ─────────┐     │     │
//   down4  conv   [N, 256,   8,   8]          │     │     │
//   up1    ×2     [N, 128+128, 16, 16] ◄──────┘     │     │
//   up2    ×2     [N,  64+64,  32, 32] ◄────────────┘     │
//   up3    ×2     [N,  32+32,  64, 64] ◄──────────────────┘
//   output ×2     [N,   3, 128, 128]  tanh
//
// Down block: 4×4 conv stride 2 → LeakyReLU(0.2) → SampleNorm
// Up block:   nearest ×2 → 4×4 conv stride 1 → ReLU
//             → Dropout (optional) → SampleNorm → concat skip
//
// The skip connections carry fine detail straight across so
// the bottleneck only has to learn what changes between the
// two domains.
//
// Reference: Ronneberger et al. (2015) U-Net
//            Ulyanov et al. (2016) Instance Normalization

use burn::{
    nn::{
        interpolate::{Interpolate2d, Interpolate2dConfig, InterpolateMode},
        Dropout, DropoutConfig,
        LeakyRelu, LeakyReluConfig,
    },
    prelude::*,
    tensor::activation::{relu, tanh},
};

use crate::ml::layers::{SameConv2d, SampleNorm};

const KERNEL: usize = 4;

#[derive(Config, Debug)]
pub struct UnetGeneratorConfig {
    /// Image channels in and out
    pub channels: usize,
    /// Filters of the first down block (gf)
    #[config(default = 32)]
    pub filters:  usize,
    /// Dropout rate of the up blocks; 0 disables dropout
    #[config(default = 0.0)]
    pub dropout:  f64,
}

impl UnetGeneratorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> UnetGenerator<B> {
        let f = self.filters;

        let down1 = DownBlock::new([self.channels, f], device);
        let down2 = DownBlock::new([f, 2 * f], device);
        let down3 = DownBlock::new([2 * f, 4 * f], device);
        let down4 = DownBlock::new([4 * f, 8 * f], device);

        // input channels of each up block include the previous skip
        let up1 = UpBlock::new([8 * f, 4 * f], self.dropout, device);
        let up2 = UpBlock::new([8 * f, 2 * f], self.dropout, device);
        let up3 = UpBlock::new([4 * f, f], self.dropout, device);

        UnetGenerator {
            down1, down2, down3, down4,
            up1, up2, up3,
            out_upsample: upsample(),
            out_conv:     SameConv2d::new([2 * f, self.channels], KERNEL, 1, device),
        }
    }
}

fn upsample() -> Interpolate2d {
    Interpolate2dConfig::new()
        .with_scale_factor(Some([2.0, 2.0]))
        .with_mode(InterpolateMode::Nearest)
        .init()
}

#[derive(Module, Debug)]
pub struct DownBlock<B: Backend> {
    conv: SameConv2d<B>,
    act:  LeakyRelu,
    norm: SampleNorm<B>,
}

impl<B: Backend> DownBlock<B> {
    fn new(channels: [usize; 2], device: &B::Device) -> Self {
        Self {
            conv: SameConv2d::new(channels, KERNEL, 2, device),
            act:  LeakyReluConfig::new().with_negative_slope(0.2).init(),
            norm: SampleNorm::new(channels[1], device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.norm.forward(self.act.forward(self.conv.forward(x)))
    }
}

#[derive(Module, Debug)]
pub struct UpBlock<B: Backend> {
    upsample: Interpolate2d,
    conv:     SameConv2d<B>,
    dropout:  Option<Dropout>,
    norm:     SampleNorm<B>,
}

impl<B: Backend> UpBlock<B> {
    fn new(channels: [usize; 2], dropout: f64, device: &B::Device) -> Self {
        Self {
            upsample: upsample(),
            conv:     SameConv2d::new(channels, KERNEL, 1, device),
            dropout:  (dropout > 0.0).then(|| DropoutConfig::new(dropout).init()),
            norm:     SampleNorm::new(channels[1], device),
        }
    }

    /// Upsample `x`, then concatenate `skip` along the channel axis
    pub fn forward(&self, x: Tensor<B, 4>, skip: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = relu(self.conv.forward(self.upsample.forward(x)));
        let x = match &self.dropout {
            Some(dropout) => dropout.forward(x),
            None => x,
        };
        Tensor::cat(vec![self.norm.forward(x), skip], 1)
    }
}

#[derive(Module, Debug)]
pub struct UnetGenerator<B: Backend> {
    down1: DownBlock<B>,
    down2: DownBlock<B>,
    down3: DownBlock<B>,
    down4: DownBlock<B>,
    up1:   UpBlock<B>,
    up2:   UpBlock<B>,
    up3:   UpBlock<B>,
    out_upsample: Interpolate2d,
    out_conv:     SameConv2d<B>,
}

impl<B: Backend> UnetGenerator<B> {
    /// [N, C, H, W] in [-1, 1] → [N, C, H, W] in (-1, 1)
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let d1 = self.down1.forward(x);
        let d2 = self.down2.forward(d1.clone());
        let d3 = self.down3.forward(d2.clone());
        let d4 = self.down4.forward(d3.clone());

        let u1 = self.up1.forward(d4, d3);
        let u2 = self.up2.forward(u1, d2);
        let u3 = self.up3.forward(u2, d1);

        tanh(self.out_conv.forward(self.out_upsample.forward(u3)))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_output_matches_input_shape() {
        let device = Default::default();
        let g = UnetGeneratorConfig::new(3).with_filters(4).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 4>::random(
            [2, 3, 32, 32],
            burn::tensor::Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        assert_eq!(g.forward(x).dims(), [2, 3, 32, 32]);
    }

    #[test]
    fn test_output_in_tanh_range() {
        let device = Default::default();
        let g = UnetGeneratorConfig::new(1)
            .with_filters(2)
            .with_dropout(0.5)
            .init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 4>::ones([1, 1, 16, 16], &device);

        let y = g.forward(x);
        let max: f32 = y.clone().abs().max().into_scalar();
        assert_eq!(y.dims(), [1, 1, 16, 16]);
        assert!(max <= 1.0);
    }

    #[test]
    fn test_default_filters() {
        let cfg = UnetGeneratorConfig::new(3);
        assert_eq!(cfg.filters, 32);
        assert_eq!(cfg.dropout, 0.0);
    }

    #[test]
    fn test_param_count_matches_summary() {
        use crate::domain::architecture::generator_summary;

        let device = Default::default();
        let g = UnetGeneratorConfig::new(3).with_filters(4).init::<TestBackend>(&device);
        let spec = crate::domain::architecture::ArchitectureSpec {
            img_rows: 32, img_cols: 32, channels: 3, gf: 4, df: 4, dropout: 0.0,
        };
        assert_eq!(g.num_params(), generator_summary(&spec, "g_AB").total_params());
    }
}
