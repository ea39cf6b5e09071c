// ============================================================
// Layer 5: Shared Building Blocks
// ============================================================
// Every convolution in both networks uses a 4×4 kernel with
// "same" padding: the output is ceil(input / stride) pixels
// wide, whatever the kernel size.
//
// With an even kernel the padding cannot be split evenly, so
// the extra row/column goes on the bottom/right:
//
//   out   = ceil(n / s)
//   total = max((out - 1) * s + k - n, 0)
//   before = total / 2, after = total - before
//
// Burn's PaddingConfig2d::Same only handles odd kernels, so
// SameConv2d pads the input explicitly and then runs a Valid
// convolution.
//
// SampleNorm is the instance normalisation both networks use:
// one mean and one deviation per sample, taken over all of
// C × H × W, then a single learned scale and shift:
//
//   y = gamma * (x - mean) / (std + eps) + beta
//
// Statistics spanning the channels stay meaningful even when
// the deepest feature maps shrink to 1×1.
//
// Reference: Burn Book §3 (Building Blocks)

use burn::{
    module::Param,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        GroupNorm, GroupNormConfig, Initializer, PaddingConfig2d,
    },
    prelude::*,
};

/// Added to the standard deviation before dividing
pub const NORM_EPSILON: f64 = 1e-3;

/// (before, after) padding along one axis
pub fn same_padding(size: usize, kernel: usize, stride: usize) -> (usize, usize) {
    let out   = size.div_ceil(stride);
    let total = ((out - 1) * stride + kernel).saturating_sub(size);
    (total / 2, total - total / 2)
}

#[derive(Module, Debug)]
pub struct SameConv2d<B: Backend> {
    conv:   Conv2d<B>,
    kernel: usize,
    stride: usize,
}

impl<B: Backend> SameConv2d<B> {
    pub fn new(channels: [usize; 2], kernel: usize, stride: usize, device: &B::Device) -> Self {
        let conv = Conv2dConfig::new(channels, [kernel, kernel])
            .with_stride([stride, stride])
            .with_padding(PaddingConfig2d::Valid)
            .init(device);
        Self { conv, kernel, stride }
    }

    /// [N, C_in, H, W] → [N, C_out, ceil(H / s), ceil(W / s)]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [_, _, h, w] = x.dims();
        let (top, bottom) = same_padding(h, self.kernel, self.stride);
        let (left, right) = same_padding(w, self.kernel, self.stride);

        let x = if top + bottom + left + right > 0 {
            x.pad((left, right, top, bottom), 0.0f32)
        } else {
            x
        };
        self.conv.forward(x)
    }
}

/// Per-sample normalisation over every channel and pixel, with a scalar affine.
#[derive(Module, Debug)]
pub struct SampleNorm<B: Backend> {
    norm:  GroupNorm<B>,
    gamma: Param<Tensor<B, 1>>,
    beta:  Param<Tensor<B, 1>>,
}

impl<B: Backend> SampleNorm<B> {
    pub fn new(channels: usize, device: &B::Device) -> Self {
        // a single group: statistics over (C, H, W)
        let norm = GroupNormConfig::new(1, channels)
            .with_epsilon(NORM_EPSILON)
            .with_affine(false)
            .init(device);
        Self {
            norm,
            gamma: Initializer::Ones.init([1], device),
            beta:  Initializer::Zeros.init([1], device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let gamma = self.gamma.val().reshape([1, 1, 1, 1]);
        let beta  = self.beta.val().reshape([1, 1, 1, 1]);
        self.norm.forward(x).mul(gamma).add(beta)
    }
}
