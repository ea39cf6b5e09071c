// ============================================================
// Layer 5: Losses and Metrics
// ============================================================
// Discriminators: least-squares GAN loss
//   MSE(D(x), 1) for real images, MSE(D(G(x)), 0) for fakes
//
// Generators (combined step), six weighted terms:
//   MSE(d_A(fake_A), 1), MSE(d_B(fake_B), 1)      adversarial
//   MAE(reconstr_A, A),  MAE(reconstr_B, B)       cycle
//   MAE(g_BA(A), A),     MAE(g_AB(B), B)          identity
//
// Patch accuracy: a patch counts as correct when prediction and
// target fall on the same side of 0.5.
//
// Reference: Mao et al. (2017) Least Squares GAN

use burn::{
    nn::loss::{MseLoss, Reduction},
    prelude::*,
};

use crate::domain::loss_weights::{GeneratorReport, LossWeights};
use crate::ml::model::CombinedOutput;

pub fn mse<B: Backend, const D: usize>(pred: Tensor<B, D>, target: Tensor<B, D>) -> Tensor<B, 1> {
    MseLoss::new().forward(pred, target, Reduction::Mean)
}

pub fn mae<B: Backend, const D: usize>(pred: Tensor<B, D>, target: Tensor<B, D>) -> Tensor<B, 1> {
    (pred - target).abs().mean()
}

/// Fraction of patches classified on the correct side of 0.5
pub fn patch_accuracy<B: Backend>(pred: Tensor<B, 4>, target: Tensor<B, 4>) -> f64 {
    let total = pred.shape().num_elements();
    if total == 0 {
        return 0.0;
    }
    let correct: i64 = pred
        .greater_elem(0.5)
        .equal(target.greater_elem(0.5))
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();
    correct as f64 / total as f64
}

/// Read a single-element loss tensor back to the host
pub fn scalar<B: Backend>(t: Tensor<B, 1>) -> f64 {
    t.into_scalar().elem::<f64>()
}

/// The combined-model objective for one batch.
pub struct CycleLosses<B: Backend> {
    /// Weighted sum; the generators are optimised on this
    pub total: Tensor<B, 1>,
    /// Unweighted terms in combined-output order
    pub terms: [Tensor<B, 1>; 6],
}

impl<B: Backend> CycleLosses<B> {
    pub fn compute(
        out:     CombinedOutput<B>,
        img_a:   Tensor<B, 4>,
        img_b:   Tensor<B, 4>,
        valid:   Tensor<B, 4>,
        weights: &LossWeights,
    ) -> Self {
        let terms = [
            mse(out.valid_a, valid.clone()),
            mse(out.valid_b, valid),
            mae(out.reconstr_a, img_a.clone()),
            mae(out.reconstr_b, img_b.clone()),
            mae(out.img_a_id, img_a),
            mae(out.img_b_id, img_b),
        ];

        let total = terms
            .iter()
            .zip(weights.per_output())
            .map(|(term, w)| term.clone().mul_scalar(w))
            .reduce(|acc, t| acc + t)
            .unwrap_or_else(|| terms[0].zeros_like());

        Self { total, terms }
    }

    pub fn report(&self) -> GeneratorReport {
        GeneratorReport {
            total: scalar(self.total.clone()),
            terms: self.terms.clone().map(scalar),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn filled(value: f32, device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 4> {
        Tensor::full([1, 1, 2, 2], value, device)
    }

    #[test]
    fn test_mse_and_mae() {
        let device = Default::default();
        let p = filled(0.5, &device);
        let t = filled(1.0, &device);
        assert!((scalar(mse(p.clone(), t.clone())) - 0.25).abs() < 1e-6);
        assert!((scalar(mae(p, t)) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_patch_accuracy_threshold() {
        let device = Default::default();
        let pred = Tensor::<TestBackend, 4>::from_floats([[[[0.9, 0.1], [0.6, 0.4]]]], &device);
        let ones = filled(1.0, &device);
        assert_eq!(patch_accuracy(pred.clone(), ones), 0.5);

        let zeros = filled(0.0, &device);
        assert_eq!(patch_accuracy(pred, zeros), 0.5);
    }

    #[test]
    fn test_weights_applied_per_output() {
        let device = Default::default();
        let img = filled(0.0, &device);
        let out = CombinedOutput {
            fake_a:     img.clone(),
            fake_b:     img.clone(),
            valid_a:    filled(0.0, &device), // mse vs 1 → 1.0
            valid_b:    filled(1.0, &device), // → 0.0
            reconstr_a: filled(0.1, &device), // mae → 0.1
            reconstr_b: filled(0.2, &device), // → 0.2
            img_a_id:   filled(0.5, &device), // → 0.5
            img_b_id:   filled(-0.5, &device), // → 0.5
        };
        let losses = CycleLosses::compute(
            out, img.clone(), img, filled(1.0, &device), &LossWeights::new(10.0, 2.0),
        );
        let report = losses.report();

        // 1 + 0 + 10 * (0.1 + 0.2) + 2 * (0.5 + 0.5)
        assert!((report.total - 6.0).abs() < 1e-4);
        assert!((report.reconstruction() - 0.15).abs() < 1e-6);
        assert!(report.is_finite());
    }
}
