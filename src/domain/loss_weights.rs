// ============================================================
// Layer 3: Loss Weights and Loss Reports
// ============================================================
// The combined generator objective has six outputs, each with
// its own loss function and weight:
//
//   output       loss  weight
//   ──────────── ───── ───────────
//   valid_A      mse   1
//   valid_B      mse   1
//   reconstr_A   mae   lambda_cycle
//   reconstr_B   mae   lambda_cycle
//   img_A_id     mae   lambda_id
//   img_B_id     mae   lambda_id
//
// The adversarial terms push translated images towards what
// the discriminators call "real", the cycle terms require
// A → B → A to come back unchanged, and the identity terms
// keep a generator from recolouring images that are already
// in its target domain.
//
// Reference: Zhu et al. (2017) §3.2 (cycle consistency), §5.2 (identity loss)

use serde::{Deserialize, Serialize};

/// Which error a combined output is scored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossKind {
    /// Mean squared error (least-squares GAN objective)
    Mse,
    /// Mean absolute error
    Mae,
}

impl LossKind {
    pub fn name(self) -> &'static str {
        match self {
            LossKind::Mse => "mse",
            LossKind::Mae => "mae",
        }
    }
}

/// Names of the combined model's outputs, in order.
pub const COMBINED_OUTPUTS: [&str; 6] = [
    "valid_A", "valid_B", "reconstr_A", "reconstr_B", "img_A_id", "img_B_id",
];

/// Loss functions of the combined model's outputs, in order.
pub const COMBINED_LOSSES: [LossKind; 6] = [
    LossKind::Mse, LossKind::Mse,
    LossKind::Mae, LossKind::Mae,
    LossKind::Mae, LossKind::Mae,
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossWeights {
    pub adversarial: f64,
    pub cycle:       f64,
    pub identity:    f64,
}

impl LossWeights {
    pub fn new(lambda_cycle: f64, lambda_id: f64) -> Self {
        Self { adversarial: 1.0, cycle: lambda_cycle, identity: lambda_id }
    }

    /// Identity weight defaults to a tenth of the cycle weight
    pub fn from_cycle(lambda_cycle: f64) -> Self {
        Self::new(lambda_cycle, 0.1 * lambda_cycle)
    }

    /// Per-output weights aligned with [`COMBINED_OUTPUTS`]
    pub fn per_output(&self) -> [f64; 6] {
        [
            self.adversarial, self.adversarial,
            self.cycle,       self.cycle,
            self.identity,    self.identity,
        ]
    }
}

/// Scalar view of one combined-model step, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorReport {
    /// Weighted total loss the generators were optimised on
    pub total: f64,
    /// Unweighted per-output losses, aligned with [`COMBINED_OUTPUTS`]
    pub terms: [f64; 6],
}

impl GeneratorReport {
    /// Mean of the two adversarial terms
    pub fn adversarial(&self) -> f64 {
        (self.terms[0] + self.terms[1]) / 2.0
    }

    /// Mean of the two cycle-reconstruction terms
    pub fn reconstruction(&self) -> f64 {
        (self.terms[2] + self.terms[3]) / 2.0
    }

    /// Mean of the two identity terms
    pub fn identity(&self) -> f64 {
        (self.terms[4] + self.terms[5]) / 2.0
    }

    /// The img_A_id term alone, as shown on the progress line
    pub fn identity_a(&self) -> f64 {
        self.terms[4]
    }

    pub fn is_finite(&self) -> bool {
        self.total.is_finite() && self.terms.iter().all(|t| t.is_finite())
    }
}

/// Loss and accuracy of one discriminator update (or an average of several).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DiscriminatorReport {
    pub loss:     f64,
    pub accuracy: f64,
}

impl DiscriminatorReport {
    pub fn new(loss: f64, accuracy: f64) -> Self {
        Self { loss, accuracy }
    }

    /// Element-wise 0.5 * (a + b)
    pub fn average(a: Self, b: Self) -> Self {
        Self {
            loss:     0.5 * (a.loss + b.loss),
            accuracy: 0.5 * (a.accuracy + b.accuracy),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identity_weight() {
        let w = LossWeights::from_cycle(10.0);
        assert_eq!(w.per_output(), [1.0, 1.0, 10.0, 10.0, 1.0, 1.0]);
    }

    #[test]
    fn test_report_means() {
        let r = GeneratorReport { total: 1.0, terms: [1.0, 3.0, 0.2, 0.4, 0.5, 1.5] };
        assert_eq!(r.adversarial(), 2.0);
        assert!((r.reconstruction() - 0.3).abs() < 1e-9);
        assert_eq!(r.identity(), 1.0);
        assert_eq!(r.identity_a(), 0.5);
        assert!(r.is_finite());
    }

    #[test]
    fn test_discriminator_average() {
        let real = DiscriminatorReport::new(0.2, 1.0);
        let fake = DiscriminatorReport::new(0.4, 0.5);
        let avg  = DiscriminatorReport::average(real, fake);
        assert!((avg.loss - 0.3).abs() < 1e-9);
        assert_eq!(avg.accuracy, 0.75);
    }

    #[test]
    fn test_outputs_and_losses_align() {
        assert_eq!(COMBINED_OUTPUTS.len(), COMBINED_LOSSES.len());
        assert_eq!(COMBINED_LOSSES[0].name(), "mse");
        assert_eq!(COMBINED_LOSSES[5].name(), "mae");
    }
}
