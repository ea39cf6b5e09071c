// ============================================================
// Layer 6: Metrics Logger
// ============================================================
// Records one CSV row per training batch and formats the
// progress line printed to the console.
//
// Output file: checkpoints/metrics.csv
//
// Example CSV output:
//   epoch,batch,d_loss,d_acc,g_loss,adv,recon,id_a,id_mean,elapsed_secs
//   0,0,0.912301,0.421875,9.877012,1.003412,0.736551,0.790114,0.781190,1.204
//   0,1,0.502118,0.546875,8.120331,0.744021,0.612340,0.633406,0.640021,1.577
//
// The console line shows `id` as the img_A_id term only (id_a);
// id_mean averages both identity terms.
//
// How to read the metrics:
//   - d_loss near 0.25 and d_acc near 50%: the discriminators
//     can no longer tell real from translated patches
//   - recon and id should fall steadily; if adv keeps rising
//     while d_loss collapses, the discriminators are winning
//
// The file is appended to, so a resumed run continues the log.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::domain::loss_weights::{DiscriminatorReport, GeneratorReport};

const HEADER: &str = "epoch,batch,d_loss,d_acc,g_loss,adv,recon,id_a,id_mean,elapsed_secs";

/// One row of metrics for a single training batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMetrics {
    pub epoch:  usize,
    pub batch:  usize,
    /// Mean of both discriminators' real/fake losses
    pub d_loss: f64,
    /// Patch accuracy, in [0.0, 1.0]
    pub d_acc:  f64,
    /// Weighted generator objective
    pub g_loss: f64,
    pub adv:    f64,
    pub recon:  f64,
    /// img_A_id term
    pub id_a:    f64,
    /// Mean of both identity terms
    pub id_mean: f64,
    /// Wall-clock time since training started
    pub elapsed_secs: f64,
}

impl BatchMetrics {
    pub fn new(
        epoch:   usize,
        batch:   usize,
        d:       &DiscriminatorReport,
        g:       &GeneratorReport,
        elapsed: Duration,
    ) -> Self {
        Self {
            epoch,
            batch,
            d_loss: d.loss,
            d_acc:  d.accuracy,
            g_loss: g.total,
            adv:    g.adversarial(),
            recon:  g.reconstruction(),
            id_a:    g.identity_a(),
            id_mean: g.identity(),
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    /// Console progress line for this batch
    pub fn progress_line(&self, epochs: usize, n_batches: usize) -> String {
        format!(
            "[Epoch {}/{}] [Batch {}/{}] [D loss: {:.6}, acc: {:3}%] \
             [G loss: {:.6}, adv: {:.6}, recon: {:.6}, id: {:.6}] time: {}",
            self.epoch, epochs,
            self.batch, n_batches,
            self.d_loss, (100.0 * self.d_acc) as i64,
            self.g_loss, self.adv, self.recon, self.id_a,
            format_elapsed(Duration::from_secs_f64(self.elapsed_secs)),
        )
    }
}

/// H:MM:SS.ffffff
pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    format!(
        "{}:{:02}:{:02}.{:06}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        d.subsec_micros()
    )
}

/// Appends batch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &BatchMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.3}",
            m.epoch, m.batch,
            m.d_loss, m.d_acc,
            m.g_loss, m.adv, m.recon, m.id_a, m.id_mean,
            m.elapsed_secs,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
