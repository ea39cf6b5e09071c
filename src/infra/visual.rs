// ============================================================
// Layer 6: Network Diagrams
// ============================================================
// Writes a plain-text summary of every network into visual/:
//
//   visual/d_A.txt   visual/d_B.txt
//   visual/g_AB.txt  visual/g_BA.txt
//   visual/combined.txt
//
// Written once at startup, before the first epoch.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::{
    architecture::{combined_summary, discriminator_summary, generator_summary, ArchitectureSpec},
    loss_weights::LossWeights,
};

pub fn write_network_summaries(
    dir:     impl AsRef<Path>,
    spec:    &ArchitectureSpec,
    weights: &LossWeights,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create diagram directory '{}'", dir.display()))?;

    let files = [
        ("d_A",      discriminator_summary(spec, "d_A").render()),
        ("d_B",      discriminator_summary(spec, "d_B").render()),
        ("g_AB",     generator_summary(spec, "g_AB").render()),
        ("g_BA",     generator_summary(spec, "g_BA").render()),
        ("combined", combined_summary(spec, weights)),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, text) in files {
        let path = dir.join(format!("{name}.txt"));
        fs::write(&path, text)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        written.push(path);
    }

    tracing::info!("Network summaries written to '{}'", dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_five_summaries() {
        let tmp  = tempfile::tempdir().unwrap();
        let spec = ArchitectureSpec { img_rows: 32, img_cols: 32, channels: 3, gf: 4, df: 4, dropout: 0.0 };
        let out  = write_network_summaries(tmp.path().join("visual"), &spec, &LossWeights::from_cycle(10.0))
            .unwrap();

        assert_eq!(out.len(), 5);
        let g = fs::read_to_string(tmp.path().join("visual/g_BA.txt")).unwrap();
        assert!(g.starts_with("Model: g_BA"));
        let combined = fs::read_to_string(tmp.path().join("visual/combined.txt")).unwrap();
        assert!(combined.contains("reconstr_B"));
    }
}
