// ============================================================
// Layer 3: Network Architecture Summaries
// ============================================================
// Describes the four networks layer by layer (name, kind,
// output shape, parameter count) without touching Burn.
// The infra layer renders these summaries into visual/ so a
// run leaves behind a readable picture of what was trained.
//
// Shapes are written (height, width, channels), the way the
// networks are usually drawn, even though the tensors
// themselves are channel-first.

use std::fmt::Write as _;

use crate::domain::loss_weights::{LossWeights, COMBINED_LOSSES, COMBINED_OUTPUTS};

/// Hyperparameters that decide the shape of every layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchitectureSpec {
    pub img_rows: usize,
    pub img_cols: usize,
    pub channels: usize,
    /// Filters in the first generator layer
    pub gf:       usize,
    /// Filters in the first discriminator layer
    pub df:       usize,
    /// Dropout rate in the generator's up-sampling blocks
    pub dropout:  f64,
}

impl ArchitectureSpec {
    /// Side length of the discriminator's patch output (4 stride-2 convolutions)
    pub fn disc_patch(&self) -> (usize, usize) {
        (self.img_rows / 16, self.img_cols / 16)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerSummary {
    pub name:         String,
    pub kind:         &'static str,
    pub output_shape: (usize, usize, usize),
    pub params:       usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSummary {
    pub name:   String,
    pub layers: Vec<LayerSummary>,
}

impl NetworkSummary {
    pub fn total_params(&self) -> usize {
        self.layers.iter().map(|l| l.params).sum()
    }

    pub fn output_shape(&self) -> (usize, usize, usize) {
        self.layers.last().map(|l| l.output_shape).unwrap_or((0, 0, 0))
    }

    /// Plain-text table, one layer per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Model: {}", self.name);
        let _ = writeln!(out, "{:<24} {:<16} {:<20} {:>12}", "Layer", "Type", "Output shape", "Params");
        let _ = writeln!(out, "{}", "=".repeat(75));
        for l in &self.layers {
            let (h, w, c) = l.output_shape;
            let _ = writeln!(
                out,
                "{:<24} {:<16} {:<20} {:>12}",
                l.name, l.kind, format!("({h}, {w}, {c})"), l.params
            );
        }
        let _ = writeln!(out, "{}", "=".repeat(75));
        let (h, w, c) = self.output_shape();
        let _ = writeln!(out, "Output shape: ({h}, {w}, {c})");
        let _ = writeln!(out, "Total params: {}", self.total_params());
        out
    }
}

// ─── Builder ──────────────────────────────────────────────────────────────────
// Tracks the running shape while layers are appended.
struct Builder {
    layers: Vec<LayerSummary>,
    shape:  (usize, usize, usize),
}

impl Builder {
    fn new(rows: usize, cols: usize, channels: usize) -> Self {
        let mut b = Self { layers: Vec::new(), shape: (rows, cols, channels) };
        b.push("input", "InputLayer", 0);
        b
    }

    fn push(&mut self, name: impl Into<String>, kind: &'static str, params: usize) {
        self.layers.push(LayerSummary {
            name: name.into(),
            kind,
            output_shape: self.shape,
            params,
        });
    }

    /// 'same' padded convolution: spatial size becomes ceil(n / stride)
    fn conv(&mut self, name: String, filters: usize, kernel: usize, stride: usize) {
        let (h, w, c) = self.shape;
        self.shape = (h.div_ceil(stride), w.div_ceil(stride), filters);
        self.push(name, "Conv2D", kernel * kernel * c * filters + filters);
    }

    fn activation(&mut self, name: String, kind: &'static str) {
        self.push(name, kind, 0);
    }

    fn instance_norm(&mut self, name: String) {
        // one scale and one shift for the whole sample
        self.push(name, "InstanceNorm", 2);
    }

    fn upsample(&mut self, name: String) {
        let (h, w, c) = self.shape;
        self.shape = (h * 2, w * 2, c);
        self.push(name, "UpSampling2D", 0);
    }

    fn concat(&mut self, name: String, skip_channels: usize) {
        let (h, w, c) = self.shape;
        self.shape = (h, w, c + skip_channels);
        self.push(name, "Concatenate", 0);
    }

    fn finish(self, name: &str) -> NetworkSummary {
        NetworkSummary { name: name.to_string(), layers: self.layers }
    }
}

/// U-Net generator: 4 down blocks, 3 up blocks with skips, output block
pub fn generator_summary(spec: &ArchitectureSpec, name: &str) -> NetworkSummary {
    let mut b = Builder::new(spec.img_rows, spec.img_cols, spec.channels);
    let down_filters = [spec.gf, spec.gf * 2, spec.gf * 4, spec.gf * 8];
    for (i, &f) in down_filters.iter().enumerate() {
        let n = i + 1;
        b.conv(format!("down{n}_conv"), f, 4, 2);
        b.activation(format!("down{n}_leaky_relu"), "LeakyReLU");
        b.instance_norm(format!("down{n}_norm"));
    }

    // up blocks concatenate the mirrored down feature maps: d3, d2, d1
    let up_filters = [spec.gf * 4, spec.gf * 2, spec.gf];
    let skips      = [down_filters[2], down_filters[1], down_filters[0]];
    for (i, (&f, &skip)) in up_filters.iter().zip(skips.iter()).enumerate() {
        let n = i + 1;
        b.upsample(format!("up{n}_upsample"));
        b.conv(format!("up{n}_conv"), f, 4, 1);
        b.activation(format!("up{n}_relu"), "ReLU");
        if spec.dropout > 0.0 {
            b.activation(format!("up{n}_dropout"), "Dropout");
        }
        b.instance_norm(format!("up{n}_norm"));
        b.concat(format!("up{n}_concat"), skip);
    }

    b.upsample("out_upsample".to_string());
    b.conv("out_conv".to_string(), spec.channels, 4, 1);
    b.activation("out_tanh".to_string(), "Tanh");
    b.finish(name)
}

/// PatchGAN discriminator: 4 down blocks then a 1-filter validity map
pub fn discriminator_summary(spec: &ArchitectureSpec, name: &str) -> NetworkSummary {
    let mut b = Builder::new(spec.img_rows, spec.img_cols, spec.channels);
    let filters = [spec.df, spec.df * 2, spec.df * 4, spec.df * 8];
    for (i, &f) in filters.iter().enumerate() {
        let n = i + 1;
        b.conv(format!("d{n}_conv"), f, 4, 2);
        b.activation(format!("d{n}_leaky_relu"), "LeakyReLU");
        if i > 0 {
            b.instance_norm(format!("d{n}_norm"));
        }
    }
    b.conv("validity".to_string(), 1, 4, 1);
    b.finish(name)
}

/// Text description of the combined generator graph and its objective
pub fn combined_summary(spec: &ArchitectureSpec, weights: &LossWeights) -> String {
    let g = generator_summary(spec, "generator");
    let d = discriminator_summary(spec, "discriminator");
    let (rows, cols, ch) = (spec.img_rows, spec.img_cols, spec.channels);
    let (ph, pw) = spec.disc_patch();

    let wiring = [
        ("valid_A",    "d_A(g_BA(img_B))",  (ph, pw, 1)),
        ("valid_B",    "d_B(g_AB(img_A))",  (ph, pw, 1)),
        ("reconstr_A", "g_BA(g_AB(img_A))", (rows, cols, ch)),
        ("reconstr_B", "g_AB(g_BA(img_B))", (rows, cols, ch)),
        ("img_A_id",   "g_BA(img_A)",       (rows, cols, ch)),
        ("img_B_id",   "g_AB(img_B)",       (rows, cols, ch)),
    ];

    let mut out = String::new();
    let _ = writeln!(out, "Model: combined");
    let _ = writeln!(out, "Inputs: img_A ({rows}, {cols}, {ch}), img_B ({rows}, {cols}, {ch})");
    let _ = writeln!(
        out,
        "Trainable: g_AB, g_BA ({} params); frozen: d_A, d_B ({} params)",
        2 * g.total_params(),
        2 * d.total_params()
    );
    let _ = writeln!(out, "{:<12} {:<20} {:<16} {:<6} {:>8}", "Output", "Graph", "Shape", "Loss", "Weight");
    let _ = writeln!(out, "{}", "=".repeat(66));
    let per_output = weights.per_output();
    for (i, (name, graph, (h, w, c))) in wiring.iter().enumerate() {
        debug_assert_eq!(*name, COMBINED_OUTPUTS[i]);
        let _ = writeln!(
            out,
            "{:<12} {:<20} {:<16} {:<6} {:>8.3}",
            name, graph, format!("({h}, {w}, {c})"), COMBINED_LOSSES[i].name(), per_output[i]
        );
    }
    out
}
