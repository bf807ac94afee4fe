use crate::foundation::{
    core::AffineCoeffs,
    error::{GenomeError, GenomeResult},
};
use crate::genome::store::{AFFINE_STRIDE, COLOR_STRIDE, Genome};
use crate::variation::catalog::KindRef;

/// Per-transform floats in the affine buffer: pre then post.
pub const AFFINE_PAIR_STRIDE: usize = 2 * AFFINE_STRIDE;

/// Logical extents of an export, and the minimum buffer lengths it needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ExportLayout {
    /// Transform count (`T`).
    pub transforms: usize,
    /// Variation column count (`V`).
    pub variations: usize,
    /// Parameter column count (`P`).
    pub params: usize,
}

impl ExportLayout {
    /// Length needed by `weight_prefix` and `color_weight`.
    pub fn per_transform_len(&self) -> usize {
        self.transforms
    }

    /// Length needed by `color`.
    pub fn color_len(&self) -> usize {
        self.transforms * COLOR_STRIDE
    }

    /// Length needed by `affine`.
    pub fn affine_len(&self) -> usize {
        self.transforms * AFFINE_PAIR_STRIDE
    }

    /// Length needed by `variation_coef`.
    pub fn variation_len(&self) -> usize {
        self.transforms * self.variations
    }

    /// Length needed by `params`.
    pub fn param_len(&self) -> usize {
        self.transforms * self.params
    }
}

/// Caller-owned flat buffers in the render kernel's layout.
///
/// Buffers may be longer than an export needs; only the prefix described by the returned
/// [`ExportLayout`] is written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatBuffers {
    /// Normalized cumulative selection weights (`T`). Entry 0 (final transform) is 0.
    pub weight_prefix: Vec<f32>,
    /// Color mix per transform (`T`).
    pub color_weight: Vec<f32>,
    /// RGB triples (`T*3`).
    pub color: Vec<f32>,
    /// Pre then post affine, 12 floats per transform (`T*12`).
    pub affine: Vec<f32>,
    /// Variation coefficients (`T*V`).
    pub variation_coef: Vec<f32>,
    /// Parameter values (`T*P`).
    pub params: Vec<f32>,
    /// World-to-pixel affine, kurbo coefficient order.
    pub view_affine: [f32; 6],
    /// `[brightness, inv_gamma, vibrancy]`.
    pub coloration: [f32; 3],
    /// `[a, r, g, b]`.
    pub background: [f32; 4],
}

impl FlatBuffers {
    /// Zeroed buffers exactly large enough for `layout`.
    pub fn with_capacity(layout: ExportLayout) -> Self {
        Self {
            weight_prefix: vec![0.0; layout.per_transform_len()],
            color_weight: vec![0.0; layout.per_transform_len()],
            color: vec![0.0; layout.color_len()],
            affine: vec![0.0; layout.affine_len()],
            variation_coef: vec![0.0; layout.variation_len()],
            params: vec![0.0; layout.param_len()],
            view_affine: [0.0; 6],
            coloration: [0.0; 3],
            background: [0.0; 4],
        }
    }

    fn check(&self, layout: &ExportLayout) -> GenomeResult<()> {
        let checks = [
            ("weight_prefix", self.weight_prefix.len(), layout.per_transform_len()),
            ("color_weight", self.color_weight.len(), layout.per_transform_len()),
            ("color", self.color.len(), layout.color_len()),
            ("affine", self.affine.len(), layout.affine_len()),
            ("variation_coef", self.variation_coef.len(), layout.variation_len()),
            ("params", self.params.len(), layout.param_len()),
        ];
        for (name, have, need) in checks {
            if have < need {
                return Err(GenomeError::invalid_index(format!(
                    "export buffer '{name}' holds {have} floats, needs {need}"
                )));
            }
        }
        Ok(())
    }
}

/// Immutable, render-ready copy of a genome at one output resolution.
///
/// Cheap to share across concurrent consumers (wrap in an `Arc`); it never observes later
/// mutation of the source genome.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportSnapshot {
    width: u32,
    height: u32,
    layout: ExportLayout,
    kinds: Vec<KindRef>,
    buffers: FlatBuffers,
}

impl ExportSnapshot {
    /// Target image width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Target image height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Extents of every buffer.
    pub fn layout(&self) -> ExportLayout {
        self.layout
    }

    /// Variation kind of each coefficient column, in column order.
    pub fn kinds(&self) -> &[KindRef] {
        &self.kinds
    }

    /// The flattened arrays.
    pub fn buffers(&self) -> &FlatBuffers {
        &self.buffers
    }

    /// Pre-affine of transform `t`.
    pub fn pre_affine(&self, t: usize) -> Option<AffineCoeffs> {
        self.affine_at(t, 0)
    }

    /// Post-affine of transform `t`.
    pub fn post_affine(&self, t: usize) -> Option<AffineCoeffs> {
        self.affine_at(t, AFFINE_STRIDE)
    }

    fn affine_at(&self, t: usize, offset: usize) -> Option<AffineCoeffs> {
        if t >= self.layout.transforms {
            return None;
        }
        let s = t * AFFINE_PAIR_STRIDE + offset;
        let mut out = [0.0; AFFINE_STRIDE];
        out.copy_from_slice(&self.buffers.affine[s..s + AFFINE_STRIDE]);
        Some(AffineCoeffs(out))
    }

    /// Pick a non-final transform for a uniform sample `r` in `[0, 1)`.
    pub fn select_transform(&self, r: f32) -> Option<usize> {
        let prefix = &self.buffers.weight_prefix;
        if prefix.len() < 2 {
            return None;
        }
        let i = prefix[1..].partition_point(|&c| c <= r) + 1;
        Some(i.min(prefix.len() - 1))
    }
}

impl Genome {
    /// Extents of this genome's export.
    pub fn layout(&self) -> ExportLayout {
        ExportLayout {
            transforms: self.transform_count,
            variations: self.active.len(),
            params: self.param_width,
        }
    }

    /// Flatten into caller-sized buffers for a `width` x `height` image. Does not allocate
    /// and does not mutate the genome.
    pub fn export_into(
        &self,
        width: u32,
        height: u32,
        out: &mut FlatBuffers,
    ) -> GenomeResult<ExportLayout> {
        if width == 0 || height == 0 {
            return Err(GenomeError::range(format!(
                "export size must be non-zero, got {width}x{height}"
            )));
        }
        let layout = self.layout();
        out.check(&layout)?;

        let t = layout.transforms;
        write_weight_prefix(&self.weight, &mut out.weight_prefix[..t]);
        out.color_weight[..t].copy_from_slice(&self.color_weight);
        out.color[..layout.color_len()].copy_from_slice(&self.color);
        for row in 0..t {
            let src = row * AFFINE_STRIDE;
            let dst = row * AFFINE_PAIR_STRIDE;
            out.affine[dst..dst + AFFINE_STRIDE]
                .copy_from_slice(&self.affine_pre[src..src + AFFINE_STRIDE]);
            out.affine[dst + AFFINE_STRIDE..dst + AFFINE_PAIR_STRIDE]
                .copy_from_slice(&self.affine_post[src..src + AFFINE_STRIDE]);
        }
        out.variation_coef[..layout.variation_len()].copy_from_slice(&self.variation_coef);
        out.params[..layout.param_len()].copy_from_slice(&self.param_value);

        out.view_affine = AffineCoeffs::from_affine(self.view.to_affine(width, height)).0;
        out.coloration = self.coloration.to_array();
        out.background = self.background.to_array();
        Ok(layout)
    }

    /// Allocate exact buffers, export into them, and wrap the result.
    #[tracing::instrument(skip(self), fields(transforms = self.transform_count))]
    pub fn export_snapshot(&self, width: u32, height: u32) -> GenomeResult<ExportSnapshot> {
        let mut buffers = FlatBuffers::with_capacity(self.layout());
        let layout = self.export_into(width, height, &mut buffers)?;
        Ok(ExportSnapshot {
            width,
            height,
            layout,
            kinds: self.active.clone(),
            buffers,
        })
    }
}

// Entry 0 stays 0 (the final transform is never selected). Entries 1.. are the running
// sum of weights divided by their total; a zero total falls back to uniform selection.
fn write_weight_prefix(weights: &[f32], out: &mut [f32]) {
    let Some((first, rest)) = out.split_first_mut() else {
        return;
    };
    *first = 0.0;
    if rest.is_empty() {
        return;
    }

    let total: f64 = weights[1..].iter().map(|&w| f64::from(w)).sum();
    let n = rest.len();
    let mut acc = 0.0f64;
    for (i, slot) in rest.iter_mut().enumerate() {
        acc += if total > 0.0 {
            f64::from(weights[i + 1]) / total
        } else {
            1.0 / n as f64
        };
        *slot = acc as f32;
    }
    rest[n - 1] = 1.0;
}

#[cfg(test)]
#[path = "../../tests/unit/genome/export.rs"]
mod tests;
